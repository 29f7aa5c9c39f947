pub mod cloud;
pub mod decimation;
pub mod field;
pub mod gradient;
pub mod histogram;
pub mod metadata;
pub mod point;
