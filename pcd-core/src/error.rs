use thiserror::Error;

use crate::pointcloud::field::FieldKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No field has been selected for this cloud yet")]
    NoActiveField,
    #[error("{sequence} has {actual} entries but the cloud has {expected} points")]
    LengthMismatch {
        sequence: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Density {0} is not supported, use one of 0.1, 0.2, ... 1.0")]
    UnsupportedDensity(f32),
    #[error("The {0} field is not available for this point format")]
    FieldUnavailable(FieldKind),
    #[error("Unknown field selection {0}, expected 0..=5")]
    UnknownField(i32),
    #[error("Unknown gradient '{0}'")]
    UnknownGradient(String),
    #[error("This cloud has no points")]
    EmptyCloud,
}
