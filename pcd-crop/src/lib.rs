pub mod bvh;
pub mod crop;
pub mod mesh;
pub mod tester;

pub use crop::crop_cloud;
pub use mesh::{CropMesh, MeshFace, Triangle};
pub use tester::CropIndex;
