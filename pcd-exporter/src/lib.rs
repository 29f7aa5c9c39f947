pub mod csv_export;
pub mod error;
pub mod las_export;

use std::path::Path;

use pcd_core::pointcloud::cloud::AsprCloud;

pub use csv_export::write_csv;
pub use error::{ExportError, Result};
pub use las_export::write_las;

/// Writes `cloud` in the format named by the extension of `path`.
pub fn export(cloud: &AsprCloud, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("las") | Some("laz") => write_las(cloud, path),
        Some("csv") => write_csv(cloud, path),
        _ => Err(ExportError::UnsupportedExtension(path.to_path_buf())),
    }
}
