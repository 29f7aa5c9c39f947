use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to write LAS: {0}")]
    Las(#[from] las::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Number of returns {0} does not fit any LAS point format")]
    NumberOfReturns(u8),
    #[error("Cannot export to {}, use .las, .laz or .csv", .0.display())]
    UnsupportedExtension(PathBuf),
}
