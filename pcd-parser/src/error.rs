use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a .las or .laz file", .0.display())]
    InvalidFileType(PathBuf),
    #[error("Malformed LAS header in {}: {reason}", path.display())]
    MalformedHeader { path: PathBuf, reason: String },
    #[error("Failed to decode point record: {0}")]
    Decode(#[from] las::Error),
    #[error("Point stream ended after {read} of {expected} records")]
    TruncatedPointStream { expected: u64, read: u64 },
    #[error("Cloud has no LAS file to read points from")]
    NotFileBacked,
    #[error(transparent)]
    Core(#[from] pcd_core::Error),
}
