pub mod error;
pub mod parsers;
pub mod reader;

pub use error::{ParseError, Result};
pub use parsers::{
    las::{decode, materialize, open_cloud, preview, LasParser},
    ImportOptions, Parser,
};
pub use reader::las::{check_extension, read_header, read_point_format, read_vlrs, Extension};

#[cfg(test)]
mod test_utils;
