pub mod las;

use pcd_core::pointcloud::cloud::DecodedCloud;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub trait Parser {
    fn parse(&self) -> Result<DecodedCloud>;
}

/// Density used for quick previews of a file.
pub const PREVIEW_DENSITY: f32 = 0.1;

/// How points are selected on import.
///
/// `inside` only matters when crop meshes are given: it keeps the points
/// inside them when true and the points outside them otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub density: f32,
    pub inside: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            density: 1.0,
            inside: true,
        }
    }
}

impl ImportOptions {
    pub fn preview() -> Self {
        Self {
            density: PREVIEW_DENSITY,
            ..Default::default()
        }
    }
}
