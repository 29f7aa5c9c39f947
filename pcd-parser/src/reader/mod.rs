pub mod las;

use crate::error::Result;

/// One point record, reduced to the fields the decoder keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: u16,
    pub classification: u8,
    pub number_of_returns: u8,
    /// 16-bit red, green, blue; `None` when the format has no color.
    pub color: Option<[u16; 3]>,
}

pub trait PointReader {
    fn next_point(&mut self) -> Result<Option<RawPoint>>;
}
