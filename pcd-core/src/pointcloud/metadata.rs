use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::pointcloud::point::BoundingVolume;

pub const NUMBER_OF_POINTS: &str = "Number of Points";
pub const MIN_X: &str = "Min X";
pub const MIN_Y: &str = "Min Y";
pub const MIN_Z: &str = "Min Z";
pub const MAX_X: &str = "Max X";
pub const MAX_Y: &str = "Max Y";
pub const MAX_Z: &str = "Max Z";
pub const POINT_FORMAT: &str = "Point Format";

/// Point data record formats that carry red, green and blue samples.
const RGB_FORMATS: [u8; 6] = [2, 3, 5, 7, 8, 10];

pub const MAX_POINT_FORMAT: u8 = 10;

/// First of the LAS 1.4 formats with 4-bit return counts and 8-bit classes.
pub const FIRST_EXTENDED_FORMAT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointFormat(u8);

impl PointFormat {
    /// Returns `None` for format bytes outside the LAS 1.4 range.
    pub fn new(format: u8) -> Option<Self> {
        (format <= MAX_POINT_FORMAT).then_some(Self(format))
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn is_extended(self) -> bool {
        self.0 >= FIRST_EXTENDED_FORMAT
    }

    pub fn capabilities(self) -> PointFormatCapabilities {
        PointFormatCapabilities {
            has_rgb: RGB_FORMATS.contains(&self.0),
        }
    }
}

impl fmt::Display for PointFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which optional per-point fields a format physically stores.
///
/// Intensity, classification and number of returns exist in every format, so
/// only RGB is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointFormatCapabilities {
    pub has_rgb: bool,
}

/// The scalar part of a LAS public header block.
///
/// Exposed both as typed values and as the ordered `name -> f32` view that the
/// header listing shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    point_count: u64,
    bounding_volume: BoundingVolume,
    point_format: PointFormat,
}

impl Header {
    pub fn new(
        point_count: u64,
        bounding_volume: BoundingVolume,
        point_format: PointFormat,
    ) -> Self {
        Self {
            point_count,
            bounding_volume,
            point_format,
        }
    }

    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    pub fn bounding_volume(&self) -> &BoundingVolume {
        &self.bounding_volume
    }

    pub fn min_point(&self) -> [f64; 3] {
        self.bounding_volume.min
    }

    pub fn max_point(&self) -> [f64; 3] {
        self.bounding_volume.max
    }

    pub fn point_format(&self) -> PointFormat {
        self.point_format
    }

    pub fn entries(&self) -> Vec<(&'static str, f32)> {
        let min = self.bounding_volume.min;
        let max = self.bounding_volume.max;
        vec![
            (NUMBER_OF_POINTS, self.point_count as f32),
            (MIN_X, min[0] as f32),
            (MIN_Y, min[1] as f32),
            (MIN_Z, min[2] as f32),
            (MAX_X, max[0] as f32),
            (MAX_Y, max[1] as f32),
            (MAX_Z, max[2] as f32),
            (POINT_FORMAT, self.point_format.to_u8() as f32),
        ]
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries()
            .into_iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(key, value)| format!("{} : {}", key, value))
            .collect()
    }
}

pub const NO_VLRS: &str = "No VLRs found.";

/// Decoded VLR text entries in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlrMap {
    entries: Vec<(String, String)>,
}

impl VlrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key`, renaming it to `key_<n>` when it is already present.
    ///
    /// `n` is one more than the number of existing keys that contain `key`, so
    /// the second `scale` becomes `scale_2` and the third `scale_3`.
    pub fn insert_dup(&mut self, key: &str, value: &str) {
        if self.contains_key(key) {
            let existing = self.entries.iter().filter(|(k, _)| k.contains(key)).count();
            let mut suffix = existing + 1;
            let mut new_key = format!("{}_{}", key, suffix);
            while self.contains_key(&new_key) {
                suffix += 1;
                new_key = format!("{}_{}", key, suffix);
            }
            self.entries.push((new_key, value.to_string()));
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec![NO_VLRS.to_string()];
        }
        self.iter()
            .map(|(key, value)| format!("{} : {}", key, value))
            .collect()
    }
}

/// Everything read from a LAS file once per path. Shared by all clouds derived
/// from the same import.
#[derive(Debug, Clone, PartialEq)]
pub struct LasSource {
    pub path: PathBuf,
    pub header: Header,
    pub vlrs: VlrMap,
    pub point_format: PointFormat,
}

impl LasSource {
    pub fn capabilities(&self) -> PointFormatCapabilities {
        self.point_format.capabilities()
    }
}
