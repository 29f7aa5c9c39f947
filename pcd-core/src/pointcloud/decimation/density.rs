use crate::error::{Error, Result};

pub const MASK_PERIOD: usize = 10;

// Slots of each 10-point window that are kept for a given density.
const PATTERNS: [(f32, &[usize]); 10] = [
    (0.1, &[5]),
    (0.2, &[3, 7]),
    (0.3, &[2, 6, 8]),
    (0.4, &[0, 3, 6, 9]),
    (0.5, &[1, 3, 5, 7, 9]),
    (0.6, &[0, 2, 3, 5, 6, 8]),
    (0.7, &[0, 1, 3, 4, 6, 7, 8]),
    (0.8, &[0, 1, 3, 4, 5, 6, 8, 9]),
    (0.9, &[0, 1, 2, 3, 4, 5, 6, 7, 8]),
    (1.0, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
];

/// The densities a mask can be built for, lowest first.
pub fn supported_densities() -> impl Iterator<Item = f32> {
    PATTERNS.iter().map(|(density, _)| *density)
}

/// Slot indices selected for `density`.
///
/// Only exact matches of the ten canonical tenths have a pattern; anything
/// else gets an empty slice.
pub fn masking_pattern(density: f32) -> &'static [usize] {
    PATTERNS
        .iter()
        .find(|(d, _)| *d == density)
        .map(|(_, slots)| *slots)
        .unwrap_or(&[])
}

/// Deterministic subsampling over a point stream.
///
/// The cursor advances once per point read, whether or not that point is
/// kept, and wraps every [`MASK_PERIOD`] points.
#[derive(Debug, Clone)]
pub struct DensityMask {
    density: f32,
    slots: [bool; MASK_PERIOD],
    cursor: usize,
}

impl DensityMask {
    pub fn new(density: f32) -> Result<Self> {
        let pattern = masking_pattern(density);
        if pattern.is_empty() {
            return Err(Error::UnsupportedDensity(density));
        }

        let mut slots = [false; MASK_PERIOD];
        for &slot in pattern {
            slots[slot] = true;
        }

        Ok(Self {
            density,
            slots,
            cursor: 0,
        })
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tests the current slot, then advances the cursor.
    pub fn select(&mut self) -> bool {
        let selected = self.slots[self.cursor];
        self.cursor += 1;
        if self.cursor == MASK_PERIOD {
            self.cursor = 0;
        }
        selected
    }

    /// Number of points kept out of `count` read.
    pub fn expected_count(&self, count: u64) -> u64 {
        let period = MASK_PERIOD as u64;
        let full = count / period * self.slots.iter().filter(|s| **s).count() as u64;
        let rest = self.slots[..(count % period) as usize]
            .iter()
            .filter(|s| **s)
            .count() as u64;
        full + rest
    }
}
