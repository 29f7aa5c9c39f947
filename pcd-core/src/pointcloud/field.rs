use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pointcloud::gradient::GradientTable;
use crate::pointcloud::point::Color;

/// Per-point LAS attribute a cloud can be colored and filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Intensity,
    Red,
    Green,
    Blue,
    Classification,
    NumberOfReturns,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Intensity,
        FieldKind::Red,
        FieldKind::Green,
        FieldKind::Blue,
        FieldKind::Classification,
        FieldKind::NumberOfReturns,
    ];

    pub fn index(self) -> i32 {
        match self {
            FieldKind::Intensity => 0,
            FieldKind::Red => 1,
            FieldKind::Green => 2,
            FieldKind::Blue => 3,
            FieldKind::Classification => 4,
            FieldKind::NumberOfReturns => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Intensity => "intensity",
            FieldKind::Red => "red",
            FieldKind::Green => "green",
            FieldKind::Blue => "blue",
            FieldKind::Classification => "classification",
            FieldKind::NumberOfReturns => "number of returns",
        }
    }

    pub fn needs_rgb(self) -> bool {
        matches!(self, FieldKind::Red | FieldKind::Green | FieldKind::Blue)
    }
}

impl TryFrom<i32> for FieldKind {
    type Error = Error;

    fn try_from(selection: i32) -> Result<Self, Self::Error> {
        FieldKind::ALL
            .into_iter()
            .find(|field| field.index() == selection)
            .ok_or(Error::UnknownField(selection))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Fields have no fixed range across producers, so values are scaled against
// the largest one present (the minimum is taken as 0).
fn normalize<T: Copy + Into<f32>>(values: &[T]) -> Vec<f32> {
    let max = values.iter().map(|v| (*v).into()).fold(0.0_f32, f32::max);
    if max == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (*v).into() / max).collect()
}

fn colorize<T: Copy + Into<f32>>(
    values: &[T],
    gradient: &GradientTable,
    fallback_len: usize,
) -> Vec<Color> {
    let max = values.iter().map(|v| (*v).into()).fold(0.0_f32, f32::max);
    if values.is_empty() || max == 0.0 {
        return vec![Color::BLACK; fallback_len];
    }
    values
        .iter()
        .map(|v| {
            let index = (255.0 * (*v).into() / max).floor() as usize;
            gradient.color(index)
        })
        .collect()
}

/// Scales `values` into `[0, 1]` by their maximum. All zeros when empty or
/// when every value is 0.
pub fn normalize_u16(values: &[u16]) -> Vec<f32> {
    normalize(values)
}

pub fn normalize_u8(values: &[u8]) -> Vec<f32> {
    normalize(values)
}

/// Maps each value to `gradient[floor(255 * v / max)]`.
///
/// Returns `fallback_len` black colors when there is nothing to scale.
pub fn colorize_u16(values: &[u16], gradient: &GradientTable, fallback_len: usize) -> Vec<Color> {
    colorize(values, gradient, fallback_len)
}

pub fn colorize_u8(values: &[u8], gradient: &GradientTable, fallback_len: usize) -> Vec<Color> {
    colorize(values, gradient, fallback_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcloud::gradient::Gradient;

    #[test]
    fn normalized_values_are_in_unit_range() {
        let values = [0u16, 12, 65535, 300, 40000];
        let normalized = normalize_u16(&values);
        assert_eq!(normalized.len(), values.len());
        assert!(normalized.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(normalized.iter().any(|v| *v == 1.0));
        assert_eq!(normalized[0], 0.0);
    }

    #[test]
    fn normalize_never_divides_by_zero() {
        assert_eq!(normalize_u16(&[0, 0, 0]), vec![0.0, 0.0, 0.0]);
        assert!(normalize_u8(&[]).is_empty());
    }

    #[test]
    fn normalize_bytes() {
        assert_eq!(normalize_u8(&[1, 2, 4]), vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn colorize_indexes_gradient() {
        let table = Gradient::Greyscale.table();
        let colors = colorize_u8(&[0, 1, 2], &table, 3);
        assert_eq!(colors[0], table.color(0));
        assert_eq!(colors[1], table.color(127));
        assert_eq!(colors[2], table.color(255));
    }

    #[test]
    fn colorize_falls_back_to_black() {
        let table = Gradient::Rainbow.table();
        assert_eq!(colorize_u16(&[], &table, 4), vec![Color::BLACK; 4]);
        assert_eq!(colorize_u16(&[0, 0], &table, 2), vec![Color::BLACK; 2]);
    }

    #[test]
    fn field_selection_indices() {
        assert_eq!(FieldKind::try_from(0), Ok(FieldKind::Intensity));
        assert_eq!(FieldKind::try_from(3), Ok(FieldKind::Blue));
        assert_eq!(FieldKind::try_from(5), Ok(FieldKind::NumberOfReturns));
        assert_eq!(FieldKind::try_from(6), Err(Error::UnknownField(6)));
        assert_eq!(FieldKind::try_from(-1), Err(Error::UnknownField(-1)));
        assert!(FieldKind::Green.needs_rgb());
        assert!(!FieldKind::Classification.needs_rgb());
    }
}
