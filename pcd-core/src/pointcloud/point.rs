use serde::{Deserialize, Serialize};

/// 8-bit display color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    // System green, not lime
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    // LAS stores RGB as u16 per channel; the display color keeps the high byte.
    pub fn from_rgb16(r: u16, g: u16, b: u16) -> Self {
        Self {
            r: (r / 256) as u8,
            g: (g / 256) as u8,
            b: (b / 256) as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: Option<Color>,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            color: None,
        }
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

// Axis aligned bounds of a cloud, either from the LAS header or from its points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingVolume {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        let mut point_count = 0;

        for point in points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
            point_count += 1;
        }

        (point_count > 0).then_some(bounding_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb16_keeps_high_byte() {
        let color = Color::from_rgb16(65535, 256, 255);
        assert_eq!(color, Color::new(255, 1, 0));
    }

    #[test]
    fn bounding_volume_of_points() {
        let points = vec![
            Point::new(1.0, -2.0, 3.0),
            Point::new(-1.0, 4.0, 0.5),
            Point::new(0.0, 0.0, 10.0),
        ];
        let bv = BoundingVolume::from_points(&points).unwrap();
        assert_eq!(bv.min, [-1.0, -2.0, 0.5]);
        assert_eq!(bv.max, [1.0, 4.0, 10.0]);
    }

    #[test]
    fn bounding_volume_of_nothing() {
        assert!(BoundingVolume::from_points(&Vec::<Point>::new()).is_none());
    }
}
