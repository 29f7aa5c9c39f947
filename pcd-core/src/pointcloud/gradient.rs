use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pointcloud::point::Color;

pub const GRADIENT_SIZE: usize = 256;

/// Built-in color gradients for field display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gradient {
    #[default]
    Rainbow,
    Greyscale,
    RedWhiteBlue,
    Heatmap,
}

impl Gradient {
    pub const ALL: [Gradient; 4] = [
        Gradient::Rainbow,
        Gradient::Greyscale,
        Gradient::RedWhiteBlue,
        Gradient::Heatmap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Gradient::Rainbow => "rainbow",
            Gradient::Greyscale => "greyscale",
            Gradient::RedWhiteBlue => "red white blue",
            Gradient::Heatmap => "heatmap",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Gradient::ALL.iter().map(|g| g.name()).collect()
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        Gradient::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownGradient(name.to_string()))
    }

    pub fn stops(self) -> &'static [Color] {
        match self {
            Gradient::Rainbow => &[Color::RED, Color::YELLOW, Color::GREEN],
            Gradient::Greyscale => &[Color::BLACK, Color::WHITE],
            Gradient::RedWhiteBlue => &[Color::RED, Color::WHITE, Color::BLUE],
            Gradient::Heatmap => &[Color::BLUE, Color::YELLOW, Color::RED],
        }
    }

    pub fn table(self) -> GradientTable {
        GradientTable::from_stops(self.stops())
    }
}

impl FromStr for Gradient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gradient::from_name(s)
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 256 entry lookup table sampled from evenly spaced color stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientTable {
    colors: [Color; GRADIENT_SIZE],
}

impl GradientTable {
    /// Entry `i` is sampled at `i / 256`, so the last stop itself is never
    /// reached exactly.
    pub fn from_stops(stops: &[Color]) -> Self {
        let mut colors = [Color::BLACK; GRADIENT_SIZE];
        match stops {
            [] => {}
            [only] => colors = [*only; GRADIENT_SIZE],
            _ => {
                let positions: Vec<f32> = (0..stops.len())
                    .map(|i| i as f32 / (stops.len() - 1) as f32)
                    .collect();
                for (i, color) in colors.iter_mut().enumerate() {
                    let position = i as f32 / GRADIENT_SIZE as f32;
                    *color = interpolate(stops, &positions, position);
                }
            }
        }
        Self { colors }
    }

    /// Indexes past the end clamp to the last entry.
    pub fn color(&self, index: usize) -> Color {
        self.colors[index.min(GRADIENT_SIZE - 1)]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for GradientTable {
    fn default() -> Self {
        Gradient::default().table()
    }
}

fn interpolate(stops: &[Color], positions: &[f32], position: f32) -> Color {
    let start = (1..stops.len())
        .find(|&i| position <= positions[i])
        .map(|i| i - 1)
        .unwrap_or(0);

    let fraction = (position - positions[start]) / (positions[start + 1] - positions[start]);
    let from = stops[start];
    let to = stops[start + 1];
    let channel = |a: u8, b: u8| (a as f32 + fraction * (b as f32 - a as f32)) as u8;

    Color::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}
