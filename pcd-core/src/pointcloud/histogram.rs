use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of display buckets a normalized field is spread over.
pub const HISTOGRAM_SCALE: f32 = 256.0;

/// Occurrence counts of the active field, discretized for bar-chart display.
///
/// `values[i]` is a bucket and `counts[i]` how many points fell in it. Buckets
/// run 0..=256: a normalized value of exactly 1.0 lands in 256, one past the
/// nominal 0..=255 display range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub values: Vec<i32>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn compute(field: &[f32]) -> Self {
        let mut buckets: BTreeMap<i32, usize> = BTreeMap::new();
        for value in field {
            *buckets.entry(bucket(*value)).or_default() += 1;
        }

        if buckets.contains_key(&(HISTOGRAM_SCALE as i32)) {
            log::debug!("histogram has values in the overflow bucket 256");
        }

        let (values, counts) = buckets.into_iter().unzip();
        Self { values, counts }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.values.iter().copied().zip(self.counts.iter().copied())
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

fn bucket(value: f32) -> i32 {
    (value * HISTOGRAM_SCALE) as i32
}
