use std::collections::HashMap;

use crate::pipeline::types::Gender;

/// Acceptable shoulder-to-height ratio window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilhouetteRange {
    pub lower: f64,
    pub upper: f64,
}

impl SilhouetteRange {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

const NEUTRAL_RANGE: SilhouetteRange = SilhouetteRange::new(0.26, 0.34);

/// Gender-conditioned silhouette ranges. Always carries a neutral entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasTable {
    ranges: HashMap<Gender, SilhouetteRange>,
}

impl BiasTable {
    pub fn new(neutral: SilhouetteRange) -> Self {
        let mut ranges = HashMap::new();
        ranges.insert(Gender::Neutral, neutral);
        Self { ranges }
    }

    pub fn with_range(mut self, gender: Gender, range: SilhouetteRange) -> Self {
        self.ranges.insert(gender, range);
        self
    }

    /// Range for `gender`, falling back to the neutral entry.
    pub fn range_for(&self, gender: Gender) -> SilhouetteRange {
        self.ranges
            .get(&gender)
            .or_else(|| self.ranges.get(&Gender::Neutral))
            .copied()
            .unwrap_or(NEUTRAL_RANGE)
    }
}

impl Default for BiasTable {
    fn default() -> Self {
        Self::new(NEUTRAL_RANGE)
            .with_range(Gender::Male, SilhouetteRange::new(0.28, 0.36))
            .with_range(Gender::Female, SilhouetteRange::new(0.24, 0.32))
    }
}
