use crate::filter::PriceRange;
use serde::{Deserialize, Serialize};

/// A named shortcut range, e.g. "Under 100".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricePreset {
    pub label: String,
    pub min: i64,
    pub max: i64,
}

impl PricePreset {
    pub fn new(label: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    pub fn range(&self) -> PriceRange {
        PriceRange::new(self.min, self.max)
    }

    /// Exact equality with `range`. Overlap does not count.
    pub fn matches(&self, range: PriceRange) -> bool {
        self.range() == range
    }
}
