//! Range arithmetic.
//!
//! Values are whole currency units. Valid positions lie on the grid
//! `global_min + k * step`, plus `global_max` itself, which is always
//! reachable even when it is not on the grid.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Fixed limits of a range filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RangeBounds {
    global_min: i64,
    global_max: i64,
    step: i64,
}

/// A selected `[min, max]` interval. Also the persisted form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies inside the interval, ends included.
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when `price` lies inside the interval. The interval is in whole
    /// units of the price's currency.
    pub fn contains_price(&self, price: Money) -> bool {
        let per_major = price.currency.minor_per_major();
        let lo = self.min.saturating_mul(per_major);
        let hi = self.max.saturating_mul(per_major);
        lo <= price.amount_cents && price.amount_cents <= hi
    }
}

impl RangeBounds {
    /// Create bounds. Requires `step > 0` and `global_min < global_max`.
    pub fn new(global_min: i64, global_max: i64, step: i64) -> Result<Self, CommerceError> {
        if step <= 0 {
            return Err(CommerceError::InvalidConfig(format!(
                "range step must be positive, got {}",
                step
            )));
        }
        if global_min >= global_max {
            return Err(CommerceError::InvalidConfig(format!(
                "range min ({}) must be below max ({})",
                global_min, global_max
            )));
        }
        Ok(Self {
            global_min,
            global_max,
            step,
        })
    }

    pub fn global_min(&self) -> i64 {
        self.global_min
    }

    pub fn global_max(&self) -> i64 {
        self.global_max
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// The unfiltered interval.
    pub fn full(&self) -> PriceRange {
        PriceRange::new(self.global_min, self.global_max)
    }

    /// Clamp into the global bounds.
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.global_min, self.global_max)
    }

    /// Clamp, then round to the nearest valid position. Halfway rounds up.
    pub fn snap(&self, value: i64) -> i64 {
        let value = self.clamp(value);
        if value == self.global_max {
            return value;
        }
        let down = self.floor_to_grid(value);
        let up = down.saturating_add(self.step).min(self.global_max);
        if value - down >= up - value {
            up
        } else {
            down
        }
    }

    /// Largest valid position not above `value`.
    fn floor_to_grid(&self, value: i64) -> i64 {
        let value = self.clamp(value);
        if value == self.global_max {
            return value;
        }
        value - (value - self.global_min) % self.step
    }

    /// Smallest valid position not below `value`.
    fn ceil_to_grid(&self, value: i64) -> i64 {
        let value = self.clamp(value);
        let remainder = (value - self.global_min) % self.step;
        if remainder == 0 {
            value
        } else {
            value
                .saturating_add(self.step - remainder)
                .min(self.global_max)
        }
    }

    /// New lower bound for `candidate` while the upper bound is `max`:
    /// `clamp(snap(candidate), global_min, max - step)`.
    pub fn clamp_min(&self, candidate: i64, max: i64) -> i64 {
        let ceiling = self
            .floor_to_grid(max.saturating_sub(self.step))
            .max(self.global_min);
        self.snap(candidate).clamp(self.global_min, ceiling)
    }

    /// New upper bound for `candidate` while the lower bound is `min`:
    /// `clamp(snap(candidate), min + step, global_max)`.
    pub fn clamp_max(&self, candidate: i64, min: i64) -> i64 {
        let floor = self
            .ceil_to_grid(min.saturating_add(self.step))
            .min(self.global_max);
        self.snap(candidate).clamp(floor, self.global_max)
    }

    /// Clamp both ends into the global bounds without snapping. An
    /// inverted pair is swapped.
    pub fn clamp_range(&self, range: PriceRange) -> PriceRange {
        let a = self.clamp(range.min);
        let b = self.clamp(range.max);
        PriceRange::new(a.min(b), a.max(b))
    }

    /// Bring a stored range back inside the invariants. Inverted input
    /// falls back to the full bounds.
    pub fn sanitize(&self, range: PriceRange) -> PriceRange {
        if range.min > range.max {
            return self.full();
        }
        let min = self.snap(range.min);
        let max = self.snap(range.max);
        if min > max {
            return self.full();
        }
        PriceRange::new(min, max)
    }

    /// True when `range` satisfies every invariant.
    pub fn is_valid(&self, range: PriceRange) -> bool {
        range.min <= range.max
            && self.clamp(range.min) == range.min
            && self.clamp(range.max) == range.max
    }
}
