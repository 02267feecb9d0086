//! Dual-bound price range filter.
//!
//! Contains the range arithmetic (bounds, snapping, reciprocal clamping),
//! the preset type and the controller with its live and debounced-commit
//! channels.

mod controller;
mod preset;
mod range;

pub use controller::{Interaction, RangeFilterController, RangeSide, StepKey, DEFAULT_DEBOUNCE};
pub use preset::PricePreset;
pub use range::{PriceRange, RangeBounds};
