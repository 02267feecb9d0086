//! Coupon validation and the applied-coupon slot.
//!
//! Coupons come from a static [`CouponCatalog`] supplied at startup. The
//! [`CouponEngine`] validates codes against it, computes the discount for a
//! subtotal and holds at most one applied coupon per session.

mod catalog;
mod engine;
mod error;
mod types;

pub use catalog::CouponCatalog;
pub use engine::{AppliedCoupon, CouponEngine, CouponState, CouponValidation};
pub use error::{CouponError, CouponErrorKind};
pub use types::{format_coupon_discount, Coupon, DiscountKind};
