//! Client-side commerce state engine for the Atelier storefront.
//!
//! This crate holds the stateful parts of the shop:
//!
//! - **Cart**: line items with quantity invariants, persisted on every change
//! - **Coupons**: validation pipeline, discount computation, one applied slot
//! - **Checkout**: free-shipping threshold and order totals
//! - **Filter**: clamped price range with live and debounced-commit channels
//! - **Session**: the above wired together over one storage backend
//!
//! Everything is single-threaded. State lives in [`store::StateStore`]
//! values owned by each engine; deferred work goes through a
//! [`timer::Scheduler`]; persistence goes through [`persistence::Repository`].
//!
//! # Example
//!
//! ```rust
//! use atelier_commerce::prelude::*;
//! use atelier_storage::MemoryBackend;
//!
//! let coupons = CouponCatalog::new(vec![Coupon::percentage("SAVE10", 10.0)]);
//! let mut session = StorefrontSession::new(
//!     StorefrontConfig::default(),
//!     coupons,
//!     MemoryBackend::new(),
//!     ManualScheduler::new(),
//! )
//! .unwrap();
//!
//! let ring = ProductRef::new("ring", "Solitaire Ring", "solitaire-ring", Money::from_major(149, Currency::USD));
//! session.add_item(ring, 2);
//! session.apply_coupon("save10").unwrap();
//!
//! let totals = session.totals();
//! assert_eq!(totals.subtotal.display(), "$298.00");
//! assert_eq!(totals.discount.display(), "$29.80");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod coupon;
pub mod filter;
pub mod persistence;
pub mod session;
pub mod store;
pub mod timer;

pub use checkout::shipping;
pub use error::CommerceError;
pub use ids::{CouponCode, ProductId};
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::{CouponCode, ProductId};
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Catalog, LocalizedText, ProductRef};

    // Cart
    pub use crate::cart::{CartItem, CartLedger, CartSnapshot};

    // Coupons
    pub use crate::coupon::{
        format_coupon_discount, AppliedCoupon, Coupon, CouponCatalog, CouponEngine, CouponError,
        CouponErrorKind, CouponValidation, DiscountKind,
    };

    // Checkout
    pub use crate::checkout::{CheckoutTotals, ShippingPolicy};

    // Filter
    pub use crate::filter::{
        Interaction, PricePreset, PriceRange, RangeBounds, RangeFilterController, RangeSide,
        StepKey,
    };

    // Wiring
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::StorefrontConfig;
    pub use crate::persistence::{JsonRepository, Repository};
    pub use crate::session::StorefrontSession;
    pub use crate::store::{ListenerId, StateStore};
    #[cfg(feature = "tokio")]
    pub use crate::timer::TokioScheduler;
    pub use crate::timer::{ManualScheduler, Scheduler, TimerHandle};
}
