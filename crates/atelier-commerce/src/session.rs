//! Per-session wiring of the engines.

use atelier_storage::StorageBackend;
use tracing::debug;

use crate::cart::{CartItem, CartLedger};
use crate::catalog::ProductRef;
use crate::checkout::{CheckoutTotals, ShippingPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontConfig;
use crate::coupon::{AppliedCoupon, CouponCatalog, CouponEngine, CouponError, CouponValidation};
use crate::error::CommerceError;
use crate::filter::{PricePreset, PriceRange, RangeFilterController};
use crate::ids::ProductId;
use crate::money::Money;
use crate::persistence::JsonRepository;
use crate::store::ListenerId;
use crate::timer::Scheduler;

/// One shopper's cart, coupon and price filter over a shared backend.
///
/// Cart mutations go through the session so the applied coupon is
/// revalidated against every new subtotal. A coupon that stops qualifying
/// is cleared; the reason is kept until [`take_coupon_notice`](Self::take_coupon_notice).
pub struct StorefrontSession {
    config: StorefrontConfig,
    shipping: ShippingPolicy,
    cart: CartLedger,
    coupons: CouponEngine,
    filter: RangeFilterController,
    coupon_notice: Option<CouponError>,
}

impl StorefrontSession {
    /// Build a session and restore persisted state from `backend`.
    pub fn new<B>(
        config: StorefrontConfig,
        catalog: CouponCatalog,
        backend: B,
        scheduler: impl Scheduler + 'static,
    ) -> Result<Self, CommerceError>
    where
        B: StorageBackend + Clone + 'static,
    {
        Self::with_clock(config, catalog, backend, scheduler, SystemClock)
    }

    /// Like [`new`](Self::new), with `clock` deciding coupon expiry.
    pub fn with_clock<B>(
        config: StorefrontConfig,
        catalog: CouponCatalog,
        backend: B,
        scheduler: impl Scheduler + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, CommerceError>
    where
        B: StorageBackend + Clone + 'static,
    {
        config.validate()?;
        if let Some((code, found)) = catalog
            .coupons()
            .iter()
            .find_map(|c| c.foreign_currency(config.currency).map(|found| (&c.code, found)))
        {
            return Err(CommerceError::InvalidConfig(format!(
                "coupon {code} uses {found} but the storefront currency is {}",
                config.currency
            )));
        }
        let keys = &config.storage;
        let cart = CartLedger::new(
            config.currency,
            JsonRepository::new(backend.clone(), keys.cart_key()),
        );
        let coupons = CouponEngine::new(
            catalog,
            JsonRepository::new(backend.clone(), keys.coupon_key()),
        )
        .with_clock(clock);
        let filter = RangeFilterController::new(
            config.price_filter.bounds()?,
            JsonRepository::new(backend, keys.price_filter_key()),
            scheduler,
        )
        .with_debounce(config.price_filter.debounce());

        let mut session = Self {
            shipping: config.shipping_policy(),
            config,
            cart,
            coupons,
            filter,
            coupon_notice: None,
        };
        session.restore_coupon();
        Ok(session)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn coupons(&self) -> &CouponEngine {
        &self.coupons
    }

    /// Listen for effective cart changes.
    pub fn subscribe_cart(&mut self, listener: impl Fn(&[CartItem]) + 'static) -> ListenerId {
        self.cart.subscribe(listener)
    }

    pub fn unsubscribe_cart(&mut self, id: ListenerId) -> bool {
        self.cart.unsubscribe(id)
    }

    /// Listen for the applied coupon being set, recomputed or cleared.
    pub fn subscribe_coupon(
        &mut self,
        listener: impl Fn(Option<&AppliedCoupon>) + 'static,
    ) -> ListenerId {
        self.coupons.subscribe(listener)
    }

    pub fn unsubscribe_coupon(&mut self, id: ListenerId) -> bool {
        self.coupons.unsubscribe(id)
    }

    pub fn filter(&self) -> &RangeFilterController {
        &self.filter
    }

    pub fn shipping_policy(&self) -> &ShippingPolicy {
        &self.shipping
    }

    // Cart

    pub fn add_item(&mut self, product: ProductRef, quantity: i64) -> bool {
        let changed = self.cart.add_item(product, quantity);
        self.sync_coupon(changed);
        changed
    }

    pub fn add_one(&mut self, product: ProductRef) -> bool {
        self.add_item(product, 1)
    }

    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let changed = self.cart.remove_item(product_id);
        self.sync_coupon(changed);
        changed
    }

    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let changed = self.cart.update_quantity(product_id, quantity);
        self.sync_coupon(changed);
        changed
    }

    pub fn clear_cart(&mut self) -> bool {
        let changed = self.cart.clear_cart();
        self.sync_coupon(changed);
        changed
    }

    /// Re-read every persisted document.
    pub fn reload(&mut self) {
        self.cart.reload();
        self.filter.reload();
        self.restore_coupon();
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    // Coupons

    /// Apply `code` against the current subtotal.
    pub fn apply_coupon(&mut self, code: &str) -> Result<AppliedCoupon, CouponError> {
        self.coupon_notice = None;
        self.coupons.apply_coupon(code, self.cart.subtotal())
    }

    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        self.coupon_notice = None;
        self.coupons.remove_coupon()
    }

    /// Validate `code` against the current subtotal without applying it.
    pub fn check_coupon(&self, code: &str) -> CouponValidation {
        self.coupons
            .check_coupon(code, self.cart.subtotal(), &self.config.locale)
    }

    /// Localized message for a coupon error.
    pub fn coupon_message(&self, error: &CouponError) -> String {
        self.coupons.catalog().error_message(error, &self.config.locale)
    }

    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        self.coupons.applied()
    }

    /// Current discount; zero without a coupon.
    pub fn discount(&self) -> Money {
        self.coupons
            .discount()
            .unwrap_or_else(|| Money::zero(self.config.currency))
    }

    /// Why the applied coupon was last cleared automatically, if it was.
    pub fn take_coupon_notice(&mut self) -> Option<CouponError> {
        self.coupon_notice.take()
    }

    // Shipping and totals

    pub fn shipping_fee(&self) -> Money {
        self.shipping.calculate_shipping(self.subtotal())
    }

    pub fn remaining_for_free_shipping(&self) -> Money {
        self.shipping.remaining_for_free_shipping(self.subtotal())
    }

    pub fn free_shipping_progress(&self) -> u8 {
        self.shipping.free_shipping_progress(self.subtotal())
    }

    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::compute(self.subtotal(), self.coupons.discount(), &self.shipping)
    }

    // Price filter

    pub fn presets(&self) -> &[PricePreset] {
        &self.config.price_filter.presets
    }

    /// Apply the preset named `label`. `None` when no preset has that label.
    pub fn apply_preset(&self, label: &str) -> Option<PriceRange> {
        let preset = self.config.price_filter.preset(label)?;
        Some(self.filter.set_from_preset(preset.range()))
    }

    pub fn active_preset(&self) -> Option<&PricePreset> {
        self.filter.active_preset(self.presets())
    }

    fn sync_coupon(&mut self, cart_changed: bool) {
        if !cart_changed {
            return;
        }
        if let Err(e) = self.coupons.recalculate(self.cart.subtotal()) {
            self.coupon_notice = Some(e);
        }
    }

    fn restore_coupon(&mut self) {
        match self.coupons.restore(self.cart.subtotal()) {
            Ok(discount) => debug!(?discount, "coupon state restored"),
            Err(e) => self.coupon_notice = Some(e),
        }
    }
}
