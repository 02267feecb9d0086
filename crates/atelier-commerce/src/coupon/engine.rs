//! The applied-coupon engine.

use crate::clock::{Clock, SystemClock};
use crate::coupon::{Coupon, CouponCatalog, CouponError, CouponErrorKind};
use crate::ids::CouponCode;
use crate::money::Money;
use crate::persistence::Repository;
use crate::store::{ListenerId, StateStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The coupon currently applied to the session and its discount.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    /// Discount for the subtotal it was last computed against.
    pub discount: Money,
}

/// Persisted form of the applied slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CouponState {
    #[serde(default)]
    pub applied_code: Option<CouponCode>,
}

/// Validation result in the shape the UI consumes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CouponErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CouponValidation {
    pub fn from_result(
        result: &Result<Money, CouponError>,
        catalog: &CouponCatalog,
        locale: &str,
    ) -> Self {
        match result {
            Ok(discount) => Self {
                is_valid: true,
                discount_amount: Some(*discount),
                error: None,
                message: None,
            },
            Err(e) => Self {
                is_valid: false,
                discount_amount: None,
                error: Some(e.kind()),
                message: Some(catalog.error_message(e, locale)),
            },
        }
    }
}

/// Validates coupon codes and owns the single applied-coupon slot.
///
/// Applying a coupon replaces whatever was applied before; coupons never
/// stack. The discount stays within `[0, subtotal]` as long as the owner
/// calls [`recalculate`](Self::recalculate) whenever the subtotal changes.
pub struct CouponEngine {
    catalog: CouponCatalog,
    clock: Box<dyn Clock>,
    applied: StateStore<Option<AppliedCoupon>>,
    repository: Box<dyn Repository<CouponState>>,
}

impl CouponEngine {
    /// Create an engine with nothing applied, using the system clock.
    ///
    /// Call [`restore`](Self::restore) to pick up a persisted code.
    pub fn new(catalog: CouponCatalog, repository: impl Repository<CouponState> + 'static) -> Self {
        Self {
            catalog,
            clock: Box::new(SystemClock),
            applied: StateStore::new(None),
            repository: Box::new(repository),
        }
    }

    /// Use `clock` for expiry checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.set_clock(clock);
        self
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn catalog(&self) -> &CouponCatalog {
        &self.catalog
    }

    /// Validate `code` against `subtotal` and compute its discount.
    pub fn validate_coupon(&self, code: &str, subtotal: Money) -> Result<Money, CouponError> {
        let coupon = self.lookup(code)?;
        coupon.check(subtotal, self.clock.now())
    }

    /// Validate without touching state, in the UI result shape.
    pub fn check_coupon(&self, code: &str, subtotal: Money, locale: &str) -> CouponValidation {
        let result = self.validate_coupon(code, subtotal);
        CouponValidation::from_result(&result, &self.catalog, locale)
    }

    /// Validate and apply `code`, replacing any applied coupon.
    ///
    /// On failure the current slot is left as it was.
    pub fn apply_coupon(&mut self, code: &str, subtotal: Money) -> Result<AppliedCoupon, CouponError> {
        let coupon = self.lookup(code)?;
        let discount = coupon.check(subtotal, self.clock.now())?;
        let applied = AppliedCoupon {
            coupon: coupon.clone(),
            discount,
        };

        info!(code = %applied.coupon.code, discount = %discount, "coupon applied");
        self.applied.set(Some(applied.clone()));
        self.persist();
        Ok(applied)
    }

    /// Clear the applied slot. Returns what was applied.
    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        let previous = self.applied.update_silently(Option::take);
        if let Some(ref removed) = previous {
            info!(code = %removed.coupon.code, "coupon removed");
            self.applied.notify();
        }
        self.persist();
        previous
    }

    /// Revalidate the applied coupon against a new subtotal.
    ///
    /// A still-valid coupon gets its discount recomputed. One that no longer
    /// validates is cleared and the reason returned. `Ok(None)` when nothing
    /// is applied.
    pub fn recalculate(&mut self, subtotal: Money) -> Result<Option<Money>, CouponError> {
        let Some(code) = self.applied_code() else {
            return Ok(None);
        };
        self.revalidate(&code, subtotal)
    }

    /// Reload the persisted code and revalidate it against `subtotal`.
    pub fn restore(&mut self, subtotal: Money) -> Result<Option<Money>, CouponError> {
        let state = self.repository.load().unwrap_or_default();
        match state.applied_code {
            Some(code) => self.revalidate(&code, subtotal),
            None => {
                if self.applied.get().is_some() {
                    self.applied.set(None);
                }
                Ok(None)
            }
        }
    }

    pub fn applied(&self) -> Option<&AppliedCoupon> {
        self.applied.get().as_ref()
    }

    /// Current discount, `None` when no coupon is applied.
    pub fn discount(&self) -> Option<Money> {
        self.applied().map(|a| a.discount)
    }

    pub fn subscribe(&mut self, listener: impl Fn(Option<&AppliedCoupon>) + 'static) -> ListenerId {
        self.applied.subscribe(move |applied| listener(applied.as_ref()))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.applied.unsubscribe(id)
    }

    fn lookup(&self, code: &str) -> Result<&Coupon, CouponError> {
        self.catalog.find(code).ok_or_else(|| CouponError::NotFound {
            code: CouponCode::new(code),
        })
    }

    fn applied_code(&self) -> Option<CouponCode> {
        self.applied().map(|a| a.coupon.code.clone())
    }

    fn revalidate(&mut self, code: &CouponCode, subtotal: Money) -> Result<Option<Money>, CouponError> {
        let now = self.clock.now();
        let result = self
            .lookup(code.as_str())
            .and_then(|coupon| coupon.check(subtotal, now).map(|discount| (coupon.clone(), discount)));

        match result {
            Ok((coupon, discount)) => {
                let unchanged = self
                    .applied()
                    .map(|a| a.coupon == coupon && a.discount == discount)
                    .unwrap_or(false);
                if !unchanged {
                    debug!(code = %coupon.code, discount = %discount, "coupon discount recomputed");
                    self.applied.set(Some(AppliedCoupon { coupon, discount }));
                }
                Ok(Some(discount))
            }
            Err(e) => {
                info!(code = %code, reason = %e.kind(), "applied coupon no longer valid, clearing");
                self.applied.set(None);
                self.persist();
                Err(e)
            }
        }
    }

    fn persist(&self) {
        self.repository.save(&CouponState {
            applied_code: self.applied_code(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::money::Currency;
    use crate::persistence::JsonRepository;
    use atelier_storage::MemoryBackend;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY: &str = "atelier:coupon";

    fn usd(major: i64) -> Money {
        Money::from_major(major, Currency::USD)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn catalog() -> CouponCatalog {
        let mut exhausted = Coupon::percentage("LIMITED", 20.0).with_usage_limit(5);
        exhausted.used_count = 5;
        let mut retired = Coupon::percentage("RETIRED", 30.0);
        retired.is_active = false;

        CouponCatalog::new(vec![
            Coupon::percentage("SAVE10", 10.0).with_minimum_purchase(usd(100)),
            Coupon::fixed_amount("TAKE50", usd(50)),
            Coupon::percentage("OLD", 15.0).expires_at(now() - Duration::days(1)),
            exhausted,
            retired,
        ])
    }

    fn engine(backend: &MemoryBackend) -> CouponEngine {
        CouponEngine::new(catalog(), JsonRepository::new(backend.clone(), KEY))
            .with_clock(FixedClock(now()))
    }

    fn stored(backend: &MemoryBackend) -> CouponState {
        JsonRepository::<CouponState, _>::new(backend.clone(), KEY).load_or_default()
    }

    #[test]
    fn test_validate_worked_examples() {
        let engine = engine(&MemoryBackend::new());
        assert_eq!(
            engine.validate_coupon("SAVE10", usd(397)),
            Ok(Money::new(3970, Currency::USD))
        );
        assert_eq!(
            engine.validate_coupon("save10", usd(50)).unwrap_err().kind(),
            CouponErrorKind::MinPurchaseNotMet
        );
    }

    #[test]
    fn test_validate_error_taxonomy() {
        let engine = engine(&MemoryBackend::new());
        let kind = |code| engine.validate_coupon(code, usd(500)).unwrap_err().kind();
        assert_eq!(kind("NOPE"), CouponErrorKind::NotFound);
        assert_eq!(kind("RETIRED"), CouponErrorKind::Inactive);
        assert_eq!(kind("OLD"), CouponErrorKind::Expired);
        assert_eq!(kind("LIMITED"), CouponErrorKind::UsageExceeded);
        assert_eq!(kind(""), CouponErrorKind::NotFound);
    }

    #[test]
    fn test_apply_persists_code() {
        let backend = MemoryBackend::new();
        let mut engine = engine(&backend);

        let applied = engine.apply_coupon(" save10 ", usd(397)).unwrap();
        assert_eq!(applied.discount, Money::new(3970, Currency::USD));
        assert_eq!(engine.discount(), Some(Money::new(3970, Currency::USD)));
        assert_eq!(stored(&backend).applied_code, Some(CouponCode::new("SAVE10")));
    }

    #[test]
    fn test_apply_replaces_previous() {
        let mut engine = engine(&MemoryBackend::new());
        engine.apply_coupon("SAVE10", usd(397)).unwrap();
        engine.apply_coupon("TAKE50", usd(397)).unwrap();

        let applied = engine.applied().unwrap();
        assert_eq!(applied.coupon.code.as_str(), "TAKE50");
        assert_eq!(applied.discount, usd(50));
    }

    #[test]
    fn test_failed_apply_keeps_state() {
        let backend = MemoryBackend::new();
        let mut engine = engine(&backend);
        engine.apply_coupon("TAKE50", usd(397)).unwrap();
        let writes = backend.write_count();

        let err = engine.apply_coupon("OLD", usd(397)).unwrap_err();
        assert_eq!(err.kind(), CouponErrorKind::Expired);
        assert_eq!(engine.applied().unwrap().coupon.code.as_str(), "TAKE50");
        assert_eq!(backend.write_count(), writes);
    }

    #[test]
    fn test_remove_coupon() {
        let backend = MemoryBackend::new();
        let mut engine = engine(&backend);
        engine.apply_coupon("TAKE50", usd(80)).unwrap();

        let removed = engine.remove_coupon().unwrap();
        assert_eq!(removed.coupon.code.as_str(), "TAKE50");
        assert!(engine.applied().is_none());
        assert_eq!(stored(&backend), CouponState::default());

        assert!(engine.remove_coupon().is_none());
    }

    #[test]
    fn test_recalculate_tracks_subtotal() {
        let mut engine = engine(&MemoryBackend::new());
        engine.apply_coupon("TAKE50", usd(80)).unwrap();

        assert_eq!(engine.recalculate(usd(30)), Ok(Some(usd(30))));
        assert_eq!(engine.discount(), Some(usd(30)));
        assert_eq!(engine.recalculate(usd(300)), Ok(Some(usd(50))));
    }

    #[test]
    fn test_recalculate_clears_invalid_coupon() {
        let backend = MemoryBackend::new();
        let mut engine = engine(&backend);
        engine.apply_coupon("SAVE10", usd(397)).unwrap();

        let err = engine.recalculate(usd(50)).unwrap_err();
        assert_eq!(err.kind(), CouponErrorKind::MinPurchaseNotMet);
        assert!(engine.applied().is_none());
        assert_eq!(stored(&backend).applied_code, None);

        assert_eq!(engine.recalculate(usd(397)), Ok(None));
    }

    #[test]
    fn test_restore_revalidates() {
        let backend = MemoryBackend::new();
        engine(&backend).apply_coupon("SAVE10", usd(397)).unwrap();

        let mut restored = engine(&backend);
        assert_eq!(restored.restore(usd(200)), Ok(Some(usd(20))));
        assert_eq!(restored.applied().unwrap().coupon.code.as_str(), "SAVE10");

        let mut too_small = engine(&backend);
        assert!(too_small.restore(usd(10)).is_err());
        assert_eq!(stored(&backend).applied_code, None);
    }

    #[test]
    fn test_restore_with_corrupt_state() {
        let backend = MemoryBackend::new();
        backend.seed(KEY, "{\"appliedCode\": 42}");
        let mut engine = engine(&backend);
        assert_eq!(engine.restore(usd(100)), Ok(None));
        assert!(engine.applied().is_none());
    }

    #[test]
    fn test_listeners_hear_changes() {
        let mut engine = engine(&MemoryBackend::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        engine.subscribe(move |applied| {
            s.borrow_mut()
                .push(applied.map(|a| a.coupon.code.as_str().to_string()))
        });

        engine.apply_coupon("TAKE50", usd(80)).unwrap();
        engine.recalculate(usd(80)).unwrap();
        engine.remove_coupon();

        assert_eq!(*seen.borrow(), vec![Some("TAKE50".to_string()), None]);
    }

    #[test]
    fn test_check_coupon_shape() {
        let engine = engine(&MemoryBackend::new());
        let ok = engine.check_coupon("SAVE10", usd(397), "en");
        assert!(ok.is_valid);
        assert_eq!(ok.discount_amount, Some(Money::new(3970, Currency::USD)));

        let failed = engine.check_coupon("NOPE", usd(397), "en");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["error"], "NOT_FOUND");
        assert!(json.get("discountAmount").is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn discount_never_exceeds_subtotal(
                percent in -50.0f64..250.0,
                fixed in -10_000i64..1_000_000,
                subtotal in 0i64..10_000_000,
            ) {
                let subtotal = Money::new(subtotal, Currency::USD);
                for coupon in [
                    Coupon::percentage("P", percent),
                    Coupon::fixed_amount("F", Money::new(fixed, Currency::USD)),
                ] {
                    let discount = coupon.check(subtotal, now()).unwrap();
                    prop_assert!(discount.amount_cents >= 0);
                    prop_assert!(discount.amount_cents <= subtotal.amount_cents);
                }
            }
        }
    }
}
