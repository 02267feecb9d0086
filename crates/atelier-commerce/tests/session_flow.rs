//! End-to-end session behavior over a file-backed store.

use std::path::Path;
use std::time::Duration;

use atelier_commerce::prelude::*;
use atelier_storage::{Cache, FileBackend};
use chrono::{TimeZone, Utc};
use serde_json::Value;

fn usd(major: i64) -> Money {
    Money::from_major(major, Currency::USD)
}

fn catalog() -> CouponCatalog {
    CouponCatalog::new(vec![
        Coupon::percentage("SAVE10", 10.0).with_minimum_purchase(usd(100)),
        Coupon::fixed_amount("WELCOME", usd(25)),
        Coupon::percentage("SPRING", 20.0).expires_at(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()),
    ])
}

fn open_at(dir: &Path, scheduler: &ManualScheduler, month: u32, day: u32) -> StorefrontSession {
    StorefrontSession::with_clock(
        StorefrontConfig::default(),
        catalog(),
        FileBackend::open(dir).unwrap(),
        scheduler.clone(),
        FixedClock(Utc.with_ymd_and_hms(2026, month, day, 9, 0, 0).unwrap()),
    )
    .unwrap()
}

fn open(dir: &Path, scheduler: &ManualScheduler, day: u32) -> StorefrontSession {
    open_at(dir, scheduler, 3, day)
}

fn ring() -> ProductRef {
    ProductRef::new("ring-solitaire", "Solitaire Ring", "solitaire-ring", usd(149))
}

fn studs() -> ProductRef {
    ProductRef::new("studs-pearl", "Pearl Studs", "pearl-studs", usd(99))
}

#[test]
fn cart_coupon_and_filter_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();

    {
        let mut session = open(dir.path(), &scheduler, 1);
        session.add_item(ring(), 2);
        session.add_one(studs());
        session.apply_coupon(" save10 ").unwrap();

        session.filter().set_max(600);
        session.filter().set_min(120);
        scheduler.advance(Duration::from_millis(300));
        assert_eq!(session.filter().committed(), PriceRange::new(120, 600));
    }

    let cache = Cache::new(FileBackend::open(dir.path()).unwrap());
    let cart: Value = cache.get("atelier:cart").unwrap().unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["items"][0]["product"]["unitPrice"]["amountCents"], 14900);
    let coupon: Value = cache.get("atelier:coupon").unwrap().unwrap();
    assert_eq!(coupon["appliedCode"], "SAVE10");
    let filter: Value = cache.get("atelier:price-filter").unwrap().unwrap();
    assert_eq!(filter, serde_json::json!({ "min": 120, "max": 600 }));

    let session = open(dir.path(), &scheduler, 2);
    assert_eq!(session.subtotal(), usd(397));
    assert_eq!(session.applied_coupon().unwrap().coupon.code.as_str(), "SAVE10");

    let totals = session.totals();
    assert_eq!(totals.discount, Money::new(3970, Currency::USD));
    assert_eq!(totals.shipping, usd(15));
    assert_eq!(totals.remaining_for_free_shipping, usd(103));
    assert_eq!(totals.total, Money::new(39700 - 3970 + 1500, Currency::USD));
}

#[test]
fn expired_coupon_is_dropped_on_restore() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();

    {
        let mut session = open(dir.path(), &scheduler, 1);
        session.add_item(ring(), 1);
        session.apply_coupon("SPRING").unwrap();
    }

    let mut later = open_at(dir.path(), &scheduler, 4, 15);

    assert!(later.applied_coupon().is_none());
    assert_eq!(later.take_coupon_notice().map(|e| e.kind()), Some(CouponErrorKind::Expired));
    assert_eq!(later.totals().total, usd(149 + 15));
}

#[test]
fn second_surface_sees_changes_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();
    let mut first = open(dir.path(), &scheduler, 1);
    let mut second = open(dir.path(), &scheduler, 1);

    first.add_item(studs(), 3);
    first.apply_coupon("WELCOME").unwrap();
    assert!(second.cart().is_empty());

    second.reload();
    assert_eq!(second.item_count(), 3);
    assert_eq!(second.discount(), usd(25));
}

#[test]
fn rapid_filter_edits_write_once() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();
    let session = open(dir.path(), &scheduler, 1);
    let path = dir.path().join("atelier%3Aprice-filter.json");

    for max in (500..=900).rev().step_by(50) {
        session.filter().set_max(max);
        scheduler.advance(Duration::from_millis(20));
    }
    assert!(!path.exists());
    assert_eq!(session.filter().live(), PriceRange::new(0, 500));

    scheduler.run_until_idle();
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored["max"], 500);
    assert!(!session.filter().is_pending());
}

#[test]
fn unknown_coupon_reports_localized_message() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = ManualScheduler::new();
    let mut session = open(dir.path(), &scheduler, 1);

    let err = session.apply_coupon("NOPE").unwrap_err();
    assert_eq!(err.kind(), CouponErrorKind::NotFound);
    assert_eq!(session.coupon_message(&err), "Coupon code NOPE was not found");
    assert_eq!(format_coupon_discount(catalog().find("WELCOME").unwrap()), "-25.00 USD");
}
