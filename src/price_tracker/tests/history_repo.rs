use price_tracker::history::{HistoryRepo, SqliteHistoryRepo, StoreError};
use proptest::prelude::*;

mod common;
use common::{count, setup_db, snapshot, ts};

const URL: &str = "https://shop.example/espresso";

#[test]
fn earliest_and_latest_follow_observation_time() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    assert!(repo.earliest_price(&mut conn, URL).unwrap().is_none());

    // inserted out of chronological order on purpose
    repo.record_snapshot(&mut conn, URL, &snapshot("Espresso", 90.0, "USD", ts(20))).unwrap();
    repo.record_snapshot(&mut conn, URL, &snapshot("Espresso", 100.0, "USD", ts(0))).unwrap();
    repo.record_snapshot(&mut conn, URL, &snapshot("Espresso", 95.0, "USD", ts(10))).unwrap();

    let earliest = repo.earliest_price(&mut conn, URL).unwrap().unwrap();
    assert_eq!(earliest.price, 100.0);
    assert_eq!(earliest.observed_at, ts(0));

    let latest = repo.latest_price(&mut conn, URL).unwrap().unwrap();
    assert_eq!(latest.price, 90.0);

    let history = repo.price_history(&mut conn, URL).unwrap();
    let prices: Vec<f64> = history.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![100.0, 95.0, 90.0]);
}

#[test]
fn equal_timestamps_break_ties_by_insertion_order() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    let first = repo.record_snapshot(&mut conn, URL, &snapshot("E", 10.0, "USD", ts(5))).unwrap();
    let second = repo.record_snapshot(&mut conn, URL, &snapshot("E", 20.0, "USD", ts(5))).unwrap();
    assert!(second > first);

    assert_eq!(repo.earliest_price(&mut conn, URL).unwrap().unwrap().price, 10.0);
    assert_eq!(repo.latest_price(&mut conn, URL).unwrap().unwrap().price, 20.0);
}

#[test]
fn last_known_fields_only_move_forward() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    repo.record_snapshot(&mut conn, URL, &snapshot("Espresso v2", 80.0, "USD", ts(60))).unwrap();
    repo.record_snapshot(&mut conn, URL, &snapshot("Espresso v1", 100.0, "USD", ts(0))).unwrap();

    let product = repo.get_product(&mut conn, URL).unwrap().unwrap();
    assert_eq!(product.name.as_deref(), Some("Espresso v2"));
    assert_eq!(product.last_price, Some(80.0));
    assert_eq!(product.last_checked_at.as_deref(), Some("2025-03-01T12:01:00.000Z"));

    // the late-arriving entry is still part of the ledger
    assert_eq!(repo.price_history(&mut conn, URL).unwrap().len(), 2);
}

#[test]
fn add_product_is_idempotent() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    assert!(!repo.product_exists(&mut conn, URL).unwrap());
    assert!(repo.add_product(&mut conn, URL).unwrap());
    assert!(!repo.add_product(&mut conn, URL).unwrap());
    assert!(repo.product_exists(&mut conn, URL).unwrap());

    let product = repo.get_product(&mut conn, URL).unwrap().unwrap();
    assert!(product.name.is_none());
    assert!(product.last_price.is_none());
}

#[test]
fn invalid_prices_are_rejected_without_writing() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    for bad in [-0.01, f64::NAN, f64::INFINITY] {
        let err = repo
            .record_snapshot(&mut conn, URL, &snapshot("E", bad, "USD", ts(0)))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPrice(_)));
    }
    assert_eq!(count(&mut conn, "SELECT COUNT(*) AS cnt FROM price_histories;"), 0);
    assert!(!repo.product_exists(&mut conn, URL).unwrap());
}

#[test]
fn zero_price_is_recorded() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();
    repo.record_snapshot(&mut conn, URL, &snapshot("Freebie", 0.0, "USD", ts(0))).unwrap();
    assert_eq!(repo.earliest_price(&mut conn, URL).unwrap().unwrap().price, 0.0);
}

#[test]
fn remove_purges_history_and_is_idempotent() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();
    let other = "https://shop.example/grinder";

    repo.record_snapshot(&mut conn, URL, &snapshot("E", 100.0, "USD", ts(0))).unwrap();
    repo.record_snapshot(&mut conn, URL, &snapshot("E", 95.0, "USD", ts(1))).unwrap();
    repo.record_snapshot(&mut conn, other, &snapshot("G", 40.0, "USD", ts(0))).unwrap();

    assert_eq!(repo.remove_product(&mut conn, URL).unwrap(), 2);
    assert!(!repo.product_exists(&mut conn, URL).unwrap());
    assert!(repo.earliest_price(&mut conn, URL).unwrap().is_none());

    assert_eq!(repo.remove_product(&mut conn, URL).unwrap(), 0);
    assert_eq!(repo.remove_product(&mut conn, "https://shop.example/never").unwrap(), 0);

    // other products are untouched
    assert_eq!(repo.price_history(&mut conn, other).unwrap().len(), 1);
    let urls: Vec<String> =
        repo.list_products(&mut conn).unwrap().into_iter().map(|p| p.url).collect();
    assert_eq!(urls, vec![other.to_string()]);
}

#[test]
fn readding_after_remove_starts_a_fresh_baseline() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteHistoryRepo::new();

    repo.record_snapshot(&mut conn, URL, &snapshot("E", 100.0, "USD", ts(0))).unwrap();
    repo.remove_product(&mut conn, URL).unwrap();
    repo.record_snapshot(&mut conn, URL, &snapshot("E", 70.0, "USD", ts(30))).unwrap();

    assert_eq!(repo.earliest_price(&mut conn, URL).unwrap().unwrap().price, 70.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn earliest_is_minimum_time_first_inserted(
        entries in prop::collection::vec((0i64..20, 0u32..10_000), 1..12)
    ) {
        let (_db, mut conn) = setup_db();
        let repo = SqliteHistoryRepo::new();

        for (secs, cents) in &entries {
            let price = f64::from(*cents) / 100.0;
            repo.record_snapshot(&mut conn, URL, &snapshot("P", price, "USD", ts(*secs))).unwrap();
        }

        let min_secs = entries.iter().map(|(s, _)| *s).min().unwrap();
        let expected = entries.iter().find(|(s, _)| *s == min_secs).unwrap().1;
        let earliest = repo.earliest_price(&mut conn, URL).unwrap().unwrap();
        prop_assert_eq!(earliest.price, f64::from(expected) / 100.0);
        prop_assert_eq!(earliest.observed_at, ts(min_secs));

        let max_secs = entries.iter().map(|(s, _)| *s).max().unwrap();
        let expected_latest = entries.iter().rev().find(|(s, _)| *s == max_secs).unwrap().1;
        let latest = repo.latest_price(&mut conn, URL).unwrap().unwrap();
        prop_assert_eq!(latest.price, f64::from(expected_latest) / 100.0);
    }
}
