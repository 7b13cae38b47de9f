// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot and concurrency tests for `MemoryStore`.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use voyage_store::{
    Badge, BadgeCategory, BadgeGrant, BadgeTier, LedgerDelta, LedgerStore, MemoryStore,
    UserAccount,
};

#[test]
fn test_snapshot_roundtrip_preserves_layout() {
    let store = MemoryStore::new();
    store
        .create_user(UserAccount::new("ada", "Ada", "ada@example.com"))
        .unwrap();
    store
        .create_user(UserAccount::new("lin", "Lin", "lin@example.com"))
        .unwrap();

    let at = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();
    let delta = LedgerDelta::new()
        .with_points(50)
        .with_counter("reviews", 5)
        .with_login(2, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .with_badges(vec![BadgeGrant {
            badge: Badge::new(BadgeCategory::Reviewer, BadgeTier::Bronze, "Write 5 reviews", at),
            bonus: 20,
        }]);
    store.apply("ada", &delta).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    store.save_snapshot(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let ada = &raw["users"][0];
    assert_eq!(ada["id"], "ada");
    assert_eq!(ada["points"], 70);
    assert_eq!(ada["lastLoginDate"], "2024-05-02");
    assert_eq!(ada["badges"][0]["id"], "REVIEWER_BRONZE");

    let loaded = MemoryStore::load_snapshot(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get_user("ada").unwrap(),
        store.get_user("ada").unwrap()
    );
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    let store = Arc::new(MemoryStore::new());
    store
        .create_user(UserAccount::new("ada", "Ada", "ada@example.com"))
        .unwrap();

    std::thread::scope(|s| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..250 {
                    let delta = LedgerDelta::new().with_points(5).with_counter("photos", 1);
                    store.apply("ada", &delta).unwrap();
                }
            });
        }
    });

    let ledger = store.get_user("ada").unwrap().ledger;
    assert_eq!(ledger.counter("photos"), 2000);
    assert_eq!(ledger.points, 10_000);
}

#[test]
fn test_concurrent_badge_grants_award_bonus_once() {
    let store = Arc::new(MemoryStore::new());
    store
        .create_user(UserAccount::new("ada", "Ada", "ada@example.com"))
        .unwrap();
    let at = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();

    std::thread::scope(|s| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            s.spawn(move || {
                let delta = LedgerDelta::new().with_badges(vec![BadgeGrant {
                    badge: Badge::new(BadgeCategory::Helper, BadgeTier::Bronze, "test", at),
                    bonus: 20,
                }]);
                store.apply("ada", &delta).unwrap();
            });
        }
    });

    let ledger = store.get_user("ada").unwrap().ledger;
    assert_eq!(ledger.badges.len(), 1);
    assert_eq!(ledger.points, 20);
}
