// SPDX-License-Identifier: MIT OR Apache-2.0
//! Atomic multi-field updates against a single user record.
//!
//! A [`LedgerDelta`] is the unit of mutation: every field it names is
//! changed together or not at all. Increments are signed and saturate at
//! zero so that concurrent deltas commute.

use chrono::NaiveDate;

use crate::model::{Badge, LedgerState, UserAccount};

/// Condition checked against the record before a delta is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// `lastLoginDate` must equal the given value.
    LastLoginIs(Option<NaiveDate>),
    /// The given user must not already follow this record.
    FollowerAbsent(String),
    /// The given user must currently follow this record.
    FollowerPresent(String),
}

impl Precondition {
    /// Checks the condition, returning a description of the mismatch.
    pub(crate) fn check(&self, account: &UserAccount) -> std::result::Result<(), String> {
        match self {
            Self::LastLoginIs(expected) => {
                if account.ledger.last_login_date == *expected {
                    Ok(())
                } else {
                    Err(format!(
                        "lastLoginDate is {:?}, expected {expected:?}",
                        account.ledger.last_login_date
                    ))
                }
            },
            Self::FollowerAbsent(id) => {
                if account.followers.contains(id) {
                    Err(format!("{id} already follows {}", account.id))
                } else {
                    Ok(())
                }
            },
            Self::FollowerPresent(id) => {
                if account.followers.contains(id) {
                    Ok(())
                } else {
                    Err(format!("{id} does not follow {}", account.id))
                }
            },
        }
    }
}

/// Change to a follower set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerChange {
    /// Insert a follower id.
    Add(String),
    /// Remove a follower id.
    Remove(String),
}

/// A badge to union into the badge set, with the points it grants on
/// first insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeGrant {
    /// Badge record.
    pub badge: Badge,
    /// Bonus points added only when the badge was not already held.
    pub bonus: u64,
}

/// A set of field changes applied atomically to one user record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerDelta {
    /// Optional guard checked before anything is applied.
    pub precondition: Option<Precondition>,
    /// Signed change to `points`.
    pub points: i64,
    /// Signed changes to named counters. A counter that lands on zero is
    /// dropped from the map.
    pub counters: Vec<(String, i64)>,
    /// New `loginStreak`.
    pub set_login_streak: Option<u32>,
    /// New `lastLoginDate`.
    pub set_last_login: Option<NaiveDate>,
    /// Follower set change.
    pub follower: Option<FollowerChange>,
    /// Badges to union into the badge set.
    pub badges: Vec<BadgeGrant>,
}

impl LedgerDelta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    #[must_use]
    pub const fn with_points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn with_counter(mut self, name: impl Into<String>, by: i64) -> Self {
        self.counters.push((name.into(), by));
        self
    }

    #[must_use]
    pub const fn with_login(mut self, streak: u32, date: NaiveDate) -> Self {
        self.set_login_streak = Some(streak);
        self.set_last_login = Some(date);
        self
    }

    #[must_use]
    pub fn with_follower(mut self, change: FollowerChange) -> Self {
        self.follower = Some(change);
        self
    }

    #[must_use]
    pub fn with_badges(mut self, badges: Vec<BadgeGrant>) -> Self {
        self.badges = badges;
        self
    }

    /// Applies the delta to `account` in place.
    ///
    /// The precondition must already have been checked by the caller.
    /// Returns the badges that were newly inserted.
    pub(crate) fn apply_to(&self, account: &mut UserAccount) -> Vec<Badge> {
        let ledger = &mut account.ledger;
        ledger.points = saturating_add_signed(ledger.points, self.points);

        for (name, by) in &self.counters {
            let next = saturating_add_signed(ledger.counter(name), *by);
            if next == 0 {
                ledger.counters.remove(name);
            } else {
                ledger.counters.insert(name.clone(), next);
            }
        }

        if let Some(streak) = self.set_login_streak {
            ledger.login_streak = streak;
            ledger.longest_streak = ledger.longest_streak.max(streak);
        }
        if let Some(date) = self.set_last_login {
            ledger.last_login_date = Some(date);
        }

        match &self.follower {
            Some(FollowerChange::Add(id)) => {
                account.followers.insert(id.clone());
            },
            Some(FollowerChange::Remove(id)) => {
                account.followers.remove(id);
            },
            None => {},
        }

        let mut inserted = Vec::new();
        for grant in &self.badges {
            if !ledger.has_badge(&grant.badge.id) {
                ledger.badges.push(grant.badge.clone());
                ledger.points = ledger.points.saturating_add(grant.bonus);
                inserted.push(grant.badge.clone());
            }
        }
        inserted
    }
}

fn saturating_add_signed(value: u64, by: i64) -> u64 {
    if by >= 0 {
        value.saturating_add(by.unsigned_abs())
    } else {
        value.saturating_sub(by.unsigned_abs())
    }
}

/// Result of a successful [`LedgerDelta`] application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Ledger state after the update.
    pub state: LedgerState,
    /// Badges this delta inserted (excludes ones already held).
    pub inserted_badges: Vec<Badge>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{BadgeCategory, BadgeTier};

    fn account() -> UserAccount {
        UserAccount::new("u-1", "Ada", "ada@example.com")
    }

    fn grant(category: BadgeCategory, tier: BadgeTier, bonus: u64) -> BadgeGrant {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        BadgeGrant {
            badge: Badge::new(category, tier, "test", at),
            bonus,
        }
    }

    #[test]
    fn test_points_and_counters() {
        let mut acc = account();
        let delta = LedgerDelta::new()
            .with_points(10)
            .with_counter("reviews", 1);
        delta.apply_to(&mut acc);
        assert_eq!(acc.ledger.points, 10);
        assert_eq!(acc.ledger.counter("reviews"), 1);
    }

    #[test]
    fn test_decrement_saturates() {
        let mut acc = account();
        acc.ledger.points = 2;
        let delta = LedgerDelta::new()
            .with_points(-5)
            .with_counter("followers", -1);
        delta.apply_to(&mut acc);
        assert_eq!(acc.ledger.points, 0);
        assert_eq!(acc.ledger.counter("followers"), 0);
        assert!(acc.ledger.counters.is_empty());
    }

    #[test]
    fn test_badge_union_bonus_once() {
        let mut acc = account();
        let delta = LedgerDelta::new()
            .with_badges(vec![grant(BadgeCategory::Reviewer, BadgeTier::Bronze, 20)]);

        let first = delta.apply_to(&mut acc);
        assert_eq!(first.len(), 1);
        assert_eq!(acc.ledger.points, 20);

        let second = delta.apply_to(&mut acc);
        assert!(second.is_empty());
        assert_eq!(acc.ledger.points, 20);
        assert_eq!(acc.ledger.badges.len(), 1);
    }

    #[test]
    fn test_login_updates_longest() {
        let mut acc = account();
        acc.ledger.longest_streak = 4;
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        LedgerDelta::new().with_login(1, day).apply_to(&mut acc);
        assert_eq!(acc.ledger.login_streak, 1);
        assert_eq!(acc.ledger.longest_streak, 4);
        assert_eq!(acc.ledger.last_login_date, Some(day));

        LedgerDelta::new().with_login(5, day).apply_to(&mut acc);
        assert_eq!(acc.ledger.longest_streak, 5);
    }

    #[test]
    fn test_follower_changes() {
        let mut acc = account();
        LedgerDelta::new()
            .with_follower(FollowerChange::Add("u-2".to_string()))
            .apply_to(&mut acc);
        assert!(acc.followers.contains("u-2"));
        LedgerDelta::new()
            .with_follower(FollowerChange::Remove("u-2".to_string()))
            .apply_to(&mut acc);
        assert!(acc.followers.is_empty());
    }

    #[test]
    fn test_preconditions() {
        let mut acc = account();
        assert!(Precondition::LastLoginIs(None).check(&acc).is_ok());
        acc.ledger.last_login_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(Precondition::LastLoginIs(None).check(&acc).is_err());

        assert!(Precondition::FollowerAbsent("u-2".into()).check(&acc).is_ok());
        assert!(Precondition::FollowerPresent("u-2".into()).check(&acc).is_err());
        acc.followers.insert("u-2".to_string());
        assert!(Precondition::FollowerAbsent("u-2".into()).check(&acc).is_err());
        assert!(Precondition::FollowerPresent("u-2".into()).check(&acc).is_ok());
    }
}
