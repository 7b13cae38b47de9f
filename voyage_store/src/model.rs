// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted user records and the ledger state embedded in them.
//!
//! Field names follow the document layout shared with the rest of the
//! application: `points`, `counters`, `loginStreak`, `lastLoginDate` and
//! `badges` live on every user record.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Badge tier, ordered by rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// Entry tier.
    Bronze,
    /// Middle tier.
    Silver,
    /// Top tier.
    Gold,
}

impl BadgeTier {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }

    /// Returns the upper-case code used in badge ids.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
        }
    }
}

/// Badge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    /// Writes reviews.
    Reviewer,
    /// Uploads photos.
    Photographer,
    /// Answers questions.
    Helper,
    /// Accumulates points across everything.
    Contributor,
    /// Gains followers.
    Socialite,
    /// Books trips.
    Explorer,
}

impl BadgeCategory {
    /// All categories in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::Reviewer,
        Self::Photographer,
        Self::Helper,
        Self::Contributor,
        Self::Socialite,
        Self::Explorer,
    ];

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Reviewer => "Reviewer",
            Self::Photographer => "Photographer",
            Self::Helper => "Helper",
            Self::Contributor => "Contributor",
            Self::Socialite => "Socialite",
            Self::Explorer => "Explorer",
        }
    }

    /// Returns the upper-case code used in badge ids.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Reviewer => "REVIEWER",
            Self::Photographer => "PHOTOGRAPHER",
            Self::Helper => "HELPER",
            Self::Contributor => "CONTRIBUTOR",
            Self::Socialite => "SOCIALITE",
            Self::Explorer => "EXPLORER",
        }
    }
}

/// Builds the id for a (category, tier) pair, e.g. `REVIEWER_GOLD`.
#[must_use]
pub fn badge_id(category: BadgeCategory, tier: BadgeTier) -> String {
    format!("{}_{}", category.code(), tier.code())
}

/// An earned badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Unique identifier, `CATEGORY_TIER`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Badge category.
    pub category: BadgeCategory,
    /// Badge tier.
    pub tier: BadgeTier,
    /// What the holder did to earn it.
    pub description: String,
    /// When it was awarded.
    pub awarded_at: DateTime<Utc>,
}

impl Badge {
    /// Creates a badge for `(category, tier)` awarded at `awarded_at`.
    #[must_use]
    pub fn new(
        category: BadgeCategory,
        tier: BadgeTier,
        description: impl Into<String>,
        awarded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: badge_id(category, tier),
            name: format!("{} {}", tier.display_name(), category.display_name()),
            category,
            tier,
            description: description.into(),
            awarded_at,
        }
    }
}

/// Gamification state embedded in a user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// Running point total.
    pub points: u64,
    /// Occurrence count per counter name.
    pub counters: BTreeMap<String, u64>,
    /// Consecutive-day login count.
    pub login_streak: u32,
    /// Longest streak ever reached.
    #[serde(default)]
    pub longest_streak: u32,
    /// Last calendar day (UTC) a login was recorded.
    pub last_login_date: Option<NaiveDate>,
    /// Earned badges, unique by id.
    pub badges: Vec<Badge>,
}

impl LedgerState {
    /// Returns the value of a counter, zero when never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Checks whether a badge id is held.
    #[must_use]
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }
}

/// A user record as stored by the document database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// User identifier.
    pub id: String,
    /// Public display name.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Free-form profile fields such as `bio` or `homeCity`.
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    /// Ids of users following this user.
    #[serde(default)]
    pub followers: BTreeSet<String>,
    /// Embedded ledger state.
    #[serde(flatten)]
    pub ledger: LedgerState,
}

impl UserAccount {
    /// Creates an account with a zero-valued ledger.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
            profile: BTreeMap::new(),
            followers: BTreeSet::new(),
            ledger: LedgerState::default(),
        }
    }

    /// Sets a profile field.
    #[must_use]
    pub fn with_profile_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}
