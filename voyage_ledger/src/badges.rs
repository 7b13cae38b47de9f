// SPDX-License-Identifier: MIT OR Apache-2.0
//! Badge thresholds and evaluation.
//!
//! A badge is unlocked when a category's metric reaches a tier threshold.
//! Evaluation is a flat scan over categories and tiers against one read of
//! the ledger state. Every metric is a counter that badge bonuses never
//! touch, so the badges a user holds depend only on their counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voyage_store::{badge_id, Badge, BadgeCategory, BadgeGrant, BadgeTier, LedgerState};

use crate::actions::CounterKind;

/// Counter measured by each category.
///
/// Contributor reads `earned_points` rather than the point total so that
/// badge bonuses never qualify a user for further badges.
#[must_use]
pub const fn metric_for(category: BadgeCategory) -> CounterKind {
    match category {
        BadgeCategory::Reviewer => CounterKind::Reviews,
        BadgeCategory::Photographer => CounterKind::Photos,
        BadgeCategory::Helper => CounterKind::Answers,
        BadgeCategory::Contributor => CounterKind::EarnedPoints,
        BadgeCategory::Socialite => CounterKind::Followers,
        BadgeCategory::Explorer => CounterKind::Bookings,
    }
}

fn read_metric(category: BadgeCategory, state: &LedgerState) -> u64 {
    state.counter(metric_for(category).key())
}

/// Thresholds for the three tiers of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub bronze: u64,
    pub silver: u64,
    pub gold: u64,
}

impl TierThresholds {
    #[must_use]
    pub const fn new(bronze: u64, silver: u64, gold: u64) -> Self {
        Self {
            bronze,
            silver,
            gold,
        }
    }

    /// Threshold for `tier`.
    #[must_use]
    pub const fn get(&self, tier: BadgeTier) -> u64 {
        match tier {
            BadgeTier::Bronze => self.bronze,
            BadgeTier::Silver => self.silver,
            BadgeTier::Gold => self.gold,
        }
    }

    /// Checks that thresholds strictly increase with tier.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        0 < self.bronze && self.bronze < self.silver && self.silver < self.gold
    }
}

/// Immutable badge thresholds and tier bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRules {
    pub reviewer: TierThresholds,
    pub photographer: TierThresholds,
    pub helper: TierThresholds,
    pub contributor: TierThresholds,
    pub socialite: TierThresholds,
    pub explorer: TierThresholds,
    /// Bonus points for a Bronze/Silver/Gold unlock.
    pub bonus: TierThresholds,
}

impl Default for BadgeRules {
    fn default() -> Self {
        Self {
            reviewer: TierThresholds::new(5, 25, 100),
            photographer: TierThresholds::new(10, 50, 200),
            helper: TierThresholds::new(10, 50, 150),
            contributor: TierThresholds::new(100, 500, 2000),
            socialite: TierThresholds::new(10, 50, 250),
            explorer: TierThresholds::new(3, 10, 25),
            bonus: TierThresholds::new(20, 50, 100),
        }
    }
}

impl BadgeRules {
    /// Thresholds for `category`.
    #[must_use]
    pub const fn thresholds(&self, category: BadgeCategory) -> TierThresholds {
        match category {
            BadgeCategory::Reviewer => self.reviewer,
            BadgeCategory::Photographer => self.photographer,
            BadgeCategory::Helper => self.helper,
            BadgeCategory::Contributor => self.contributor,
            BadgeCategory::Socialite => self.socialite,
            BadgeCategory::Explorer => self.explorer,
        }
    }

    /// Bonus points for unlocking a badge of `tier`.
    #[must_use]
    pub const fn bonus(&self, tier: BadgeTier) -> u64 {
        self.bonus.get(tier)
    }

    /// Human description of how to earn `(category, tier)`.
    #[must_use]
    pub fn description(&self, category: BadgeCategory, tier: BadgeTier) -> String {
        let threshold = self.thresholds(category).get(tier);
        match metric_for(category) {
            CounterKind::EarnedPoints => format!("Earn {threshold} points"),
            CounterKind::Followers => format!("Gain {threshold} followers"),
            CounterKind::Bookings => format!("Book {threshold} trips"),
            counter => format!("Contribute {threshold} {}", counter.key()),
        }
    }

    /// Badges whose thresholds `state` meets but which it does not hold.
    ///
    /// Categories are scanned in [`BadgeCategory::ALL`] order and tiers in
    /// ascending order.
    #[must_use]
    pub fn pending(&self, state: &LedgerState, now: DateTime<Utc>) -> Vec<BadgeGrant> {
        let mut grants = Vec::new();
        for category in BadgeCategory::ALL {
            let value = read_metric(category, state);
            let thresholds = self.thresholds(category);
            for tier in BadgeTier::ALL {
                if value < thresholds.get(tier) {
                    break;
                }
                if state.has_badge(&badge_id(category, tier)) {
                    continue;
                }
                grants.push(BadgeGrant {
                    badge: Badge::new(category, tier, self.description(category, tier), now),
                    bonus: self.bonus(tier),
                });
            }
        }
        grants
    }

    /// Progress of `state` toward the next badge in each category.
    #[must_use]
    pub fn progress(&self, state: &LedgerState) -> Vec<BadgeProgress> {
        BadgeCategory::ALL
            .into_iter()
            .map(|category| {
                let current = read_metric(category, state);
                let thresholds = self.thresholds(category);
                let next_tier = BadgeTier::ALL
                    .into_iter()
                    .find(|tier| !state.has_badge(&badge_id(category, *tier)));
                let (next_threshold, percentage) = match next_tier {
                    Some(tier) => {
                        let threshold = thresholds.get(tier);
                        (Some(threshold), percent(current, threshold))
                    },
                    None => (None, 100.0),
                };
                BadgeProgress {
                    category,
                    current,
                    next_tier,
                    next_threshold,
                    percentage,
                }
            })
            .collect()
    }

    /// Every badge that can be earned.
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        BadgeCategory::ALL
            .into_iter()
            .flat_map(|category| {
                BadgeTier::ALL.into_iter().map(move |tier| CatalogEntry {
                    id: badge_id(category, tier),
                    name: format!("{} {}", tier.display_name(), category.display_name()),
                    category,
                    tier,
                    description: self.description(category, tier),
                    threshold: self.thresholds(category).get(tier),
                    bonus: self.bonus(tier),
                })
            })
            .collect()
    }

    /// Checks every category's thresholds ascend.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        BadgeCategory::ALL
            .into_iter()
            .all(|c| self.thresholds(c).is_ascending())
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(current: u64, target: u64) -> f64 {
    if target == 0 {
        return 100.0;
    }
    ((current as f64 / target as f64) * 100.0).min(100.0)
}

/// Progress toward the next badge in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeProgress {
    pub category: BadgeCategory,
    /// Current metric value.
    pub current: u64,
    /// Lowest tier not yet held, `None` when all are held.
    pub next_tier: Option<BadgeTier>,
    pub next_threshold: Option<u64>,
    /// Percentage toward `next_threshold`, capped at 100.
    pub percentage: f64,
}

/// A badge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub category: BadgeCategory,
    pub tier: BadgeTier,
    pub description: String,
    pub threshold: u64,
    pub bonus: u64,
}
