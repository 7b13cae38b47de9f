// SPDX-License-Identifier: MIT OR Apache-2.0
//! `voyage_ledger` - points, badges and login streaks for Voyage.
//!
//! Rewards travellers for contributing to the community:
//! - fixed points per [`ActionKind`] (reviews, photos, answers, bookings, ...)
//! - tiered badges unlocked when a counter crosses a threshold
//! - a consecutive-day login streak with a periodic bonus
//! - follower points that are returned on unfollow
//!
//! All state lives in a [`LedgerStore`]; the ledger itself holds only its
//! immutable [`LedgerConfig`].

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod actions;
mod badges;
mod config;
mod error;
mod ledger;
mod levels;
mod streak;

pub use actions::{ActionKind, CounterKind, PointTable};
pub use badges::{metric_for, BadgeProgress, BadgeRules, CatalogEntry, TierThresholds};
pub use config::{
    LedgerConfig, ENV_LEADERBOARD_MAX, ENV_MAX_CONFLICT_RETRIES, ENV_STREAK_BONUS,
    ENV_STREAK_INTERVAL_DAYS,
};
pub use error::{LedgerError, Result};
pub use ledger::{AwardOutcome, FollowOutcome, LeaderboardEntry, Ledger, LedgerProfile, LoginOutcome};
pub use levels::{level_from_points, level_progress, level_title, LevelProgress};
pub use streak::{is_bonus_day, StreakTransition};
pub use voyage_store::{
    Badge, BadgeCategory, BadgeTier, LedgerState, LedgerStore, MemoryStore, UserAccount,
};
