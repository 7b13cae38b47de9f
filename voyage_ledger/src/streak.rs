// SPDX-License-Identifier: MIT OR Apache-2.0
//! Consecutive-day login streaks.
//!
//! Days are compared as UTC calendar dates, never as elapsed durations, so
//! a login at 23:59 followed by one at 00:01 continues the streak.

use chrono::NaiveDate;

/// Outcome of a login on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// A login was already recorded on this day (or a later one).
    AlreadyRecorded,
    /// First login ever.
    Started,
    /// Login on the day after the previous one.
    Continued {
        /// Streak length after this login.
        streak: u32,
    },
    /// Login after a gap of more than one day.
    Reset {
        /// Length of the streak that was broken.
        previous: u32,
    },
}

impl StreakTransition {
    /// Computes the transition from the stored state to a login on `today`.
    #[must_use]
    pub fn compute(last_login: Option<NaiveDate>, streak: u32, today: NaiveDate) -> Self {
        let Some(last) = last_login else {
            return Self::Started;
        };
        match (today - last).num_days() {
            i64::MIN..=0 => Self::AlreadyRecorded,
            1 => Self::Continued {
                streak: streak.saturating_add(1),
            },
            _ => Self::Reset { previous: streak },
        }
    }

    /// Streak length after this transition, `None` when nothing is recorded.
    #[must_use]
    pub const fn new_streak(&self) -> Option<u32> {
        match self {
            Self::AlreadyRecorded => None,
            Self::Started | Self::Reset { .. } => Some(1),
            Self::Continued { streak } => Some(*streak),
        }
    }
}

/// Checks whether `streak` earns a streak bonus for the given interval.
#[must_use]
pub const fn is_bonus_day(streak: u32, interval: u32) -> bool {
    interval > 0 && streak > 0 && streak % interval == 0
}
