// SPDX-License-Identifier: MIT OR Apache-2.0
//! The gamification ledger.
//!
//! Every mutation is expressed as a [`LedgerDelta`] and handed to the store
//! in one call, so points and counters never drift apart. Badge unlocks are
//! a second delta computed from the post-update state; the store's
//! set-union guarantees a badge and its bonus are granted at most once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use voyage_store::{
    Badge, FollowerChange, LedgerDelta, LedgerState, LedgerStore, Precondition, StoreError,
    UserAccount,
};

use crate::actions::{ActionKind, CounterKind};
use crate::badges::{BadgeProgress, CatalogEntry};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::levels::{level_from_points, level_progress, LevelProgress};
use crate::streak::{is_bonus_day, StreakTransition};

/// Result of an award: the point total and any badges it unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
    /// Point total after the award and any badge bonuses.
    pub new_points: u64,
    /// Badges unlocked by this call.
    pub new_badges: Vec<Badge>,
    /// The award was stored but the badge step failed; the next
    /// evaluation will grant anything owed.
    pub badges_deferred: bool,
}

/// Result of [`Ledger::record_login`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    /// Whether a new calendar day was recorded.
    pub recorded: bool,
    /// Streak after the login.
    pub streak: u32,
    pub longest_streak: u32,
    /// Whether the streak bonus was paid.
    pub streak_bonus_awarded: bool,
    pub new_points: u64,
    pub new_badges: Vec<Badge>,
    pub badges_deferred: bool,
}

impl LoginOutcome {
    fn unchanged(state: &LedgerState) -> Self {
        Self {
            recorded: false,
            streak: state.login_streak,
            longest_streak: state.longest_streak,
            streak_bonus_awarded: false,
            new_points: state.points,
            new_badges: Vec::new(),
            badges_deferred: false,
        }
    }
}

/// Result of a follow or unfollow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowOutcome {
    /// False when the relationship was already in the requested state.
    pub applied: bool,
    /// The followed user's point total afterwards.
    pub target_points: u64,
    /// Badges the followed user unlocked.
    pub new_badges: Vec<Badge>,
    pub badges_deferred: bool,
}

/// A user's gamification summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerProfile {
    pub user_id: String,
    pub display_name: String,
    pub points: u64,
    pub level: LevelProgress,
    pub login_streak: u32,
    pub longest_streak: u32,
    pub last_login_date: Option<NaiveDate>,
    pub followers: usize,
    pub badges: Vec<Badge>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    pub user_id: String,
    pub display_name: String,
    pub points: u64,
    pub level: u32,
}

/// Points, counters, streaks and badges for every user in a store.
pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: LedgerStore> Ledger<S> {
    /// Creates a ledger over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if the configuration is invalid.
    pub fn new(store: S, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Creates a ledger with the default configuration.
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: LedgerConfig::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a new user with a zero-valued ledger.
    pub fn register_user(
        &self,
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<()> {
        let account = UserAccount::new(id, display_name, email);
        let id = account.id.clone();
        self.store.create_user(account)?;
        tracing::info!(user_id = %id, "registered user");
        Ok(())
    }

    /// Awards the points for `action` and bumps its counter.
    pub fn award_action(&self, user_id: &str, action: ActionKind) -> Result<AwardOutcome> {
        self.award_action_at(user_id, action, Utc::now())
    }

    /// Parses `action` by wire name and awards it.
    pub fn award_action_named(&self, user_id: &str, action: &str) -> Result<AwardOutcome> {
        let action: ActionKind = action.parse()?;
        self.award_action(user_id, action)
    }

    /// Like [`Self::award_action`], stamping unlocked badges with `now`.
    pub fn award_action_at(
        &self,
        user_id: &str,
        action: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<AwardOutcome> {
        if action == ActionKind::DailyLogin {
            return Err(LedgerError::InvalidArgument(
                "daily_login is recorded through record_login".to_string(),
            ));
        }

        let points = self.config.points.points_for(action);
        let delta = LedgerDelta::new()
            .with_points(signed(points))
            .with_counter(action.counter().key(), 1)
            .with_counter(CounterKind::EarnedPoints.key(), signed(points));
        let outcome = self.store.apply(user_id, &delta)?;
        tracing::debug!(
            user_id,
            action = %action,
            points,
            total = outcome.state.points,
            "awarded action"
        );

        Ok(self.settle_badges(user_id, &outcome.state, now))
    }

    /// Grants every badge the user currently qualifies for but lacks.
    ///
    /// Running it again without new activity grants nothing.
    pub fn evaluate_badges(&self, user_id: &str) -> Result<AwardOutcome> {
        self.evaluate_badges_at(user_id, Utc::now())
    }

    /// Like [`Self::evaluate_badges`], stamping badges with `now`.
    pub fn evaluate_badges_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<AwardOutcome> {
        let account = self.store.get_user(user_id)?;
        self.grant_badges(user_id, &account.ledger, now)
    }

    fn grant_badges(
        &self,
        user_id: &str,
        state: &LedgerState,
        now: DateTime<Utc>,
    ) -> Result<AwardOutcome> {
        let pending = self.config.badges.pending(state, now);
        if pending.is_empty() {
            return Ok(AwardOutcome {
                new_points: state.points,
                new_badges: Vec::new(),
                badges_deferred: false,
            });
        }

        let outcome = self
            .store
            .apply(user_id, &LedgerDelta::new().with_badges(pending))?;
        for badge in &outcome.inserted_badges {
            tracing::info!(user_id, badge = %badge.id, "badge unlocked");
        }
        Ok(AwardOutcome {
            new_points: outcome.state.points,
            new_badges: outcome.inserted_badges,
            badges_deferred: false,
        })
    }

    /// Badge step that follows a successful award.
    ///
    /// The award itself is already durable, so a failure here is logged and
    /// flagged with `badges_deferred` instead of failing the call; the next
    /// evaluation catches up.
    fn settle_badges(
        &self,
        user_id: &str,
        state: &LedgerState,
        now: DateTime<Utc>,
    ) -> AwardOutcome {
        self.grant_badges(user_id, state, now).unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "badge evaluation deferred");
            AwardOutcome {
                new_points: state.points,
                new_badges: Vec::new(),
                badges_deferred: true,
            }
        })
    }

    /// Records a login at `now`, at most once per UTC calendar day.
    pub fn record_login(&self, user_id: &str, now: DateTime<Utc>) -> Result<LoginOutcome> {
        let today = now.date_naive();
        let attempts = self.config.max_conflict_retries;

        for attempt in 1..=attempts {
            let account = self.store.get_user(user_id)?;
            let ledger = &account.ledger;
            let transition =
                StreakTransition::compute(ledger.last_login_date, ledger.login_streak, today);
            let Some(streak) = transition.new_streak() else {
                return Ok(LoginOutcome::unchanged(ledger));
            };

            let bonus = is_bonus_day(streak, self.config.streak_interval_days);
            let mut points = self.config.points.points_for(ActionKind::DailyLogin);
            if bonus {
                points = points.saturating_add(self.config.streak_bonus);
            }

            let delta = LedgerDelta::new()
                .with_precondition(Precondition::LastLoginIs(ledger.last_login_date))
                .with_points(signed(points))
                .with_counter(CounterKind::Logins.key(), 1)
                .with_counter(CounterKind::EarnedPoints.key(), signed(points))
                .with_login(streak, today);

            match self.store.apply(user_id, &delta) {
                Ok(outcome) => {
                    if let StreakTransition::Reset { previous } = transition {
                        tracing::debug!(user_id, previous, "login streak reset");
                    }
                    if bonus {
                        tracing::info!(user_id, streak, "login streak milestone");
                    }
                    let award = self.settle_badges(user_id, &outcome.state, now);
                    return Ok(LoginOutcome {
                        recorded: true,
                        streak: outcome.state.login_streak,
                        longest_streak: outcome.state.longest_streak,
                        streak_bonus_awarded: bonus,
                        new_points: award.new_points,
                        new_badges: award.new_badges,
                        badges_deferred: award.badges_deferred,
                    });
                },
                Err(StoreError::Conflict(reason)) => {
                    tracing::warn!(user_id, attempt, %reason, "login update raced, retrying");
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::StoreUnavailable(format!(
            "login update for {user_id} still conflicting after {attempts} attempts"
        )))
    }

    /// Parses an RFC 3339 timestamp and records a login at that instant.
    pub fn record_login_at(&self, user_id: &str, timestamp: &str) -> Result<LoginOutcome> {
        let now = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| {
                LedgerError::InvalidArgument(format!("invalid timestamp {timestamp:?}: {e}"))
            })?
            .with_timezone(&Utc);
        self.record_login(user_id, now)
    }

    /// Makes `follower_id` follow `target_id`, awarding the target.
    pub fn follow_user(&self, follower_id: &str, target_id: &str) -> Result<FollowOutcome> {
        self.follow_user_at(follower_id, target_id, Utc::now())
    }

    /// Like [`Self::follow_user`], stamping badges with `now`.
    pub fn follow_user_at(
        &self,
        follower_id: &str,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<FollowOutcome> {
        if follower_id == target_id {
            return Err(LedgerError::InvalidArgument(format!(
                "user {follower_id} cannot follow themselves"
            )));
        }
        if !self.store.exists(follower_id)? {
            return Err(LedgerError::NotFound(format!("user {follower_id}")));
        }

        let points = self.config.points.points_for(ActionKind::GainFollower);
        let delta = LedgerDelta::new()
            .with_precondition(Precondition::FollowerAbsent(follower_id.to_string()))
            .with_follower(FollowerChange::Add(follower_id.to_string()))
            .with_points(signed(points))
            .with_counter(CounterKind::Followers.key(), 1)
            .with_counter(CounterKind::EarnedPoints.key(), signed(points));

        match self.store.apply(target_id, &delta) {
            Ok(outcome) => {
                tracing::debug!(follower_id, target_id, "follow recorded");
                let award = self.settle_badges(target_id, &outcome.state, now);
                Ok(FollowOutcome {
                    applied: true,
                    target_points: award.new_points,
                    new_badges: award.new_badges,
                    badges_deferred: award.badges_deferred,
                })
            },
            Err(StoreError::Conflict(_)) => self.unchanged_follow(target_id),
            Err(e) => Err(e.into()),
        }
    }

    /// Makes `follower_id` stop following `target_id`.
    pub fn unfollow_user(&self, follower_id: &str, target_id: &str) -> Result<FollowOutcome> {
        self.revoke_follower_points(target_id, follower_id)
    }

    /// Removes `follower_id` from `target_id`'s followers and takes back
    /// the follower points. Earned badges are kept.
    pub fn revoke_follower_points(
        &self,
        target_id: &str,
        follower_id: &str,
    ) -> Result<FollowOutcome> {
        let points = self.config.points.points_for(ActionKind::GainFollower);
        let delta = LedgerDelta::new()
            .with_precondition(Precondition::FollowerPresent(follower_id.to_string()))
            .with_follower(FollowerChange::Remove(follower_id.to_string()))
            .with_points(-signed(points))
            .with_counter(CounterKind::Followers.key(), -1)
            .with_counter(CounterKind::EarnedPoints.key(), -signed(points));

        match self.store.apply(target_id, &delta) {
            Ok(outcome) => {
                tracing::debug!(follower_id, target_id, "follow removed");
                Ok(FollowOutcome {
                    applied: true,
                    target_points: outcome.state.points,
                    new_badges: Vec::new(),
                    badges_deferred: false,
                })
            },
            Err(StoreError::Conflict(_)) => self.unchanged_follow(target_id),
            Err(e) => Err(e.into()),
        }
    }

    fn unchanged_follow(&self, target_id: &str) -> Result<FollowOutcome> {
        let account = self.store.get_user(target_id)?;
        Ok(FollowOutcome {
            applied: false,
            target_points: account.ledger.points,
            new_badges: Vec::new(),
            badges_deferred: false,
        })
    }

    /// Returns the ledger state embedded in a user's record.
    pub fn state(&self, user_id: &str) -> Result<LedgerState> {
        Ok(self.store.get_user(user_id)?.ledger)
    }

    /// Summarises a user's points, level, streak and badges.
    pub fn profile(&self, user_id: &str) -> Result<LedgerProfile> {
        let account = self.store.get_user(user_id)?;
        let ledger = account.ledger;
        Ok(LedgerProfile {
            user_id: account.id,
            display_name: account.display_name,
            points: ledger.points,
            level: level_progress(ledger.points),
            login_streak: ledger.login_streak,
            longest_streak: ledger.longest_streak,
            last_login_date: ledger.last_login_date,
            followers: account.followers.len(),
            badges: ledger.badges,
        })
    }

    /// Progress toward the next badge in each category.
    pub fn badge_progress(&self, user_id: &str) -> Result<Vec<BadgeProgress>> {
        let account = self.store.get_user(user_id)?;
        Ok(self.config.badges.progress(&account.ledger))
    }

    /// Every badge that can be earned under this configuration.
    pub fn badge_catalog(&self) -> Vec<CatalogEntry> {
        self.config.badges.catalog()
    }

    /// Top users by points, ties broken by id.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit.min(self.config.leaderboard_max);
        let mut users = self.store.list_users()?;
        users.sort_by(|a, b| {
            b.ledger
                .points
                .cmp(&a.ledger.points)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(users
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(idx, user)| LeaderboardEntry {
                rank: idx + 1,
                level: level_from_points(user.ledger.points),
                points: user.ledger.points,
                user_id: user.id,
                display_name: user.display_name,
            })
            .collect())
    }
}

fn signed(points: u64) -> i64 {
    i64::try_from(points).unwrap_or(i64::MAX)
}
