// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ledger configuration.

use crate::actions::PointTable;
use crate::badges::BadgeRules;
use crate::error::{LedgerError, Result};

/// Streak bonus interval environment variable.
pub const ENV_STREAK_INTERVAL_DAYS: &str = "VOYAGE_STREAK_INTERVAL_DAYS";
/// Streak bonus points environment variable.
pub const ENV_STREAK_BONUS: &str = "VOYAGE_STREAK_BONUS";
/// Login conflict retry limit environment variable.
pub const ENV_MAX_CONFLICT_RETRIES: &str = "VOYAGE_MAX_CONFLICT_RETRIES";
/// Leaderboard size cap environment variable.
pub const ENV_LEADERBOARD_MAX: &str = "VOYAGE_LEADERBOARD_MAX";

/// Environment variable parsing helpers.
mod env_parse {
    use super::{LedgerError, Result};

    pub fn parse_u32(key: &str) -> Option<Result<u32>> {
        std::env::var(key).ok().map(|val| {
            val.trim()
                .parse()
                .map_err(|e| LedgerError::Config(format!("invalid {key}: {e}")))
        })
    }

    pub fn parse_u64(key: &str) -> Option<Result<u64>> {
        std::env::var(key).ok().map(|val| {
            val.trim()
                .parse()
                .map_err(|e| LedgerError::Config(format!("invalid {key}: {e}")))
        })
    }

    pub fn parse_usize(key: &str) -> Option<Result<usize>> {
        std::env::var(key).ok().map(|val| {
            val.trim()
                .parse()
                .map_err(|e| LedgerError::Config(format!("invalid {key}: {e}")))
        })
    }
}

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Points per action kind.
    pub points: PointTable,
    /// Badge thresholds and bonuses.
    pub badges: BadgeRules,
    /// A streak bonus is paid whenever the streak is a multiple of this.
    pub streak_interval_days: u32,
    /// Points paid on a streak bonus day.
    pub streak_bonus: u64,
    /// Attempts at a login update before giving up on conflicts.
    pub max_conflict_retries: u32,
    /// Upper bound on leaderboard size.
    pub leaderboard_max: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            points: PointTable::default(),
            badges: BadgeRules::default(),
            streak_interval_days: 7,
            streak_bonus: 20,
            max_conflict_retries: 3,
            leaderboard_max: 100,
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults overridden by any `VOYAGE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if a variable fails to parse or the
    /// result is invalid.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::parse_u32(ENV_STREAK_INTERVAL_DAYS) {
            config.streak_interval_days = v?;
        }
        if let Some(v) = env_parse::parse_u64(ENV_STREAK_BONUS) {
            config.streak_bonus = v?;
        }
        if let Some(v) = env_parse::parse_u32(ENV_MAX_CONFLICT_RETRIES) {
            config.max_conflict_retries = v?;
        }
        if let Some(v) = env_parse::parse_usize(ENV_LEADERBOARD_MAX) {
            config.leaderboard_max = v?;
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_points(mut self, points: PointTable) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn with_badges(mut self, badges: BadgeRules) -> Self {
        self.badges = badges;
        self
    }

    #[must_use]
    pub const fn with_streak_interval_days(mut self, days: u32) -> Self {
        self.streak_interval_days = days;
        self
    }

    #[must_use]
    pub const fn with_streak_bonus(mut self, bonus: u64) -> Self {
        self.streak_bonus = bonus;
        self
    }

    #[must_use]
    pub const fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_leaderboard_max(mut self, max: usize) -> Self {
        self.leaderboard_max = max;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an interval or limit is zero, or if badge
    /// thresholds do not strictly ascend by tier.
    pub fn validate(&self) -> Result<()> {
        if self.streak_interval_days == 0 {
            return Err(LedgerError::Config(
                "streak_interval_days must be > 0".to_string(),
            ));
        }
        if self.max_conflict_retries == 0 {
            return Err(LedgerError::Config(
                "max_conflict_retries must be > 0".to_string(),
            ));
        }
        if self.leaderboard_max == 0 {
            return Err(LedgerError::Config(
                "leaderboard_max must be > 0".to_string(),
            ));
        }
        if !self.badges.is_valid() {
            return Err(LedgerError::Config(
                "badge thresholds must be positive and ascend by tier".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::TierThresholds;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.streak_interval_days, 7);
        assert_eq!(config.streak_bonus, 20);
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.leaderboard_max, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = LedgerConfig::new()
            .with_streak_interval_days(5)
            .with_streak_bonus(40)
            .with_max_conflict_retries(1)
            .with_leaderboard_max(10);
        assert_eq!(config.streak_interval_days, 5);
        assert_eq!(config.streak_bonus, 40);
        assert_eq!(config.max_conflict_retries, 1);
        assert_eq!(config.leaderboard_max, 10);
    }

    #[test]
    fn test_validate_zero_interval() {
        let config = LedgerConfig::new().with_streak_interval_days(0);
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_validate_zero_retries() {
        let config = LedgerConfig::new().with_max_conflict_retries(0);
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_validate_badge_rules() {
        let mut rules = BadgeRules::default();
        rules.explorer = TierThresholds::new(0, 10, 25);
        let config = LedgerConfig::new().with_badges(rules);
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    // Each test touches a distinct variable so parallel tests do not race.
    #[test]
    fn test_env_parse_invalid() {
        std::env::set_var("VOYAGE_TEST_BAD_U32", "seven");
        let parsed = env_parse::parse_u32("VOYAGE_TEST_BAD_U32");
        assert!(matches!(parsed, Some(Err(LedgerError::Config(_)))));
        std::env::remove_var("VOYAGE_TEST_BAD_U32");
    }

    #[test]
    fn test_env_parse_valid() {
        std::env::set_var("VOYAGE_TEST_GOOD_U64", " 35 ");
        let parsed = env_parse::parse_u64("VOYAGE_TEST_GOOD_U64");
        assert!(matches!(parsed, Some(Ok(35))));
        std::env::remove_var("VOYAGE_TEST_GOOD_U64");
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var(ENV_STREAK_BONUS, "35");
        std::env::set_var(ENV_LEADERBOARD_MAX, "25");
        let config = LedgerConfig::from_env();
        std::env::remove_var(ENV_STREAK_BONUS);
        std::env::remove_var(ENV_LEADERBOARD_MAX);

        let config = config.unwrap();
        assert_eq!(config.streak_bonus, 35);
        assert_eq!(config.leaderboard_max, 25);
        assert_eq!(config.streak_interval_days, 7);
    }

    #[test]
    fn test_env_parse_missing() {
        assert!(env_parse::parse_usize("VOYAGE_TEST_UNSET_VARIABLE").is_none());
    }
}
