// SPDX-License-Identifier: MIT OR Apache-2.0
//! Traveller levels derived from the point total.

use serde::{Deserialize, Serialize};

/// Points required to reach each level.
const LEVEL_POINTS: [u64; 10] = [
    0,    // Level 1
    50,   // Level 2
    150,  // Level 3
    300,  // Level 4
    600,  // Level 5
    1000, // Level 6
    1600, // Level 7
    2500, // Level 8
    4000, // Level 9
    6000, // Level 10
];

/// Calculate level from total points.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn level_from_points(points: u64) -> u32 {
    LEVEL_POINTS
        .iter()
        .rposition(|&required| points >= required)
        .map_or(1, |idx| idx as u32 + 1)
}

/// Calculate progress within the current level.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn level_progress(points: u64) -> LevelProgress {
    let level = level_from_points(points);
    let idx = (level as usize).saturating_sub(1);

    let floor = LEVEL_POINTS.get(idx).copied().unwrap_or(0);
    let next = LEVEL_POINTS.get(idx + 1).copied();

    let points_in_level = points.saturating_sub(floor);
    let points_for_level = next.map_or(0, |n| n.saturating_sub(floor));

    let percentage = if points_for_level > 0 {
        ((points_in_level as f64 / points_for_level as f64) * 100.0).min(100.0)
    } else {
        100.0
    };

    LevelProgress {
        level,
        title: level_title(level).to_string(),
        points,
        points_in_level,
        points_for_level,
        percentage,
        is_max_level: next.is_none(),
    }
}

/// Progress within the current level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level (1-10).
    pub level: u32,
    /// Title for the level.
    pub title: String,
    /// Total points.
    pub points: u64,
    /// Points earned since reaching this level.
    pub points_in_level: u64,
    /// Points between this level and the next, zero at max level.
    pub points_for_level: u64,
    /// Percentage progress to the next level.
    pub percentage: f64,
    /// Whether at max level.
    pub is_max_level: bool,
}

/// Title earned at each level.
#[must_use]
pub fn level_title(level: u32) -> &'static str {
    match level {
        1 => "Day Tripper",
        2 => "Weekender",
        3 => "Backpacker",
        4 => "Wayfarer",
        5 => "Trailblazer",
        6 => "Globetrotter",
        7 => "Voyager",
        8 => "Pathfinder",
        9 => "Cartographer",
        10 => "World Explorer",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_points() {
        assert_eq!(level_from_points(0), 1);
        assert_eq!(level_from_points(49), 1);
        assert_eq!(level_from_points(50), 2);
        assert_eq!(level_from_points(150), 3);
        assert_eq!(level_from_points(6000), 10);
        assert_eq!(level_from_points(1_000_000), 10);
    }

    #[test]
    fn test_level_progress() {
        let progress = level_progress(100);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.title, "Weekender");
        assert_eq!(progress.points_in_level, 50);
        assert_eq!(progress.points_for_level, 100);
        assert_eq!(progress.percentage, 50.0);
        assert!(!progress.is_max_level);
    }

    #[test]
    fn test_level_progress_max() {
        let progress = level_progress(7000);
        assert_eq!(progress.level, 10);
        assert!(progress.is_max_level);
        assert_eq!(progress.percentage, 100.0);
    }

    #[test]
    fn test_level_progress_zero() {
        let progress = level_progress(0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.points_in_level, 0);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn test_level_title() {
        assert_eq!(level_title(1), "Day Tripper");
        assert_eq!(level_title(10), "World Explorer");
        assert_eq!(level_title(11), "Unknown");
    }
}
