// SPDX-License-Identifier: MIT OR Apache-2.0
//! Action kinds, the counters they feed and the points they are worth.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A user behaviour that earns points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Posted a destination review.
    CreateReview,
    /// Received a like on a review.
    LikeReview,
    /// Uploaded a photo.
    UploadPhoto,
    /// Opened a forum thread.
    CreateThread,
    /// Answered a question.
    AnswerQuestion,
    /// Had an answer accepted as best.
    BestAnswer,
    /// First login of a calendar day.
    DailyLogin,
    /// Gained a follower.
    GainFollower,
    /// Updated profile details.
    UpdateProfile,
    /// Linked social accounts.
    AddSocialLinks,
    /// Verified an email address.
    VerifyEmail,
    /// A referred user signed up.
    ReferredUserJoins,
    /// Made a booking.
    CreateBooking,
}

impl ActionKind {
    /// Every action kind.
    pub const ALL: [Self; 13] = [
        Self::CreateReview,
        Self::LikeReview,
        Self::UploadPhoto,
        Self::CreateThread,
        Self::AnswerQuestion,
        Self::BestAnswer,
        Self::DailyLogin,
        Self::GainFollower,
        Self::UpdateProfile,
        Self::AddSocialLinks,
        Self::VerifyEmail,
        Self::ReferredUserJoins,
        Self::CreateBooking,
    ];

    /// Wire name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateReview => "create_review",
            Self::LikeReview => "like_review",
            Self::UploadPhoto => "upload_photo",
            Self::CreateThread => "create_thread",
            Self::AnswerQuestion => "answer_question",
            Self::BestAnswer => "best_answer",
            Self::DailyLogin => "daily_login",
            Self::GainFollower => "gain_follower",
            Self::UpdateProfile => "update_profile",
            Self::AddSocialLinks => "add_social_links",
            Self::VerifyEmail => "verify_email",
            Self::ReferredUserJoins => "referred_user_joins",
            Self::CreateBooking => "create_booking",
        }
    }

    /// The counter this action increments.
    #[must_use]
    pub const fn counter(&self) -> CounterKind {
        match self {
            Self::CreateReview => CounterKind::Reviews,
            Self::LikeReview => CounterKind::ReviewLikes,
            Self::UploadPhoto => CounterKind::Photos,
            Self::CreateThread => CounterKind::Threads,
            Self::AnswerQuestion => CounterKind::Answers,
            Self::BestAnswer => CounterKind::BestAnswers,
            Self::DailyLogin => CounterKind::Logins,
            Self::GainFollower => CounterKind::Followers,
            Self::UpdateProfile => CounterKind::ProfileUpdates,
            Self::AddSocialLinks => CounterKind::SocialLinks,
            Self::VerifyEmail => CounterKind::EmailVerified,
            Self::ReferredUserJoins => CounterKind::Referrals,
            Self::CreateBooking => CounterKind::Bookings,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LedgerError::InvalidArgument(format!("unknown action kind: {s}")))
    }
}

/// A per-user occurrence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    Reviews,
    ReviewLikes,
    Photos,
    Threads,
    Answers,
    BestAnswers,
    Logins,
    Followers,
    ProfileUpdates,
    SocialLinks,
    EmailVerified,
    Referrals,
    Bookings,
    /// Points earned from actions, logins and followers. Badge bonuses
    /// are not included.
    EarnedPoints,
}

impl CounterKind {
    /// Key under which the counter is persisted.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::ReviewLikes => "review_likes",
            Self::Photos => "photos",
            Self::Threads => "threads",
            Self::Answers => "answers",
            Self::BestAnswers => "best_answers",
            Self::Logins => "logins",
            Self::Followers => "followers",
            Self::ProfileUpdates => "profile_updates",
            Self::SocialLinks => "social_links",
            Self::EmailVerified => "email_verified",
            Self::Referrals => "referrals",
            Self::Bookings => "bookings",
            Self::EarnedPoints => "earned_points",
        }
    }
}

/// Fixed point value of each action kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTable {
    pub create_review: u64,
    pub like_review: u64,
    pub upload_photo: u64,
    pub create_thread: u64,
    pub answer_question: u64,
    pub best_answer: u64,
    pub daily_login: u64,
    pub gain_follower: u64,
    pub update_profile: u64,
    pub add_social_links: u64,
    pub verify_email: u64,
    pub referred_user_joins: u64,
    pub create_booking: u64,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            create_review: 10,
            like_review: 2,
            upload_photo: 5,
            create_thread: 8,
            answer_question: 8,
            best_answer: 15,
            daily_login: 1,
            gain_follower: 3,
            update_profile: 5,
            add_social_links: 5,
            verify_email: 10,
            referred_user_joins: 25,
            create_booking: 12,
        }
    }
}

impl PointTable {
    /// Points awarded for `kind`.
    #[must_use]
    pub const fn points_for(&self, kind: ActionKind) -> u64 {
        match kind {
            ActionKind::CreateReview => self.create_review,
            ActionKind::LikeReview => self.like_review,
            ActionKind::UploadPhoto => self.upload_photo,
            ActionKind::CreateThread => self.create_thread,
            ActionKind::AnswerQuestion => self.answer_question,
            ActionKind::BestAnswer => self.best_answer,
            ActionKind::DailyLogin => self.daily_login,
            ActionKind::GainFollower => self.gain_follower,
            ActionKind::UpdateProfile => self.update_profile,
            ActionKind::AddSocialLinks => self.add_social_links,
            ActionKind::VerifyEmail => self.verify_email,
            ActionKind::ReferredUserJoins => self.referred_user_joins,
            ActionKind::CreateBooking => self.create_booking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip_names() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "teleport".parse::<ActionKind>().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!("CREATE_REVIEW".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_default_points() {
        let table = PointTable::default();
        assert_eq!(table.points_for(ActionKind::CreateReview), 10);
        assert_eq!(table.points_for(ActionKind::UploadPhoto), 5);
        assert_eq!(table.points_for(ActionKind::CreateThread), 8);
        assert_eq!(table.points_for(ActionKind::AnswerQuestion), 8);
        assert_eq!(table.points_for(ActionKind::BestAnswer), 15);
        assert_eq!(table.points_for(ActionKind::DailyLogin), 1);
        assert_eq!(table.points_for(ActionKind::GainFollower), 3);
        assert_eq!(table.points_for(ActionKind::ReferredUserJoins), 25);
    }

    #[test]
    fn test_counter_keys_are_distinct() {
        let mut keys: Vec<&str> = ActionKind::ALL.iter().map(|k| k.counter().key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ActionKind::ALL.len());
    }

    #[test]
    fn test_serde_matches_wire_name() {
        let json = serde_json::to_string(&ActionKind::ReferredUserJoins).unwrap();
        assert_eq!(json, "\"referred_user_joins\"");
        let json = serde_json::to_string(&CounterKind::BestAnswers).unwrap();
        assert_eq!(json, format!("\"{}\"", CounterKind::BestAnswers.key()));
    }
}
