// SPDX-License-Identifier: MIT OR Apache-2.0
//! `voyage_store` - user records for the Voyage gamification ledger.
//!
//! Models the slice of the hosted document database that the ledger
//! touches:
//! - user records with an embedded [`LedgerState`]
//! - atomic multi-field [`LedgerDelta`] updates with optional preconditions
//! - badge set-union that grants bonus points only on first insert
//! - an in-memory [`MemoryStore`] with JSON snapshots

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

mod delta;
mod error;
mod memory;
mod model;
mod store;

pub use delta::{ApplyOutcome, BadgeGrant, FollowerChange, LedgerDelta, Precondition};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use model::{badge_id, Badge, BadgeCategory, BadgeTier, LedgerState, UserAccount};
pub use store::LedgerStore;
