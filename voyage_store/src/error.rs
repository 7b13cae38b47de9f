// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the ledger document store.

use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// No user record with this id.
    #[error("user not found: {0}")]
    NotFound(String),

    /// A user record with this id already exists.
    #[error("user already exists: {0}")]
    AlreadyExists(String),

    /// A delta precondition did not hold; nothing was applied.
    #[error("precondition failed: {0}")]
    Conflict(String),

    /// Transient failure reaching the backing store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Snapshot encode or decode failure.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Snapshot(e.to_string())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
