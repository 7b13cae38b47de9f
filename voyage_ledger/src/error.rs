// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the gamification ledger.

use thiserror::Error;
use voyage_store::StoreError;

/// Ledger error type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LedgerError {
    /// Referenced user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unrecognized action kind, malformed timestamp or invalid request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transient failure talking to the backing store. Callers retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("user {id}")),
            StoreError::AlreadyExists(id) => {
                Self::InvalidArgument(format!("user {id} already exists"))
            },
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
