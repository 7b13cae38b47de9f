// SPDX-License-Identifier: MIT OR Apache-2.0
//! The storage seam between the ledger and the document database.

use std::sync::Arc;

use crate::delta::{ApplyOutcome, LedgerDelta};
use crate::error::{Result, StoreError};
use crate::model::UserAccount;

/// Operations the ledger needs from a document database.
///
/// Every mutating call is a single atomic update of one user record.
/// Implementations must apply a [`LedgerDelta`] fully or not at all, and
/// must reject it with [`StoreError::Conflict`] when its precondition
/// does not hold.
pub trait LedgerStore: Send + Sync {
    /// Creates a user record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the id is taken.
    fn create_user(&self, account: UserAccount) -> Result<()>;

    /// Fetches a user record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such user.
    fn get_user(&self, id: &str) -> Result<UserAccount>;

    /// Deletes a user record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such user.
    fn delete_user(&self, id: &str) -> Result<()>;

    /// Lists every user record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on transient failure.
    fn list_users(&self) -> Result<Vec<UserAccount>>;

    /// Atomically applies `delta` to the user's record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such user and
    /// [`StoreError::Conflict`] if the precondition fails.
    fn apply(&self, id: &str, delta: &LedgerDelta) -> Result<ApplyOutcome>;

    /// Checks whether a user record exists.
    ///
    /// # Errors
    ///
    /// Propagates any failure other than [`StoreError::NotFound`].
    fn exists(&self, id: &str) -> Result<bool> {
        match self.get_user(id) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn create_user(&self, account: UserAccount) -> Result<()> {
        (**self).create_user(account)
    }

    fn get_user(&self, id: &str) -> Result<UserAccount> {
        (**self).get_user(id)
    }

    fn delete_user(&self, id: &str) -> Result<()> {
        (**self).delete_user(id)
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        (**self).list_users()
    }

    fn apply(&self, id: &str, delta: &LedgerDelta) -> Result<ApplyOutcome> {
        (**self).apply(id, delta)
    }
}
