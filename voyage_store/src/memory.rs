// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory [`LedgerStore`] with JSON snapshots.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::delta::{ApplyOutcome, LedgerDelta};
use crate::error::{Result, StoreError};
use crate::model::UserAccount;
use crate::store::LedgerStore;

/// Snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    users: Vec<UserAccount>,
}

/// Thread-safe in-memory user store.
///
/// Each record sits behind its `DashMap` shard lock, so [`LedgerStore::apply`]
/// sees and mutates a record without interleaving with other writers of
/// the same user. Snapshots take the write side of `gate` so that they
/// observe no half-finished batch of writes.
pub struct MemoryStore {
    users: DashMap<String, UserAccount>,
    gate: RwLock<()>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            users: DashMap::new(),
            gate: RwLock::new(()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Switches the store on or off. While off every call fails with
    /// [`StoreError::Unavailable`] and nothing is mutated.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        if !available {
            tracing::warn!("memory store marked unavailable");
        }
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_string()))
        }
    }

    /// Writes every user record to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let _guard = self.gate.write();
        let mut users: Vec<UserAccount> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        let count = users.len();

        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(
            &mut writer,
            &Snapshot {
                version: SNAPSHOT_VERSION,
                users,
            },
        )?;
        writer.flush()?;

        tracing::info!(users = count, path = %path.as_ref().display(), "saved store snapshot");
        Ok(())
    }

    /// Loads a store from a snapshot written by [`Self::save_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has an unknown
    /// version.
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let store = Self::new();
        for account in snapshot.users {
            store.users.insert(account.id.clone(), account);
        }
        tracing::info!(users = store.len(), path = %path.as_ref().display(), "loaded store snapshot");
        Ok(store)
    }
}

impl LedgerStore for MemoryStore {
    fn create_user(&self, account: UserAccount) -> Result<()> {
        self.ensure_available()?;
        let _guard = self.gate.read();
        match self.users.entry(account.id.clone()) {
            Entry::Occupied(e) => Err(StoreError::AlreadyExists(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(account);
                Ok(())
            },
        }
    }

    fn get_user(&self, id: &str) -> Result<UserAccount> {
        self.ensure_available()?;
        self.users
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete_user(&self, id: &str) -> Result<()> {
        self.ensure_available()?;
        let _guard = self.gate.read();
        self.users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.ensure_available()?;
        Ok(self.users.iter().map(|e| e.value().clone()).collect())
    }

    fn apply(&self, id: &str, delta: &LedgerDelta) -> Result<ApplyOutcome> {
        self.ensure_available()?;
        let _guard = self.gate.read();
        let mut entry = self
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(precondition) = &delta.precondition {
            precondition.check(&entry).map_err(StoreError::Conflict)?;
        }

        let inserted_badges = delta.apply_to(&mut entry);
        tracing::debug!(
            user_id = id,
            points = entry.ledger.points,
            inserted = inserted_badges.len(),
            "applied ledger delta"
        );

        Ok(ApplyOutcome {
            state: entry.ledger.clone(),
            inserted_badges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::Precondition;

    fn store_with(ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for id in ids {
            store
                .create_user(UserAccount::new(*id, *id, format!("{id}@example.com")))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_create_and_get() {
        let store = store_with(&["u-1"]);
        let account = store.get_user("u-1").unwrap();
        assert_eq!(account.id, "u-1");
        assert_eq!(store.len(), 1);
        assert!(store.exists("u-1").unwrap());
        assert!(!store.exists("u-2").unwrap());
    }

    #[test]
    fn test_create_duplicate() {
        let store = store_with(&["u-1"]);
        let err = store
            .create_user(UserAccount::new("u-1", "again", "x@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_user("nobody"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let store = store_with(&["u-1"]);
        store.delete_user("u-1").unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete_user("u-1"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_apply_returns_post_state() {
        let store = store_with(&["u-1"]);
        let delta = LedgerDelta::new().with_points(8).with_counter("threads", 1);
        let outcome = store.apply("u-1", &delta).unwrap();
        assert_eq!(outcome.state.points, 8);
        assert_eq!(outcome.state.counter("threads"), 1);
        assert_eq!(store.get_user("u-1").unwrap().ledger, outcome.state);
    }

    #[test]
    fn test_apply_conflict_applies_nothing() {
        let store = store_with(&["u-1"]);
        let delta = LedgerDelta::new()
            .with_precondition(Precondition::FollowerPresent("u-2".to_string()))
            .with_points(3);
        let err = store.apply("u-1", &delta).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.get_user("u-1").unwrap().ledger.points, 0);
    }

    #[test]
    fn test_apply_missing_user() {
        let store = MemoryStore::new();
        let err = store.apply("nobody", &LedgerDelta::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_unavailable() {
        let store = store_with(&["u-1"]);
        store.set_available(false);
        let err = store
            .apply("u-1", &LedgerDelta::new().with_points(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(matches!(store.list_users(), Err(StoreError::Unavailable(_))));

        store.set_available(true);
        assert_eq!(store.get_user("u-1").unwrap().ledger.points, 0);
    }

    #[test]
    fn test_snapshot_version_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"version": 99, "users": []}"#).unwrap();
        assert!(matches!(
            MemoryStore::load_snapshot(&path),
            Err(StoreError::Snapshot(_))
        ));
    }
}
