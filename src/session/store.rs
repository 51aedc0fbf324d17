// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable session store with lazy expiry.
//!
//! redb holds the source of truth; an in-process LRU cache fronts it for the
//! hot path (every guarded operation reads the session). The cache is
//! written through on `put` and dropped on `revoke`, so it can never serve a
//! session the database no longer considers live. A read that misses the
//! cache repopulates it only when no write committed since the database
//! read, tracked by a write epoch; without that, a revoke landing between
//! the read and the insert would be shadowed by the stale record until
//! natural expiry. Expiry is evaluated on every read against the injected
//! clock, never against cache age.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::storage::{principal_key, AuthDb, StoreResult, SESSIONS};
use alloy::primitives::Address;

/// Max principals kept in the read cache.
const CACHE_CAPACITY: usize = 1024;

/// Persisted session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unix seconds after which the session is dead (`expires_at <= now`).
    pub expires_at: i64,
    /// Unix seconds of the activation that produced this record.
    pub activated_at: i64,
    /// Cleared by administrative revoke.
    pub active: bool,
}

impl SessionRecord {
    /// Whether the record represents a live session at `now`.
    pub fn is_live(&self, now: i64) -> bool {
        self.active && self.expires_at > now
    }
}

/// Principal → session record mapping.
pub struct SessionStore {
    db: Arc<AuthDb>,
    cache: Mutex<LruCache<String, SessionRecord>>,
    clock: SharedClock,
    /// Bumped after every committed write; a cache refill from `get` is
    /// discarded when the epoch moved since its database read.
    write_epoch: AtomicU64,
}

impl SessionStore {
    pub fn new(db: Arc<AuthDb>, clock: SharedClock) -> Self {
        Self {
            db,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::new(1).unwrap()),
            )),
            clock,
            write_epoch: AtomicU64::new(0),
        }
    }

    /// Get the live session for a principal.
    ///
    /// Lazy expiry: an expired or revoked record behaves as if no session
    /// exists, independent of whether a physical delete has occurred.
    pub fn get(&self, principal: &Address) -> StoreResult<Option<SessionRecord>> {
        let now = self.clock.now_unix();
        let key = principal_key(principal);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(record) = cache.get(&key) {
                return Ok(Some(record.clone()).filter(|r| r.is_live(now)));
            }
        }

        let epoch = self.write_epoch.load(Ordering::Acquire);
        let record = self.read_record(&key)?;
        if let Some(ref record) = record {
            self.cache_unless_superseded(epoch, key, record.clone());
        }
        Ok(record.filter(|r| r.is_live(now)))
    }

    /// Write (or overwrite) the session record for a principal.
    ///
    /// A new activation always supersedes a prior record, even an unexpired
    /// one; this is what makes refresh last-write-wins.
    pub fn put(&self, principal: &Address, record: SessionRecord) -> StoreResult<()> {
        let key = principal_key(principal);

        let write_txn = self.db.database().begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let bytes = serde_json::to_vec(&record)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        self.write_epoch.fetch_add(1, Ordering::AcqRel);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, record);
        }
        Ok(())
    }

    /// Administrative takedown: force the next `get` to report absent.
    ///
    /// The record is kept with `active=false` rather than deleted, so the
    /// takedown remains visible in the database. No-op when no record exists.
    pub fn revoke(&self, principal: &Address) -> StoreResult<()> {
        let key = principal_key(principal);

        let write_txn = self.db.database().begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let existing = table
                .get(key.as_str())?
                .map(|v| serde_json::from_slice::<SessionRecord>(v.value()))
                .transpose()?;

            if let Some(mut record) = existing {
                record.active = false;
                let bytes = serde_json::to_vec(&record)?;
                table.insert(key.as_str(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        self.write_epoch.fetch_add(1, Ordering::AcqRel);

        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&key);
        }
        Ok(())
    }

    /// Insert a record read at `read_epoch` into the cache, unless a write
    /// committed since that read.
    fn cache_unless_superseded(&self, read_epoch: u64, key: String, record: SessionRecord) {
        if let Ok(mut cache) = self.cache.lock() {
            if self.write_epoch.load(Ordering::Acquire) == read_epoch {
                cache.put(key, record);
            }
        }
    }

    fn read_record(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        let read_txn = self.db.database().begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        table
            .get(key)?
            .map(|v| serde_json::from_slice(v.value()).map_err(Into::into))
            .transpose()
    }
}
