// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-principal replay-protection counter.
//!
//! Nonces start at 0 and advance by exactly +1 per successfully authorized
//! operation. `advance` is the only mutator and runs inside a single redb
//! write transaction: read, compare against the caller's expected value,
//! insert. redb serializes write transactions, so two concurrent advances
//! from the same prior value cannot both commit; the loser observes a
//! mismatch.

use std::sync::Arc;

use redb::{ReadableDatabase, ReadableTable};

use super::error::AuthError;
use crate::storage::{principal_key, AuthDb, NONCES};
use alloy::primitives::Address;

pub struct NonceTracker {
    db: Arc<AuthDb>,
}

impl NonceTracker {
    pub fn new(db: Arc<AuthDb>) -> Self {
        Self { db }
    }

    /// Current nonce for a principal. Implicitly 0 before first use.
    pub fn current(&self, principal: &Address) -> Result<u64, AuthError> {
        let key = principal_key(principal);
        let read_txn = self
            .db
            .database()
            .begin_read()
            .map_err(crate::storage::StoreError::from)?;
        let table = read_txn
            .open_table(NONCES)
            .map_err(crate::storage::StoreError::from)?;
        let value = table
            .get(key.as_str())
            .map_err(crate::storage::StoreError::from)?
            .map(|v| v.value())
            .unwrap_or(0);
        Ok(value)
    }

    /// Advance the nonce from `expected` to `expected + 1`.
    ///
    /// Fails with `NonceMismatch` when `expected` is stale. Compare and
    /// insert happen in one write transaction.
    pub fn advance(&self, principal: &Address, expected: u64) -> Result<(), AuthError> {
        let key = principal_key(principal);
        let write_txn = self
            .db
            .database()
            .begin_write()
            .map_err(crate::storage::StoreError::from)?;
        {
            let mut table = write_txn
                .open_table(NONCES)
                .map_err(crate::storage::StoreError::from)?;
            let current = table
                .get(key.as_str())
                .map_err(crate::storage::StoreError::from)?
                .map(|v| v.value())
                .unwrap_or(0);

            if current != expected {
                return Err(AuthError::NonceMismatch {
                    expected: current,
                    got: expected,
                });
            }

            table
                .insert(key.as_str(), expected + 1)
                .map_err(crate::storage::StoreError::from)?;
        }
        write_txn
            .commit()
            .map_err(crate::storage::StoreError::from)?;
        Ok(())
    }
}
