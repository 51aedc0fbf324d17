// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded authorization database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `sessions`: principal → serialized SessionRecord (JSON bytes)
//! - `nonces`: principal → current nonce (u64)
//!
//! Principals are stored as lowercase hex addresses so lookups are
//! case-insensitive. Writers go through redb write transactions, which are
//! serialized by the database; the nonce compare-and-swap in
//! [`crate::auth::NonceTracker`] relies on that.

use std::path::Path;

use redb::{Database, TableDefinition};

/// Sessions table: lowercase principal → serialized SessionRecord.
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Nonces table: lowercase principal → current nonce value.
pub const NONCES: TableDefinition<&str, u64> = TableDefinition::new("nonces");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Embedded ACID database holding session and nonce state.
#[derive(Debug)]
pub struct AuthDb {
    db: Database,
}

impl AuthDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(NONCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Access the underlying redb database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Canonical storage key for a principal (lowercase hex with 0x prefix).
pub fn principal_key(principal: &alloy::primitives::Address) -> String {
    format!("{principal:?}").to_lowercase()
}
