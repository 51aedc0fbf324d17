// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session activation and liveness.
//!
//! `ensure_active` is the amortized fast path: a store lookup, never a proof
//! verification. `activate` is the slow path: it always re-runs the proof
//! gate, even over a still-live session, and on success writes a fresh
//! record with `expires_at = now + SESSION_TTL_SECS`. On any failure nothing
//! is written, so a rejected proof can neither create nor extend a session.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;

use crate::auth::AuthError;
use crate::clock::SharedClock;
use crate::config::SESSION_TTL_SECS;
use crate::proof::{ProofGate, ProofSubmission};

use super::store::{SessionRecord, SessionStore};

/// Snapshot of a live session, as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub principal: Address,
    pub expires_at: i64,
    pub remaining_seconds: i64,
}

pub struct SessionManager {
    store: Arc<SessionStore>,
    gate: ProofGate,
    clock: SharedClock,
}

impl SessionManager {
    pub fn new(store: Arc<SessionStore>, gate: ProofGate, clock: SharedClock) -> Self {
        Self { store, gate, clock }
    }

    /// Return the live session for a principal, or `NotActivated`.
    ///
    /// Never consults the proof oracle.
    pub fn ensure_active(&self, principal: &Address) -> Result<SessionInfo, AuthError> {
        let now = self.clock.now_unix();
        match self.store.get(principal)? {
            Some(record) => Ok(SessionInfo {
                principal: *principal,
                expires_at: record.expires_at,
                remaining_seconds: record.expires_at - now,
            }),
            None => Err(AuthError::NotActivated),
        }
    }

    /// Run the proof gate and, on acceptance, create or refresh the session.
    ///
    /// Re-proves unconditionally; a second activation over a live session is
    /// a refresh (last-write-wins, expiry pushed forward). A rejection or
    /// oracle failure writes nothing.
    pub async fn activate(
        &self,
        principal: &Address,
        submission: &ProofSubmission,
    ) -> Result<SessionInfo, AuthError> {
        let accepted = self.gate.verify(submission).await?;
        if !accepted {
            tracing::info!(principal = %principal, "proof rejected by verifier");
            return Err(AuthError::ProofRejected);
        }

        let now = self.clock.now_unix();
        let record = SessionRecord {
            expires_at: now + SESSION_TTL_SECS,
            activated_at: now,
            active: true,
        };
        self.store.put(principal, record.clone())?;

        tracing::info!(
            principal = %principal,
            expires_at = record.expires_at,
            "compliance session activated"
        );

        Ok(SessionInfo {
            principal: *principal,
            expires_at: record.expires_at,
            remaining_seconds: SESSION_TTL_SECS,
        })
    }

    /// Administrative takedown of a principal's session.
    pub fn revoke(&self, principal: &Address) -> Result<(), AuthError> {
        self.store.revoke(principal)?;
        tracing::warn!(principal = %principal, "compliance session revoked");
        Ok(())
    }

    /// Direct store access for status queries.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
