// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-operation authorization gate.
//!
//! Order of checks, short-circuiting on the first failure:
//!
//! 1. deadline in the future, else `Expired`
//! 2. nonce equals the principal's current value, else `NonceMismatch`
//!    (cheap check before the cryptographic one)
//! 3. typed-data signature recovers to the principal, else `InvalidSignature`
//! 4. live compliance session, else `SessionInactive` — a valid signature
//!    proves intent, the session proves admission; both are required
//! 5. execute the operation
//! 6. advance the nonce, only on success — a failed operation must not burn
//!    the permit
//!
//! Steps 2-6 hold a per-principal lock, so two concurrent submissions of the
//! same nonce cannot both reach the executor: the loser re-reads the nonce
//! after the winner committed and observes the mismatch. Lock entries are
//! removed once no request holds or awaits them, so the registry stays
//! bounded by the number of in-flight requests, not by the set of principals
//! ever named.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::Eip712Domain;

use super::domain::OperationPermit;
use super::error::AuthError;
use super::nonce::NonceTracker;
use super::signature::verify_permit_signature;
use crate::clock::SharedClock;
use crate::session::SessionManager;

/// Ephemeral per-operation authorization, constructed by the client, verified
/// once, never persisted.
#[derive(Debug, Clone)]
pub struct Permit {
    pub principal: Address,
    /// Unix seconds; must be strictly in the future at verification time.
    pub deadline: i64,
    pub nonce: u64,
    /// 65-byte ECDSA signature over the EIP-712 permit struct.
    pub signature: Vec<u8>,
}

/// Outcome split for a guarded operation: authorization failures leave all
/// state untouched; a downstream failure happens after authorization but
/// still leaves the nonce unburned.
#[derive(Debug)]
pub enum GuardError<E> {
    Unauthorized(AuthError),
    OperationFailed(E),
}

impl<E> From<AuthError> for GuardError<E> {
    fn from(err: AuthError) -> Self {
        GuardError::Unauthorized(err)
    }
}

pub struct PermitGuard {
    domain: Eip712Domain,
    nonces: Arc<NonceTracker>,
    sessions: Arc<SessionManager>,
    clock: SharedClock,
    locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl PermitGuard {
    pub fn new(
        domain: Eip712Domain,
        nonces: Arc<NonceTracker>,
        sessions: Arc<SessionManager>,
        clock: SharedClock,
    ) -> Self {
        Self {
            domain,
            nonces,
            sessions,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Authorize and run one operation under a permit.
    ///
    /// `payload_hash` is the keccak-256 binding of the operation body; it
    /// must match what the client signed.
    pub async fn authorize<T, E, F, Fut>(
        &self,
        permit: &Permit,
        payload_hash: B256,
        op: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let lock = self.principal_lock(&permit.principal);
        let result = {
            let _serialized = lock.lock().await;
            self.authorize_serialized(permit, payload_hash, op).await
        };
        self.discard_idle_lock(&permit.principal, &lock);
        result
    }

    /// The check sequence proper; caller holds the principal's lock.
    async fn authorize_serialized<T, E, F, Fut>(
        &self,
        permit: &Permit,
        payload_hash: B256,
        op: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = self.clock.now_unix();
        if permit.deadline <= now {
            return Err(AuthError::Expired.into());
        }

        let current = self.nonces.current(&permit.principal)?;
        if current != permit.nonce {
            return Err(AuthError::NonceMismatch {
                expected: current,
                got: permit.nonce,
            }
            .into());
        }

        let message = OperationPermit {
            principal: permit.principal,
            nonce: U256::from(permit.nonce),
            deadline: U256::from(permit.deadline as u64),
            payloadHash: payload_hash,
        };
        if !verify_permit_signature(&self.domain, &message, permit.principal, &permit.signature) {
            tracing::warn!(
                principal = %permit.principal,
                nonce = permit.nonce,
                "permit signature verification failed"
            );
            return Err(AuthError::InvalidSignature.into());
        }

        self.sessions
            .ensure_active(&permit.principal)
            .map_err(|err| match err {
                AuthError::NotActivated => AuthError::SessionInactive,
                other => other,
            })?;

        let result = op().await.map_err(GuardError::OperationFailed)?;

        self.nonces.advance(&permit.principal, permit.nonce)?;
        tracing::debug!(
            principal = %permit.principal,
            nonce = permit.nonce,
            "operation authorized, nonce advanced"
        );

        Ok(result)
    }

    fn principal_lock(&self, principal: &Address) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(*principal).or_default().clone()
    }

    /// Drop the registry entry when no other request holds or awaits it.
    fn discard_idle_lock(&self, principal: &Address, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = locks.get(principal) {
            // Strong count 2 = the map's reference plus ours.
            if Arc::ptr_eq(entry, lock) && Arc::strong_count(entry) == 2 {
                locks.remove(principal);
            }
        }
    }
}
