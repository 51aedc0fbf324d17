// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Closed taxonomy for every way a permit-gated request can fail. All of
//! these are terminal for the request that raised them and leave nonce and
//! session state untouched. Only `Verification` (oracle infrastructure) is
//! safe to retry without new client input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization error type.
#[derive(Debug)]
pub enum AuthError {
    /// Permit deadline has passed
    Expired,
    /// Permit nonce does not match the principal's current nonce
    NonceMismatch { expected: u64, got: u64 },
    /// Typed-data signature does not recover to the claimed principal
    InvalidSignature,
    /// The proof did not verify; no session was created or extended
    ProofRejected,
    /// No active compliance session for the principal
    SessionInactive,
    /// No session exists; admission must run first
    NotActivated,
    /// Submission malformed (bad hex, wrong public-input arity)
    MalformedSubmission(String),
    /// Verifier oracle unreachable or timed out (retryable)
    Verification(String),
    /// Internal storage fault
    Storage(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Expired => "permit_expired",
            AuthError::NonceMismatch { .. } => "nonce_mismatch",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::ProofRejected => "proof_rejected",
            AuthError::SessionInactive => "session_inactive",
            AuthError::NotActivated => "not_activated",
            AuthError::MalformedSubmission(_) => "malformed_submission",
            AuthError::Verification(_) => "verification_unavailable",
            AuthError::Storage(_) => "storage_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Expired | AuthError::NonceMismatch { .. } | AuthError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::SessionInactive | AuthError::NotActivated => StatusCode::FORBIDDEN,
            AuthError::ProofRejected => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::MalformedSubmission(_) => StatusCode::BAD_REQUEST,
            AuthError::Verification(_) => StatusCode::BAD_GATEWAY,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a client may retry the same request unchanged.
    ///
    /// Logic failures require a fresh permit or proof; only oracle
    /// infrastructure failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Verification(_) | AuthError::Storage(_))
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Expired => write!(f, "Permit deadline has passed"),
            AuthError::NonceMismatch { expected, got } => {
                write!(f, "Nonce mismatch: expected {expected}, got {got}")
            }
            AuthError::InvalidSignature => write!(f, "Permit signature is invalid"),
            AuthError::ProofRejected => write!(f, "Compliance proof did not verify"),
            AuthError::SessionInactive => {
                write!(f, "No active compliance session for this principal")
            }
            AuthError::NotActivated => {
                write!(f, "Principal has no session; run admission first")
            }
            AuthError::MalformedSubmission(msg) => write!(f, "Malformed submission: {msg}"),
            AuthError::Verification(msg) => write!(f, "Verifier oracle unavailable: {msg}"),
            AuthError::Storage(msg) => write!(f, "Internal storage error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<crate::storage::StoreError> for AuthError {
    fn from(err: crate::storage::StoreError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
