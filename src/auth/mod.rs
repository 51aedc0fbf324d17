// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permit verification and authorization.
//!
//! A permit is an ephemeral, client-signed authorization for a single
//! operation: `{principal, nonce, deadline, signature}` bound via EIP-712
//! typed data to a fixed domain and to the operation payload. The permit
//! proves intent/identity; a live compliance session proves admission. Both
//! are required before an operation executes.
//!
//! ## Modules
//!
//! - `domain` - EIP-712 domain parameters and the typed permit struct
//! - `signature` - Stateless typed-data signature verification
//! - `nonce` - Per-principal replay-protection counter
//! - `guard` - The per-operation authorization gate
//! - `error` - Closed authorization error taxonomy

pub mod domain;
pub mod error;
pub mod guard;
pub mod nonce;
pub mod signature;

pub use domain::{permit_domain, DomainParams, OperationPermit};
pub use error::AuthError;
pub use guard::{Permit, PermitGuard};
pub use nonce::NonceTracker;
pub use signature::verify_permit_signature;
