// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compliance Relay - Permit-Gated Session Authorization Service
//!
//! This crate gates pool operations (swap, add/remove liquidity) behind a
//! one-time proof-gated admission check and a short-lived, replay-protected
//! compliance session. Each session-scoped operation is additionally
//! authorized per-call by an EIP-712 typed-data permit carrying a strictly
//! incrementing nonce and a deadline.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Permit verification: signatures, nonces, the operation guard
//! - `session` - Compliance session store and lifecycle
//! - `proof` - Proof gate and the external verifier oracle
//! - `exec` - Operation executor (gated pool contract)
//! - `storage` - Embedded redb database

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod exec;
pub mod models;
pub mod proof;
pub mod session;
pub mod state;
pub mod storage;
