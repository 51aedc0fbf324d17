// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compliance session lifecycle.
//!
//! A session is the durable result of one successful proof verification:
//! `{expires_at, activated_at, active}` keyed by principal. It amortizes the
//! proof cost across every operation the principal performs inside the TTL
//! window. Per principal the lifecycle is
//! NoSession → Active(until expires_at) → Expired, where expiry is lazy: a
//! read past `expires_at` reports absent without a cleanup pass.
//!
//! ## Modules
//!
//! - `store` - Durable principal → session record mapping (redb + LRU)
//! - `manager` - Activation (proof-gated) and liveness checks

pub mod manager;
pub mod store;

pub use manager::{SessionInfo, SessionManager};
pub use store::{SessionRecord, SessionStore};
