// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! All collaborators are constructed once in the composition root
//! (`main.rs`) and injected here; no module-level singletons.

use std::sync::Arc;

use crate::auth::{NonceTracker, PermitGuard};
use crate::exec::OperationExecutor;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub guard: Arc<PermitGuard>,
    pub nonces: Arc<NonceTracker>,
    pub executor: Arc<dyn OperationExecutor>,
    /// Bearer token for administrative revoke; `None` disables the endpoint.
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager>,
        guard: Arc<PermitGuard>,
        nonces: Arc<NonceTracker>,
        executor: Arc<dyn OperationExecutor>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            sessions,
            guard,
            nonces,
            executor,
            admin_token,
        }
    }
}
