// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clock abstraction.
//!
//! Every component that reads time (lazy session expiry, permit deadlines,
//! activation timestamps) takes a `Clock` so tests can pin and advance time
//! around the expiry boundary.

use std::sync::Arc;

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall-clock implementation backed by chrono.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;
