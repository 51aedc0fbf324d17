// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proof-gated admission.
//!
//! The ZK circuit is an opaque collaborator: the relay hands
//! `(proof bytes, public inputs)` to an external verifier contract and gets
//! back accept/reject. Nothing from a submission is persisted.
//!
//! ## Modules
//!
//! - `oracle` - The external verifier call (trait + RPC implementation)
//! - `gate` - Shape validation in front of the oracle

pub mod gate;
pub mod oracle;

pub use gate::{ProofGate, ProofSubmission};
pub use oracle::{OracleError, ProofOracle, RpcOracle};
