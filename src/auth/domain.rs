// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-712 domain and the typed permit struct.
//!
//! The signing domain must be byte-identical between client and relay: any
//! mismatch (name, version, chain id, verifying contract) produces a
//! signature mismatch on verification, never an error. That is the
//! cross-protocol replay defense.

use alloy::{
    primitives::{keccak256, Address, B256, U256},
    sol,
    sol_types::Eip712Domain,
};
use serde::Serialize;

use crate::config::{PERMIT_DOMAIN_NAME, PERMIT_DOMAIN_VERSION};

sol! {
    /// Typed data signed by the principal for each session-scoped operation.
    ///
    /// `payloadHash` binds the permit to one concrete operation body, so a
    /// permit cannot be replayed against a different operation that happens
    /// to carry the same nonce.
    struct OperationPermit {
        address principal;
        uint256 nonce;
        uint256 deadline;
        bytes32 payloadHash;
    }
}

/// Runtime domain parameters (chain id and verifying contract come from the
/// environment; name and version are protocol constants).
#[derive(Debug, Clone, Copy)]
pub struct DomainParams {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

/// Build the EIP-712 domain for operation permits.
pub fn permit_domain(params: &DomainParams) -> Eip712Domain {
    Eip712Domain::new(
        Some(PERMIT_DOMAIN_NAME.into()),
        Some(PERMIT_DOMAIN_VERSION.into()),
        Some(U256::from(params.chain_id)),
        Some(params.verifying_contract),
        None,
    )
}

/// Keccak-256 of the canonical JSON serialization of an operation body.
///
/// Canonical means: the serde field order of the request struct. Client and
/// relay must serialize the same struct shape.
pub fn payload_hash<T: Serialize>(payload: &T) -> Result<B256, serde_json::Error> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(keccak256(&bytes))
}
