// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types for the relay API.
//!
//! Addresses travel as hex strings, uint256 amounts as decimal strings,
//! proof bytes and signatures as hex. Parsing into protocol types happens
//! at the handler boundary; nothing downstream sees strings.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Permit;
use crate::error::ApiError;

/// Admission request: one proof submission for one principal.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ActivateSessionRequest {
    /// Principal address (hex).
    pub principal: String,
    /// Proof bytes (hex, 0x-prefixed or bare).
    pub proof: String,
    /// Ordered public inputs, decimal strings.
    pub public_inputs: Vec<String>,
}

/// Admission response on success.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivateSessionResponse {
    pub accepted: bool,
    /// Unix seconds at which the new session lapses.
    pub session_expiry: i64,
    pub remaining_seconds: i64,
}

/// Session status for a principal.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    pub active: bool,
    /// Seconds until expiry; 0 when inactive.
    pub remaining_seconds: i64,
    /// Unix seconds of expiry; absent when inactive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// The nonce the next permit must carry.
    pub next_nonce: u64,
}

/// Response to an administrative revoke.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeSessionResponse {
    pub revoked: bool,
}

/// Per-operation permit envelope, attached to every session-scoped action.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PermitEnvelope {
    /// Principal address (hex); must equal the signature's recovered signer.
    pub principal: String,
    /// Unix seconds deadline.
    pub deadline: i64,
    /// Must equal the principal's current nonce.
    pub nonce: u64,
    /// 65-byte ECDSA signature (hex) over the EIP-712 permit struct.
    pub signature: String,
}

impl PermitEnvelope {
    /// Parse into a protocol [`Permit`].
    pub fn parse(&self) -> Result<Permit, ApiError> {
        let principal = parse_address(&self.principal, "principal")?;
        let signature = alloy::hex::decode(self.signature.trim_start_matches("0x"))
            .map_err(|e| ApiError::bad_request(format!("invalid signature hex: {e}")))?;
        Ok(Permit {
            principal,
            deadline: self.deadline,
            nonce: self.nonce,
            signature,
        })
    }
}

/// Swap request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SwapRequest {
    pub permit: PermitEnvelope,
    pub token_in: String,
    pub token_out: String,
    /// Input amount, decimal string.
    pub amount_in: String,
    /// Slippage floor, decimal string.
    pub min_amount_out: String,
}

/// Add-liquidity request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddLiquidityRequest {
    pub permit: PermitEnvelope,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: String,
    pub amount_b: String,
}

/// Remove-liquidity request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RemoveLiquidityRequest {
    pub permit: PermitEnvelope,
    pub token_a: String,
    pub token_b: String,
    /// LP amount to withdraw, decimal string.
    pub liquidity: String,
}

/// Receipt returned for any executed operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct OperationResponse {
    /// Relay-assigned execution id.
    pub id: uuid::Uuid,
    /// Settlement-layer transaction hash.
    pub tx_hash: String,
    /// The nonce this operation consumed.
    pub nonce_used: u64,
}

/// Parse a hex address, naming the field in the error.
pub fn parse_address(value: &str, field: &str) -> Result<Address, ApiError> {
    Address::from_str(value)
        .map_err(|e| ApiError::bad_request(format!("invalid {field} address: {e}")))
}

/// Parse a decimal uint256, naming the field in the error.
pub fn parse_amount(value: &str, field: &str) -> Result<U256, ApiError> {
    U256::from_str(value).map_err(|e| ApiError::bad_request(format!("invalid {field}: {e}")))
}
