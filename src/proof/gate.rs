// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-shot admission check in front of the verifier oracle.
//!
//! Validates submission shape (hex proof bytes, exact public-input arity)
//! before the network call, so a malformed submission never reaches the
//! oracle. Stateless: nothing from a submission survives the call.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use super::oracle::{OracleError, ProofOracle};
use crate::auth::AuthError;
use crate::config::PUBLIC_INPUT_COUNT;

/// Ephemeral proof submission, consumed exactly once.
#[derive(Debug, Clone)]
pub struct ProofSubmission {
    pub principal: Address,
    pub proof: Vec<u8>,
    pub public_inputs: Vec<U256>,
}

impl ProofSubmission {
    /// Parse a submission from wire form: hex proof bytes and decimal-string
    /// public inputs.
    pub fn from_wire(
        principal: Address,
        proof_hex: &str,
        public_inputs: &[String],
    ) -> Result<Self, AuthError> {
        let proof = alloy::hex::decode(proof_hex.trim_start_matches("0x"))
            .map_err(|e| AuthError::MalformedSubmission(format!("invalid proof hex: {e}")))?;

        let public_inputs = public_inputs
            .iter()
            .map(|s| {
                s.parse::<U256>().map_err(|e| {
                    AuthError::MalformedSubmission(format!("invalid public input {s:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            principal,
            proof,
            public_inputs,
        })
    }
}

/// Stateless admission gate wrapping the external oracle.
pub struct ProofGate {
    oracle: Arc<dyn ProofOracle>,
}

impl ProofGate {
    pub fn new(oracle: Arc<dyn ProofOracle>) -> Self {
        Self { oracle }
    }

    /// Verify a submission.
    ///
    /// `Ok(true)` - proof accepted. `Ok(false)` - proof cleanly rejected
    /// (not retryable). `Err(Verification)` - oracle unreachable (retryable,
    /// says nothing about validity).
    pub async fn verify(&self, submission: &ProofSubmission) -> Result<bool, AuthError> {
        if submission.proof.is_empty() {
            return Err(AuthError::MalformedSubmission("empty proof".into()));
        }
        if submission.public_inputs.len() != PUBLIC_INPUT_COUNT {
            return Err(AuthError::MalformedSubmission(format!(
                "expected {} public inputs, got {}",
                PUBLIC_INPUT_COUNT,
                submission.public_inputs.len()
            )));
        }

        self.oracle
            .verify(&submission.proof, &submission.public_inputs)
            .await
            .map_err(|e: OracleError| AuthError::Verification(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::oracle::test_support::MockOracle;

    fn submission(inputs: usize) -> ProofSubmission {
        ProofSubmission {
            principal: Address::ZERO,
            proof: vec![1, 2, 3],
            public_inputs: (0..inputs as u64).map(U256::from).collect(),
        }
    }

    #[test]
    fn from_wire_parses_hex_and_decimal_inputs() {
        let sub = ProofSubmission::from_wire(
            Address::ZERO,
            "0xdeadbeef",
            &["1".to_string(), "340282366920938463463374607431768211456".to_string()],
        )
        .unwrap();
        assert_eq!(sub.proof, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(sub.public_inputs[0], U256::from(1u64));
        // 2^128 round-trips through the decimal-string encoding.
        assert_eq!(sub.public_inputs[1], U256::from(1u8) << 128);
    }

    #[test]
    fn from_wire_rejects_bad_hex_and_bad_integers() {
        let err =
            ProofSubmission::from_wire(Address::ZERO, "0xzz", &[]).unwrap_err();
        assert!(matches!(err, AuthError::MalformedSubmission(_)));

        let err = ProofSubmission::from_wire(Address::ZERO, "0xab", &["ten".to_string()])
            .unwrap_err();
        assert!(matches!(err, AuthError::MalformedSubmission(_)));
    }

    #[tokio::test]
    async fn wrong_arity_never_reaches_the_oracle() {
        let oracle = Arc::new(MockOracle::accepting());
        let gate = ProofGate::new(oracle.clone());

        let err = gate.verify(&submission(2)).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedSubmission(_)));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_proof_never_reaches_the_oracle() {
        let oracle = Arc::new(MockOracle::accepting());
        let gate = ProofGate::new(oracle.clone());

        let mut sub = submission(crate::config::PUBLIC_INPUT_COUNT);
        sub.proof.clear();
        let err = gate.verify(&sub).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedSubmission(_)));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn rejection_and_infra_failure_are_distinct() {
        let rejecting = ProofGate::new(Arc::new(MockOracle::rejecting()));
        let verdict = rejecting
            .verify(&submission(crate::config::PUBLIC_INPUT_COUNT))
            .await
            .unwrap();
        assert!(!verdict);

        let unreachable = ProofGate::new(Arc::new(MockOracle::unreachable_endpoint()));
        let err = unreachable
            .verify(&submission(crate::config::PUBLIC_INPUT_COUNT))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
        assert!(err.is_retryable());
    }
}
