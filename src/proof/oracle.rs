// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External proof-verification oracle.
//!
//! Production implementation calls the compliance verifier contract over
//! JSON-RPC as a view function. The call is deterministic for the same
//! inputs; a transport failure says nothing about proof validity and is
//! surfaced as a distinct, retryable error.

use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, ProviderBuilder, RootProvider,
    },
    sol,
};
use async_trait::async_trait;

use crate::config::ORACLE_TIMEOUT_SECS;

// Verifier interface fixed at deployment; input ordering and encoding are
// part of the contract, not negotiated at runtime.
sol! {
    #[sol(rpc)]
    interface IComplianceVerifier {
        function verifyProof(bytes proof, uint256[] publicInputs) external view returns (bool);
    }
}

/// Errors from the oracle boundary. All of these are infrastructure
/// failures; a clean `false` verdict is not an error.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Verifier call timed out after {0:?}")]
    Timeout(Duration),
}

/// HTTP provider type for the verifier endpoint (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Opaque accept/reject verdict source for proof submissions.
#[async_trait]
pub trait ProofOracle: Send + Sync {
    async fn verify(&self, proof: &[u8], public_inputs: &[U256]) -> Result<bool, OracleError>;
}

/// Oracle backed by the on-chain verifier contract.
#[derive(Debug)]
pub struct RpcOracle {
    provider: HttpProvider,
    verifier: Address,
    timeout: Duration,
}

impl RpcOracle {
    /// Create an oracle against the given RPC endpoint and verifier address.
    pub fn new(rpc_url: &str, verifier: Address) -> Result<Self, OracleError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| OracleError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            provider,
            verifier,
            timeout: Duration::from_secs(ORACLE_TIMEOUT_SECS),
        })
    }

    /// Override the call timeout (defaults to `ORACLE_TIMEOUT_SECS`).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ProofOracle for RpcOracle {
    async fn verify(&self, proof: &[u8], public_inputs: &[U256]) -> Result<bool, OracleError> {
        let contract = IComplianceVerifier::new(self.verifier, self.provider.clone());
        let call = contract.verifyProof(Bytes::copy_from_slice(proof), public_inputs.to_vec());

        match tokio::time::timeout(self.timeout, call.call()).await {
            Ok(Ok(accepted)) => Ok(accepted),
            Ok(Err(e)) => Err(OracleError::RpcError(e.to_string())),
            Err(_) => Err(OracleError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted oracle for tests: fixed verdict plus a call counter so the
    /// session-amortization property can be asserted.
    pub struct MockOracle {
        verdict: Result<bool, ()>,
        calls: AtomicUsize,
    }

    impl MockOracle {
        pub fn accepting() -> Self {
            Self {
                verdict: Ok(true),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn rejecting() -> Self {
            Self {
                verdict: Ok(false),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn unreachable_endpoint() -> Self {
            Self {
                verdict: Err(()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProofOracle for MockOracle {
        async fn verify(&self, _proof: &[u8], _inputs: &[U256]) -> Result<bool, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.verdict {
                Ok(v) => Ok(v),
                Err(()) => Err(OracleError::RpcError("connection refused".into())),
            }
        }
    }
}
