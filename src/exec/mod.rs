// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operation execution against the gated pool.
//!
//! The executor is a collaborator behind the permit guard: by the time an
//! operation reaches it, deadline, nonce, signature, and session have all
//! been checked. The production implementation submits the call to the pool
//! contract from the relay operator's account.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

sol! {
    #[sol(rpc)]
    interface IGatedPool {
        function swap(address user, address tokenIn, address tokenOut, uint256 amountIn, uint256 minAmountOut) external returns (uint256);
        function addLiquidity(address user, address tokenA, address tokenB, uint256 amountA, uint256 amountB) external returns (uint256);
        function removeLiquidity(address user, address tokenA, address tokenB, uint256 liquidity) external returns (uint256, uint256);
    }
}

/// A session-scoped pool operation, fully specified.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub principal: Address,
    pub kind: OperationKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    Swap {
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    },
    AddLiquidity {
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    },
    RemoveLiquidity {
        token_a: Address,
        token_b: Address,
        liquidity: U256,
    },
}

impl OperationKind {
    /// Stable label for logs and receipts.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Swap { .. } => "swap",
            OperationKind::AddLiquidity { .. } => "add_liquidity",
            OperationKind::RemoveLiquidity { .. } => "remove_liquidity",
        }
    }
}

/// Receipt for an executed operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationReceipt {
    /// Relay-assigned id for this execution.
    pub id: uuid::Uuid,
    /// Transaction hash on the settlement layer.
    pub tx_hash: String,
}

/// Errors from the execution boundary.
///
/// An executor failure after authorization does not burn the permit; the
/// guard only advances the nonce on success.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid relay key: {0}")]
    InvalidRelayKey(String),

    #[error("Pool call reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Downstream executor for authorized operations.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, op: &Operation) -> Result<OperationReceipt, ExecutorError>;
}

/// Executor submitting pool calls from the relay operator's account.
#[derive(Debug)]
pub struct RpcExecutor {
    provider: DynProvider,
    pool: Address,
}

impl RpcExecutor {
    /// Create an executor for the given RPC endpoint, pool contract, and
    /// relay operator key (hex, no 0x prefix).
    pub fn new(rpc_url: &str, pool: Address, relay_key_hex: &str) -> Result<Self, ExecutorError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ExecutorError::InvalidRpcUrl(e.to_string()))?;

        let key_bytes = alloy::hex::decode(relay_key_hex)
            .map_err(|e| ExecutorError::InvalidRelayKey(e.to_string()))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ExecutorError::InvalidRelayKey(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self { provider, pool })
    }
}

#[async_trait]
impl OperationExecutor for RpcExecutor {
    async fn execute(&self, op: &Operation) -> Result<OperationReceipt, ExecutorError> {
        let contract = IGatedPool::new(self.pool, self.provider.clone());

        let pending = match &op.kind {
            OperationKind::Swap {
                token_in,
                token_out,
                amount_in,
                min_amount_out,
            } => {
                contract
                    .swap(op.principal, *token_in, *token_out, *amount_in, *min_amount_out)
                    .send()
                    .await
            }
            OperationKind::AddLiquidity {
                token_a,
                token_b,
                amount_a,
                amount_b,
            } => {
                contract
                    .addLiquidity(op.principal, *token_a, *token_b, *amount_a, *amount_b)
                    .send()
                    .await
            }
            OperationKind::RemoveLiquidity {
                token_a,
                token_b,
                liquidity,
            } => {
                contract
                    .removeLiquidity(op.principal, *token_a, *token_b, *liquidity)
                    .send()
                    .await
            }
        }
        .map_err(|e| ExecutorError::Reverted(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ExecutorError::RpcError(e.to_string()))?;

        if !receipt.status() {
            return Err(ExecutorError::Reverted(format!(
                "{} transaction {} reverted",
                op.kind.label(),
                receipt.transaction_hash
            )));
        }

        Ok(OperationReceipt {
            id: uuid::Uuid::new_v4(),
            tx_hash: format!("{:?}", receipt.transaction_hash),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_labels_are_stable() {
        let swap = OperationKind::Swap {
            token_in: Address::ZERO,
            token_out: Address::ZERO,
            amount_in: U256::from(1u64),
            min_amount_out: U256::ZERO,
        };
        assert_eq!(swap.label(), "swap");

        let add = OperationKind::AddLiquidity {
            token_a: Address::ZERO,
            token_b: Address::ZERO,
            amount_a: U256::ZERO,
            amount_b: U256::ZERO,
        };
        assert_eq!(add.label(), "add_liquidity");

        let remove = OperationKind::RemoveLiquidity {
            token_a: Address::ZERO,
            token_b: Address::ZERO,
            liquidity: U256::ZERO,
        };
        assert_eq!(remove.label(), "remove_liquidity");
    }

    #[test]
    fn executor_rejects_malformed_relay_key() {
        let err = RpcExecutor::new("http://localhost:8545", Address::ZERO, "nothex").unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidRelayKey(_)));
    }

    #[test]
    fn executor_rejects_bad_rpc_url() {
        let err = RpcExecutor::new("not a url", Address::ZERO, "00".repeat(32).as_str())
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidRpcUrl(_)));
    }
}
