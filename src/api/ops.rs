// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permit-gated pool operations.
//!
//! Each handler parses the wire body into a typed [`Operation`], binds the
//! permit to it via the payload hash, and hands both to the guard. The
//! executor only runs after every authorization step has passed.

use axum::{extract::State, http::StatusCode, Json};

use super::ApiFailure;
use crate::auth::domain::payload_hash;
use crate::auth::guard::GuardError;
use crate::auth::Permit;
use crate::error::ApiError;
use crate::exec::{ExecutorError, Operation, OperationKind};
use crate::models::{
    parse_address, parse_amount, AddLiquidityRequest, OperationResponse, RemoveLiquidityRequest,
    SwapRequest,
};
use crate::state::AppState;

/// Swap through the gated pool.
#[utoipa::path(
    post,
    path = "/v1/ops/swap",
    tag = "Operations",
    request_body = SwapRequest,
    responses(
        (status = 200, description = "Swap executed", body = OperationResponse),
        (status = 401, description = "Permit expired, stale nonce, or bad signature"),
        (status = 403, description = "No active compliance session"),
        (status = 502, description = "Pool execution failed")
    )
)]
pub async fn swap(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<OperationResponse>, ApiFailure> {
    let permit = request.permit.parse()?;
    let operation = Operation {
        principal: permit.principal,
        kind: OperationKind::Swap {
            token_in: parse_address(&request.token_in, "token_in")?,
            token_out: parse_address(&request.token_out, "token_out")?,
            amount_in: parse_amount(&request.amount_in, "amount_in")?,
            min_amount_out: parse_amount(&request.min_amount_out, "min_amount_out")?,
        },
    };
    execute_guarded(&state, &permit, operation).await
}

/// Add liquidity to the gated pool.
#[utoipa::path(
    post,
    path = "/v1/ops/liquidity/add",
    tag = "Operations",
    request_body = AddLiquidityRequest,
    responses(
        (status = 200, description = "Liquidity added", body = OperationResponse),
        (status = 401, description = "Permit expired, stale nonce, or bad signature"),
        (status = 403, description = "No active compliance session"),
        (status = 502, description = "Pool execution failed")
    )
)]
pub async fn add_liquidity(
    State(state): State<AppState>,
    Json(request): Json<AddLiquidityRequest>,
) -> Result<Json<OperationResponse>, ApiFailure> {
    let permit = request.permit.parse()?;
    let operation = Operation {
        principal: permit.principal,
        kind: OperationKind::AddLiquidity {
            token_a: parse_address(&request.token_a, "token_a")?,
            token_b: parse_address(&request.token_b, "token_b")?,
            amount_a: parse_amount(&request.amount_a, "amount_a")?,
            amount_b: parse_amount(&request.amount_b, "amount_b")?,
        },
    };
    execute_guarded(&state, &permit, operation).await
}

/// Remove liquidity from the gated pool.
#[utoipa::path(
    post,
    path = "/v1/ops/liquidity/remove",
    tag = "Operations",
    request_body = RemoveLiquidityRequest,
    responses(
        (status = 200, description = "Liquidity removed", body = OperationResponse),
        (status = 401, description = "Permit expired, stale nonce, or bad signature"),
        (status = 403, description = "No active compliance session"),
        (status = 502, description = "Pool execution failed")
    )
)]
pub async fn remove_liquidity(
    State(state): State<AppState>,
    Json(request): Json<RemoveLiquidityRequest>,
) -> Result<Json<OperationResponse>, ApiFailure> {
    let permit = request.permit.parse()?;
    let operation = Operation {
        principal: permit.principal,
        kind: OperationKind::RemoveLiquidity {
            token_a: parse_address(&request.token_a, "token_a")?,
            token_b: parse_address(&request.token_b, "token_b")?,
            liquidity: parse_amount(&request.liquidity, "liquidity")?,
        },
    };
    execute_guarded(&state, &permit, operation).await
}

/// Run one operation through the permit guard.
async fn execute_guarded(
    state: &AppState,
    permit: &Permit,
    operation: Operation,
) -> Result<Json<OperationResponse>, ApiFailure> {
    let hash = payload_hash(&operation)
        .map_err(|e| ApiError::internal(format!("payload serialization failed: {e}")))?;

    let receipt = state
        .guard
        .authorize(permit, hash, || state.executor.execute(&operation))
        .await
        .map_err(|err| match err {
            GuardError::Unauthorized(auth) => ApiFailure::Auth(auth),
            GuardError::OperationFailed(exec) => ApiFailure::Api(executor_failure(exec)),
        })?;

    tracing::info!(
        principal = %permit.principal,
        op = operation.kind.label(),
        tx_hash = %receipt.tx_hash,
        "operation executed"
    );

    Ok(Json(OperationResponse {
        id: receipt.id,
        tx_hash: receipt.tx_hash,
        nonce_used: permit.nonce,
    }))
}

fn executor_failure(err: ExecutorError) -> ApiError {
    match err {
        ExecutorError::Reverted(msg) => {
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, format!("execution reverted: {msg}"))
        }
        other => ApiError::new(StatusCode::BAD_GATEWAY, other.to_string()),
    }
}
