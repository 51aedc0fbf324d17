// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session admission, status, and administrative revoke.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};

use super::ApiFailure;
use crate::error::ApiError;
use crate::models::{
    parse_address, ActivateSessionRequest, ActivateSessionResponse, RevokeSessionResponse,
    SessionStatusResponse,
};
use crate::proof::ProofSubmission;
use crate::state::AppState;

/// Admission: verify a proof and activate (or refresh) the session.
///
/// Always re-runs proof verification, even when a session is still live;
/// a second activation is a refresh.
#[utoipa::path(
    post,
    path = "/v1/session/activate",
    tag = "Session",
    request_body = ActivateSessionRequest,
    responses(
        (status = 200, description = "Proof accepted, session active", body = ActivateSessionResponse),
        (status = 400, description = "Malformed submission"),
        (status = 422, description = "Proof rejected"),
        (status = 502, description = "Verifier oracle unavailable")
    )
)]
pub async fn activate_session(
    State(state): State<AppState>,
    Json(request): Json<ActivateSessionRequest>,
) -> Result<Json<ActivateSessionResponse>, ApiFailure> {
    let principal = parse_address(&request.principal, "principal")?;
    let submission = ProofSubmission::from_wire(principal, &request.proof, &request.public_inputs)?;

    let info = state.sessions.activate(&principal, &submission).await?;

    Ok(Json(ActivateSessionResponse {
        accepted: true,
        session_expiry: info.expires_at,
        remaining_seconds: info.remaining_seconds,
    }))
}

/// Session status for a principal, including the next permit nonce.
#[utoipa::path(
    get,
    path = "/v1/session/{principal}",
    tag = "Session",
    params(
        ("principal" = String, Path, description = "Principal address (hex)")
    ),
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
        (status = 400, description = "Invalid principal address")
    )
)]
pub async fn session_status(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiFailure> {
    let principal = parse_address(&principal, "principal")?;
    let next_nonce = state.nonces.current(&principal)?;

    let response = match state.sessions.ensure_active(&principal) {
        Ok(info) => SessionStatusResponse {
            active: true,
            remaining_seconds: info.remaining_seconds,
            expires_at: Some(info.expires_at),
            next_nonce,
        },
        Err(crate::auth::AuthError::NotActivated) => SessionStatusResponse {
            active: false,
            remaining_seconds: 0,
            expires_at: None,
            next_nonce,
        },
        Err(other) => return Err(other.into()),
    };
    Ok(Json(response))
}

/// Administrative takedown of a principal's session.
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>`. When no admin token is
/// configured the endpoint rejects every request.
#[utoipa::path(
    post,
    path = "/v1/session/{principal}/revoke",
    tag = "Session",
    params(
        ("principal" = String, Path, description = "Principal address (hex)")
    ),
    responses(
        (status = 200, description = "Session revoked", body = RevokeSessionResponse),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn revoke_session(
    State(state): State<AppState>,
    Path(principal): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RevokeSessionResponse>, ApiFailure> {
    check_admin_token(&state, &headers)?;

    let principal = parse_address(&principal, "principal")?;
    state.sessions.revoke(&principal)?;

    Ok(Json(RevokeSessionResponse { revoked: true }))
}

fn check_admin_token(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::unauthorized("administrative revoke is disabled"));
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::unauthorized("invalid admin token")),
    }
}
