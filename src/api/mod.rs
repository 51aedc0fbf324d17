// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthError,
    error::ApiError,
    models::{
        ActivateSessionRequest, ActivateSessionResponse, AddLiquidityRequest, OperationResponse,
        PermitEnvelope, RemoveLiquidityRequest, RevokeSessionResponse, SessionStatusResponse,
        SwapRequest,
    },
    state::AppState,
};

pub mod health;
pub mod ops;
pub mod session;

/// Handler-level failure: either a protocol authorization error or a
/// transport/infrastructure error. Both already know their HTTP shape.
#[derive(Debug)]
pub enum ApiFailure {
    Auth(AuthError),
    Api(ApiError),
}

impl From<AuthError> for ApiFailure {
    fn from(err: AuthError) -> Self {
        ApiFailure::Auth(err)
    }
}

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        ApiFailure::Api(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::Auth(err) => err.into_response(),
            ApiFailure::Api(err) => err.into_response(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session/activate", post(session::activate_session))
        .route("/session/{principal}", get(session::session_status))
        .route("/session/{principal}/revoke", post(session::revoke_session))
        .route("/ops/swap", post(ops::swap))
        .route("/ops/liquidity/add", post(ops::add_liquidity))
        .route("/ops/liquidity/remove", post(ops::remove_liquidity))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::ready,
        session::activate_session,
        session::session_status,
        session::revoke_session,
        ops::swap,
        ops::add_liquidity,
        ops::remove_liquidity
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            health::ReadyChecks,
            ActivateSessionRequest,
            ActivateSessionResponse,
            SessionStatusResponse,
            RevokeSessionResponse,
            PermitEnvelope,
            SwapRequest,
            AddLiquidityRequest,
            RemoveLiquidityRequest,
            OperationResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Session", description = "Proof-gated session admission and status"),
        (name = "Operations", description = "Permit-gated pool operations")
    )
)]
struct ApiDoc;
