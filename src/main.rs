// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Composition root: construct every collaborator explicitly and serve.

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};

use alloy::primitives::Address;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use compliance_relay_server::{
    api::router,
    auth::{domain::permit_domain, domain::DomainParams, NonceTracker, PermitGuard},
    clock::SystemClock,
    config::{
        ADMIN_TOKEN_ENV, CHAIN_ID_ENV, DATA_DIR_ENV, DEFAULT_DATA_DIR, POOL_ADDRESS_ENV,
        RELAY_DB_FILE, RELAY_PRIVATE_KEY_ENV, RPC_URL_ENV, VERIFIER_ADDRESS_ENV,
    },
    exec::RpcExecutor,
    proof::{ProofGate, RpcOracle},
    session::{SessionManager, SessionStore},
    state::AppState,
    storage::AuthDb,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn required_env(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

fn required_address(name: &str) -> Address {
    let raw = required_env(name);
    Address::from_str(&raw).unwrap_or_else(|e| panic!("{name} is not a valid address: {e}"))
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Persistence
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let db_path = PathBuf::from(&data_dir).join(RELAY_DB_FILE);
    let db = Arc::new(AuthDb::open(&db_path).expect("Failed to open relay database"));

    // Collaborators
    let clock = Arc::new(SystemClock);
    let rpc_url = required_env(RPC_URL_ENV);
    let chain_id: u64 = required_env(CHAIN_ID_ENV)
        .parse()
        .expect("CHAIN_ID must be a number");
    let verifier = required_address(VERIFIER_ADDRESS_ENV);
    let pool = required_address(POOL_ADDRESS_ENV);
    let relay_key = required_env(RELAY_PRIVATE_KEY_ENV);

    let oracle = Arc::new(RpcOracle::new(&rpc_url, verifier).expect("Failed to build oracle"));
    let store = Arc::new(SessionStore::new(db.clone(), clock.clone()));
    let sessions = Arc::new(SessionManager::new(
        store,
        ProofGate::new(oracle),
        clock.clone(),
    ));
    let nonces = Arc::new(NonceTracker::new(db));
    let domain = permit_domain(&DomainParams {
        chain_id,
        verifying_contract: pool,
    });
    let guard = Arc::new(PermitGuard::new(
        domain,
        nonces.clone(),
        sessions.clone(),
        clock,
    ));
    let executor =
        Arc::new(RpcExecutor::new(&rpc_url, pool, &relay_key).expect("Failed to build executor"));

    let state = AppState::new(
        sessions,
        guard,
        nonces,
        executor,
        env::var(ADMIN_TOKEN_ENV).ok(),
    );
    let app = router(state);

    // Parse bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Compliance relay listening on http://{addr} (docs at /docs)");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .expect("HTTP server failed");
}
