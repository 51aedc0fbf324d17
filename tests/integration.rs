// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end router tests: admission, status, permit-gated operations,
//! replay rejection, and administrative revoke.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    signers::{local::PrivateKeySigner, SignerSync},
    sol_types::SolStruct,
};
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use compliance_relay_server::{
    api::router,
    auth::{
        domain::{payload_hash, permit_domain, DomainParams, OperationPermit},
        NonceTracker, PermitGuard,
    },
    clock::SystemClock,
    config::{PUBLIC_INPUT_COUNT, SESSION_TTL_SECS},
    exec::{Operation, OperationExecutor, OperationKind, OperationReceipt},
    proof::{OracleError, ProofGate, ProofOracle},
    session::{SessionManager, SessionStore},
    state::AppState,
    storage::AuthDb,
};

const BODY_LIMIT: usize = usize::MAX;

const CHAIN_ID: u64 = 43_113;
const POOL: &str = "0x9999999999999999999999999999999999999999";
const TOKEN_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const TOKEN_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

struct ScriptedOracle {
    accept: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl ProofOracle for ScriptedOracle {
    async fn verify(&self, _proof: &[u8], _inputs: &[U256]) -> Result<bool, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accept)
    }
}

struct RecordingExecutor {
    calls: AtomicUsize,
}

#[async_trait]
impl OperationExecutor for RecordingExecutor {
    async fn execute(
        &self,
        _op: &Operation,
    ) -> Result<OperationReceipt, compliance_relay_server::exec::ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OperationReceipt {
            id: uuid::Uuid::new_v4(),
            tx_hash: "0x00ff".to_string(),
        })
    }
}

struct TestApp {
    _dir: tempfile::TempDir,
    app: Router,
    oracle: Arc<ScriptedOracle>,
    executor: Arc<RecordingExecutor>,
}

fn test_app(accept_proofs: bool, admin_token: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(AuthDb::open(&dir.path().join("relay.redb")).unwrap());
    let clock = Arc::new(SystemClock);
    let oracle = Arc::new(ScriptedOracle {
        accept: accept_proofs,
        calls: AtomicUsize::new(0),
    });
    let executor = Arc::new(RecordingExecutor {
        calls: AtomicUsize::new(0),
    });

    let store = Arc::new(SessionStore::new(db.clone(), clock.clone()));
    let sessions = Arc::new(SessionManager::new(
        store,
        ProofGate::new(oracle.clone()),
        clock.clone(),
    ));
    let nonces = Arc::new(NonceTracker::new(db));
    let guard = Arc::new(PermitGuard::new(
        permit_domain(&domain_params()),
        nonces.clone(),
        sessions.clone(),
        clock,
    ));

    let state = AppState::new(
        sessions,
        guard,
        nonces,
        executor.clone(),
        admin_token.map(str::to_string),
    );

    TestApp {
        _dir: dir,
        app: router(state),
        oracle,
        executor,
    }
}

fn domain_params() -> DomainParams {
    DomainParams {
        chain_id: CHAIN_ID,
        verifying_contract: Address::from_str(POOL).unwrap(),
    }
}

fn activation_body(principal: Address) -> Value {
    json!({
        "principal": format!("{principal:?}"),
        "proof": format!("0x{}", "ab".repeat(192)),
        "public_inputs": (0..PUBLIC_INPUT_COUNT).map(|i| i.to_string()).collect::<Vec<_>>(),
    })
}

/// Sign a swap permit the way a client would: hash the normalized operation,
/// then sign the EIP-712 permit struct over it.
fn signed_swap_body(signer: &PrivateKeySigner, nonce: u64, deadline: i64) -> Value {
    let principal = signer.address();
    let operation = Operation {
        principal,
        kind: OperationKind::Swap {
            token_in: Address::from_str(TOKEN_A).unwrap(),
            token_out: Address::from_str(TOKEN_B).unwrap(),
            amount_in: U256::from(1_000u64),
            min_amount_out: U256::from(990u64),
        },
    };
    let hash = payload_hash(&operation).unwrap();

    let message = OperationPermit {
        principal,
        nonce: U256::from(nonce),
        deadline: U256::from(deadline as u64),
        payloadHash: hash,
    };
    let digest = message.eip712_signing_hash(&permit_domain(&domain_params()));
    let signature = signer.sign_hash_sync(&digest).unwrap();

    json!({
        "permit": {
            "principal": format!("{principal:?}"),
            "deadline": deadline,
            "nonce": nonce,
            "signature": format!("0x{}", alloy::hex::encode(signature.as_bytes())),
        },
        "token_in": TOKEN_A,
        "token_out": TOKEN_B,
        "amount_in": "1000",
        "min_amount_out": "990",
    })
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("response");

    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let tapp = test_app(true, None);
    let (status, payload) = get_json(&tapp.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn activation_grants_a_session_with_the_fixed_ttl() {
    let tapp = test_app(true, None);
    let signer = PrivateKeySigner::random();
    let principal = signer.address();

    let (status, payload) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["accepted"], true);
    assert_eq!(payload["remaining_seconds"].as_i64(), Some(SESSION_TTL_SECS));

    let (status, payload) =
        get_json(&tapp.app, &format!("/v1/session/{principal:?}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["active"], true);
    assert_eq!(payload["next_nonce"].as_u64(), Some(0));
    let remaining = payload["remaining_seconds"].as_i64().unwrap();
    assert!(remaining > SESSION_TTL_SECS - 5 && remaining <= SESSION_TTL_SECS);
}

#[tokio::test]
async fn rejected_proof_leaves_no_session() {
    let tapp = test_app(false, None);
    let principal = PrivateKeySigner::random().address();

    let (status, payload) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(payload["error_code"], "proof_rejected");

    let (status, payload) =
        get_json(&tapp.app, &format!("/v1/session/{principal:?}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["active"], false);
}

#[tokio::test]
async fn malformed_submission_never_reaches_the_oracle() {
    let tapp = test_app(true, None);
    let principal = PrivateKeySigner::random().address();

    let body = json!({
        "principal": format!("{principal:?}"),
        "proof": "0xabcd",
        "public_inputs": ["1"],  // wrong arity
    });
    let (status, payload) = post_json(&tapp.app, "/v1/session/activate", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error_code"], "malformed_submission");
    assert_eq!(tapp.oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn swap_requires_an_active_session() {
    let tapp = test_app(true, None);
    let signer = PrivateKeySigner::random();
    let deadline = chrono::Utc::now().timestamp() + 600;

    let (status, payload) = post_json(
        &tapp.app,
        "/v1/ops/swap",
        &signed_swap_body(&signer, 0, deadline),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(payload["error_code"], "session_inactive");
    assert_eq!(tapp.executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn swap_replay_is_rejected_and_fresh_nonce_accepted() {
    let tapp = test_app(true, None);
    let signer = PrivateKeySigner::random();
    let principal = signer.address();
    let deadline = chrono::Utc::now().timestamp() + 600;

    let (status, _) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::OK);

    // nonce 0 succeeds
    let body0 = signed_swap_body(&signer, 0, deadline);
    let (status, payload) = post_json(&tapp.app, "/v1/ops/swap", &body0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["nonce_used"].as_u64(), Some(0));

    // verbatim replay fails with a nonce mismatch
    let (status, payload) = post_json(&tapp.app, "/v1/ops/swap", &body0).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], "nonce_mismatch");

    // fresh permit with the next nonce succeeds
    let body1 = signed_swap_body(&signer, 1, deadline);
    let (status, payload) = post_json(&tapp.app, "/v1/ops/swap", &body1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["nonce_used"].as_u64(), Some(1));

    // the proof was verified exactly once across all three operations
    assert_eq!(tapp.oracle.calls.load(Ordering::SeqCst), 1);
    assert_eq!(tapp.executor.calls.load(Ordering::SeqCst), 2);

    let (_, payload) = get_json(&tapp.app, &format!("/v1/session/{principal:?}")).await;
    assert_eq!(payload["next_nonce"].as_u64(), Some(2));
}

#[tokio::test]
async fn expired_permit_is_rejected() {
    let tapp = test_app(true, None);
    let signer = PrivateKeySigner::random();
    let principal = signer.address();

    let (status, _) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::OK);

    let stale_deadline = chrono::Utc::now().timestamp() - 10;
    let (status, payload) = post_json(
        &tapp.app,
        "/v1/ops/swap",
        &signed_swap_body(&signer, 0, stale_deadline),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], "permit_expired");
}

#[tokio::test]
async fn tampered_operation_body_fails_the_signature_check() {
    let tapp = test_app(true, None);
    let signer = PrivateKeySigner::random();
    let principal = signer.address();
    let deadline = chrono::Utc::now().timestamp() + 600;

    let (status, _) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::OK);

    // Signed for 1000 in, submitted with 5000 in.
    let mut body = signed_swap_body(&signer, 0, deadline);
    body["amount_in"] = json!("5000");

    let (status, payload) = post_json(&tapp.app, "/v1/ops/swap", &body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["error_code"], "invalid_signature");
    assert_eq!(tapp.executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn revoke_takes_the_session_down() {
    let tapp = test_app(true, Some("sekrit"));
    let signer = PrivateKeySigner::random();
    let principal = signer.address();

    let (status, _) =
        post_json(&tapp.app, "/v1/session/activate", &activation_body(principal)).await;
    assert_eq!(status, StatusCode::OK);

    // Without the admin token the revoke is refused.
    let (status, _) = post_json(
        &tapp.app,
        &format!("/v1/session/{principal:?}/revoke"),
        &Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // With the token it succeeds and the session goes away.
    let response = tapp
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/session/{principal:?}/revoke"))
                .header("authorization", "Bearer sekrit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, payload) = get_json(&tapp.app, &format!("/v1/session/{principal:?}")).await;
    assert_eq!(payload["active"], false);
}
