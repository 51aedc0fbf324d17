// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and protocol constants used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the embedded database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | JSON-RPC endpoint for verifier/pool calls | Required for production |
//! | `CHAIN_ID` | EIP-712 domain chain id | Required for production |
//! | `VERIFIER_ADDRESS` | Compliance verifier contract address | Required for production |
//! | `POOL_ADDRESS` | Gated pool contract address | Required for production |
//! | `RELAY_PRIVATE_KEY` | Hex key of the relay operator account | Required for production |
//! | `ADMIN_TOKEN` | Bearer token for administrative revoke | Optional (revoke disabled) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// The embedded redb database (`relay.redb`) holding sessions and nonces
/// lives under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Data directory used when `DATA_DIR` is unset. Startup and the readiness
/// probe must agree on this.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Environment variable name for the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Environment variable name for the EIP-712 domain chain id.
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";

/// Environment variable name for the compliance verifier contract address.
pub const VERIFIER_ADDRESS_ENV: &str = "VERIFIER_ADDRESS";

/// Environment variable name for the gated pool contract address.
pub const POOL_ADDRESS_ENV: &str = "POOL_ADDRESS";

/// Environment variable name for the relay operator private key (hex, no 0x).
pub const RELAY_PRIVATE_KEY_ENV: &str = "RELAY_PRIVATE_KEY";

/// Environment variable name for the administrative bearer token.
///
/// When unset, the revoke endpoint rejects every request.
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";

/// Session time-to-live in seconds (24 hours).
///
/// Protocol-wide constant: every activation and refresh extends the session
/// by exactly this much from the moment the proof verifies. There is no
/// per-call override.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Upper bound on a single verifier oracle call, in seconds.
///
/// The oracle call is network I/O; a hung RPC endpoint must not wedge an
/// activation request indefinitely.
pub const ORACLE_TIMEOUT_SECS: u64 = 30;

/// Number of public inputs the verifier circuit expects.
///
/// Fixed contract with the deployed verifier; submissions with any other
/// arity are rejected before the oracle is reached.
pub const PUBLIC_INPUT_COUNT: usize = 4;

/// EIP-712 domain name for operation permits.
pub const PERMIT_DOMAIN_NAME: &str = "CompliancePermit";

/// EIP-712 domain version for operation permits.
pub const PERMIT_DOMAIN_VERSION: &str = "1";

/// Filename of the embedded database under `DATA_DIR`.
pub const RELAY_DB_FILE: &str = "relay.redb";
