// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed-data signature verification.
//!
//! Pure function, no state: recompute the EIP-712 digest, recover the
//! signer, compare against the claimed principal. Every failure mode
//! (wrong length, bad recovery id, recovery error, mismatch) collapses to
//! `false` so callers treat "invalid" uniformly.

use alloy::{
    primitives::{Address, Signature},
    sol_types::{Eip712Domain, SolStruct},
};

use super::domain::OperationPermit;

/// Verify a permit signature against the claimed signer.
///
/// Returns `false` rather than erroring on malformed signature bytes.
/// Address comparison is exact on the recovered 20 bytes, which makes it
/// case-insensitive with respect to hex display.
pub fn verify_permit_signature(
    domain: &Eip712Domain,
    permit: &OperationPermit,
    claimed_signer: Address,
    signature: &[u8],
) -> bool {
    let Ok(sig) = Signature::from_raw(signature) else {
        return false;
    };

    let digest = permit.eip712_signing_hash(domain);
    match sig.recover_address_from_prehash(&digest) {
        Ok(recovered) => recovered == claimed_signer,
        Err(_) => false,
    }
}
