// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact integrity — SHA-256 digests of every exported file.

use sha2::{Digest, Sha256};
use wasserzeichen_core::WasserzeichenError;

/// SHA-256 of `data` as a lowercase hex string.
///
/// Computed once per artifact when the download plan is built; sinks can
/// re-check what they wrote against it.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Check `data` against an expected hex digest.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), WasserzeichenError> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(WasserzeichenError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
