//! SHA-256 digests used for key diagnostics.
//!
//! Operators compare fingerprints between the sealing tool and the server to
//! spot a key mismatch without either side ever logging key material.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a key fingerprint.
pub const FINGERPRINT_LEN: usize = 12;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Short fingerprint of a symmetric key, safe to put in logs.
pub fn key_fingerprint(key: &[u8]) -> String {
    let mut hex = sha256_hex(key);
    hex.truncate(FINGERPRINT_LEN);
    hex
}
