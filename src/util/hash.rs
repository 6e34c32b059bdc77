//! SHA256 content hashes for source suites.
//!
//! The manifest records one hash per source file so consumers can tell
//! whether a compiled suite is stale without recompiling.

use sha2::{Digest, Sha256};

/// Raw SHA256 digest of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Lowercase hex SHA256 of `bytes`.
#[must_use]
pub fn content_hash_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    content_hash(bytes)
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
