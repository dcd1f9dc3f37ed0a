use sha2::{Digest, Sha256};

/// Fingerprint of a memory's content: SHA-256 as lowercase hex.
///
/// Exact-match only. Two contents that differ by a single byte (including
/// whitespace) produce different fingerprints.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
