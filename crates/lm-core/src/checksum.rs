//! SHA-256 content digests for migration tamper detection.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded digest produced by [`compute_checksum`].
pub const CHECKSUM_HEX_LEN: usize = 64;

/// Compute the SHA-256 digest of `content` as lowercase hex.
///
/// Hashes the exact bytes; no newline or whitespace normalization happens,
/// so re-saving a file with different line endings changes its checksum.
pub fn compute_checksum(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Returns `true` if `value` looks like a digest produced by [`compute_checksum`].
pub fn is_valid_checksum(value: &str) -> bool {
    value.len() == CHECKSUM_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
