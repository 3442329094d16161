//! Evidence fingerprinting of input buffers

use sha2::{Digest, Sha256};

/// SHA-256 of a raw buffer, for correlating reports with acquired evidence
#[must_use]
pub fn evidence_digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Lowercase hex SHA-256 of a raw buffer
#[must_use]
pub fn evidence_digest_hex(data: &[u8]) -> String {
    hex::encode(evidence_digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_digest() {
        assert_eq!(
            evidence_digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        let data = b"NP\x00\x00";
        assert_eq!(evidence_digest(data), evidence_digest(data));
        assert_ne!(evidence_digest(data), evidence_digest(b"NP\x00\x01"));
    }
}
