//! SHA-256 digest helpers for external integrity checks.
//!
//! The main read/write pipeline does not embed a digest: a default-posture
//! slot must stay a hand-editable document, and a compressed slot must stay
//! a plain zlib stream. Launchers and tooling that want tamper evidence can
//! digest a slot file and store the hex string out of band.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the given bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Check bytes against a previously recorded hex digest.
pub fn verify_sha256(bytes: &[u8], expected_hex: &str) -> bool {
    sha256_hex(bytes).eq_ignore_ascii_case(expected_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // SHA-256 of the empty input.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let digest = sha256_hex(b"slot data").to_uppercase();
        assert!(verify_sha256(b"slot data", &digest));
        assert!(!verify_sha256(b"slot data tampered", &digest));
    }
}
