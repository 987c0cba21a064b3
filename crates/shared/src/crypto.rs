//! Cryptographic utilities for digests and signed payloads.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes an HMAC-SHA256 over `payload` keyed with `secret`, hex encoded.
pub fn hmac_sha256_hex(secret: &[u8], payload: &[u8]) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a hex-encoded HMAC-SHA256 signature in constant time.
///
/// Returns `false` for malformed hex as well as for mismatching signatures.
pub fn verify_hmac_sha256_hex(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231 test case 2
        let signature = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_hmac_roundtrip() {
        let signature =
            hmac_sha256_hex(b"whsec_test", b"1700000000.{\"id\":\"evt_1\"}").unwrap();
        assert!(verify_hmac_sha256_hex(
            b"whsec_test",
            b"1700000000.{\"id\":\"evt_1\"}",
            &signature
        ));
    }

    #[test]
    fn test_verify_hmac_rejects_tampered_payload() {
        let signature = hmac_sha256_hex(b"whsec_test", b"payload").unwrap();
        assert!(!verify_hmac_sha256_hex(b"whsec_test", b"payload2", &signature));
        assert!(!verify_hmac_sha256_hex(b"other_secret", b"payload", &signature));
    }

    #[test]
    fn test_verify_hmac_rejects_malformed_hex() {
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", "not-hex"));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", ""));
    }
}
