//! HMAC-SHA256 request signatures.
//!
//! Signatures travel hex-encoded (either case). Standard or URL-safe base64
//! is accepted as well. Comparison is constant-time over the decoded bytes.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::canonical::CanonicalRequest;
use super::headers;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output length in bytes.
pub const SIGNATURE_LEN: usize = 32;

/// Compute the raw MAC of `message` under `secret`.
pub fn compute_signature(secret: &[u8], message: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(message);
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Decode a transmitted signature. Hex is tried first.
pub fn decode_signature(encoded: &str) -> Option<Vec<u8>> {
    let encoded = encoded.trim();
    if let Ok(bytes) = hex::decode(encoded) {
        return Some(bytes);
    }
    [STANDARD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(encoded).ok())
}

/// Check `provided` against the MAC of `message` under `secret`.
///
/// Undecodable input is compared against a zero buffer so that malformed
/// signatures take the same path as wrong ones.
pub fn verify_signature(secret: &[u8], message: &[u8], provided: &str) -> bool {
    let expected = compute_signature(secret, message);
    let provided = decode_signature(provided).unwrap_or_else(|| vec![0u8; SIGNATURE_LEN]);
    if provided.len() != SIGNATURE_LEN {
        return false;
    }
    expected[..].ct_eq(&provided[..]).into()
}

/// Header set a client attaches to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestHeaders {
    pub key_id: String,
    pub timestamp: String,
    pub nonce: Option<String>,
    /// Lowercase hex HMAC-SHA256
    pub signature: String,
}

impl SignedRequestHeaders {
    /// `(header-name, value)` pairs ready to attach to an HTTP request.
    pub fn header_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (headers::KEY_ID, self.key_id.clone()),
            (headers::TIMESTAMP, self.timestamp.clone()),
            (headers::SIGNATURE, self.signature.clone()),
        ];
        if let Some(nonce) = &self.nonce {
            pairs.push((headers::NONCE, nonce.clone()));
        }
        pairs
    }
}

/// Sign a request the way the gate verifies it.
pub fn sign_request(
    key_id: &str,
    secret: &[u8],
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: &str,
    nonce: Option<&str>,
) -> SignedRequestHeaders {
    let message = CanonicalRequest {
        method,
        path,
        timestamp,
        nonce,
        body,
    }
    .to_bytes();

    SignedRequestHeaders {
        key_id: key_id.to_string(),
        timestamp: timestamp.to_string(),
        nonce: nonce.map(str::to_string),
        signature: hex::encode(compute_signature(secret, &message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_case_2() {
        // RFC 4231 test case 2
        let mac = compute_signature(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_hex_and_base64() {
        let mac = compute_signature(b"secret", b"message");
        assert!(verify_signature(b"secret", b"message", &hex::encode(mac)));
        assert!(verify_signature(
            b"secret",
            b"message",
            &hex::encode_upper(mac)
        ));
        assert!(verify_signature(b"secret", b"message", &STANDARD.encode(mac)));
        assert!(verify_signature(
            b"secret",
            b"message",
            &URL_SAFE_NO_PAD.encode(mac)
        ));
    }

    #[test]
    fn test_wrong_secret_or_message() {
        let sig = hex::encode(compute_signature(b"secret", b"message"));
        assert!(!verify_signature(b"other", b"message", &sig));
        assert!(!verify_signature(b"secret", b"messagE", &sig));
    }

    #[test]
    fn test_single_bit_flip_rejected() {
        let mut mac = compute_signature(b"secret", b"message");
        mac[SIGNATURE_LEN - 1] ^= 0x01;
        assert!(!verify_signature(b"secret", b"message", &hex::encode(mac)));
    }

    #[test]
    fn test_malformed_signatures_rejected() {
        assert!(!verify_signature(b"secret", b"message", "invalid-signature"));
        assert!(!verify_signature(b"secret", b"message", ""));
        // Truncated MAC
        let mac = compute_signature(b"secret", b"message");
        assert!(!verify_signature(
            b"secret",
            b"message",
            &hex::encode(&mac[..16])
        ));
    }

    #[test]
    fn test_sign_request_round_trip() {
        let signed = sign_request(
            "svc-billing",
            b"s3cret",
            "POST",
            "/internal/v1/tenants",
            br#"{"tenant_uuid":"t-1"}"#,
            "1760000000",
            Some("n-1"),
        );
        let message = CanonicalRequest {
            method: "POST",
            path: "/internal/v1/tenants",
            timestamp: "1760000000",
            nonce: Some("n-1"),
            body: br#"{"tenant_uuid":"t-1"}"#,
        }
        .to_bytes();
        assert!(verify_signature(b"s3cret", &message, &signed.signature));
        assert_eq!(signed.header_pairs().len(), 4);
    }

    #[test]
    fn test_header_pairs_without_nonce() {
        let signed = sign_request("k", b"s", "POST", "/", b"", "1", None);
        let names: Vec<_> = signed.header_pairs().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![headers::KEY_ID, headers::TIMESTAMP, headers::SIGNATURE]
        );
    }
}
