//! Signed request headers and the precondition check.

use axum::http::HeaderMap;

use super::error::AuthError;

pub const KEY_ID: &str = "x-internal-key-id";
pub const TIMESTAMP: &str = "x-internal-timestamp";
pub const NONCE: &str = "x-internal-nonce";
pub const SIGNATURE: &str = "x-internal-signature";

/// Authentication headers of one request, borrowed from the header map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedHeaders<'a> {
    pub key_id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
    /// `None` when the header is absent or empty.
    pub nonce: Option<&'a str>,
}

/// Extract the signed headers, failing before any cryptographic work.
///
/// Non-UTF-8 values count as missing. When `nonce_required` is set an empty
/// nonce is reported together with the other absent headers.
pub fn extract_signed_headers(
    headers: &HeaderMap,
    nonce_required: bool,
) -> Result<SignedHeaders<'_>, AuthError> {
    let key_id = header_value(headers, KEY_ID);
    let timestamp = header_value(headers, TIMESTAMP);
    let signature = header_value(headers, SIGNATURE);
    let nonce = header_value(headers, NONCE);

    let mut missing = Vec::new();
    if key_id.is_empty() {
        missing.push(KEY_ID);
    }
    if timestamp.is_empty() {
        missing.push(TIMESTAMP);
    }
    if signature.is_empty() {
        missing.push(SIGNATURE);
    }
    if nonce_required && nonce.is_empty() {
        missing.push(NONCE);
    }
    if !missing.is_empty() {
        return Err(AuthError::MissingHeaders(missing));
    }

    Ok(SignedHeaders {
        key_id,
        timestamp,
        signature,
        nonce: (!nonce.is_empty()).then_some(nonce),
    })
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
