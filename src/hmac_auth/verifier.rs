//! Signature verification sequence.
//!
//! Order per request:
//! 1. signature (constant-time), unknown key ids fail here as well
//! 2. timestamp freshness, only after the signature matched
//! 3. nonce check-and-record, when nonce mode is on
//!
//! The first failing step is the only outcome reported.

use std::sync::Arc;
use std::time::Duration;

use super::canonical::CanonicalRequest;
use super::credentials::Secret;
use super::error::AuthError;
use super::headers::{self, SignedHeaders};
use super::nonce_store::NonceStore;
use super::signature::verify_signature;
use crate::config::{HmacConfig, NonceScope};

/// Stand-in key for unknown key ids, so both paths compute one MAC.
const UNKNOWN_KEY_SECRET: &[u8] = b"tenant-gate/unknown-key-id";

/// Immutable verifier settings, taken from configuration at startup.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub allowed_clock_skew_seconds: i64,
    pub nonce_enabled: bool,
    pub nonce_scope: NonceScope,
    pub nonce_store_timeout: Duration,
}

impl VerifierSettings {
    /// Nonce record lifetime: the skew window, at least one second.
    pub fn nonce_ttl(&self) -> Duration {
        Duration::from_secs(self.allowed_clock_skew_seconds.max(1) as u64)
    }
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self::from(&HmacConfig::default())
    }
}

impl From<&HmacConfig> for VerifierSettings {
    fn from(config: &HmacConfig) -> Self {
        Self {
            allowed_clock_skew_seconds: config.allowed_clock_skew_seconds,
            nonce_enabled: config.nonce.enabled,
            nonce_scope: config.nonce.scope,
            nonce_store_timeout: Duration::from_millis(config.nonce.store_timeout_ms),
        }
    }
}

/// One inbound request as seen by the verifier.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub body: &'a [u8],
    pub headers: SignedHeaders<'a>,
}

impl SignedRequest<'_> {
    pub fn canonical(&self) -> CanonicalRequest<'_> {
        CanonicalRequest {
            method: self.method,
            path: self.path,
            timestamp: self.headers.timestamp,
            nonce: self.headers.nonce,
            body: self.body,
        }
    }
}

/// Derive the nonce store key for a request.
///
/// The key id is length-prefixed so `("a:b", "c")` and `("a", "b:c")` differ.
pub fn nonce_key(scope: NonceScope, key_id: &str, nonce: &str) -> String {
    match scope {
        NonceScope::KeyAndNonce => format!("{}:{}:{}", key_id.len(), key_id, nonce),
        NonceScope::NonceOnly => nonce.to_string(),
    }
}

#[derive(Clone)]
pub struct HmacVerifier {
    settings: VerifierSettings,
    nonce_store: Arc<dyn NonceStore>,
}

impl HmacVerifier {
    pub fn new(settings: VerifierSettings, nonce_store: Arc<dyn NonceStore>) -> Self {
        Self {
            settings,
            nonce_store,
        }
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Run the verification sequence.
    ///
    /// `secret` is the resolved secret, `None` for an unknown key id.
    /// `now` is the server time in Unix seconds.
    pub async fn verify(
        &self,
        request: &SignedRequest<'_>,
        secret: Option<&Secret>,
        now: i64,
    ) -> Result<(), AuthError> {
        // Step 1: Signature
        let message = request.canonical().to_bytes();
        let key = secret.map(Secret::expose).unwrap_or(UNKNOWN_KEY_SECRET);
        let signature_ok = verify_signature(key, &message, request.headers.signature);
        if secret.is_none() || !signature_ok {
            return Err(AuthError::InvalidSignature);
        }

        // Step 2: Timestamp freshness
        let timestamp: i64 = request.headers.timestamp.trim().parse().map_err(|_| {
            AuthError::Validation("Timestamp header must be Unix seconds.".to_string())
        })?;
        if now.abs_diff(timestamp) > self.settings.allowed_clock_skew_seconds.max(0) as u64 {
            return Err(AuthError::RequestExpired);
        }

        // Step 3: Nonce check-and-record
        if self.settings.nonce_enabled {
            let nonce = request
                .headers
                .nonce
                .ok_or_else(|| AuthError::MissingHeaders(vec![headers::NONCE]))?;
            let key = nonce_key(self.settings.nonce_scope, request.headers.key_id, nonce);
            let recorded = tokio::time::timeout(
                self.settings.nonce_store_timeout,
                self.nonce_store
                    .insert_if_absent(&key, self.settings.nonce_ttl()),
            )
            .await
            .map_err(|_| AuthError::NonceStoreUnavailable("operation timed out".to_string()))?
            .map_err(|e| AuthError::NonceStoreUnavailable(e.to_string()))?;

            if !recorded {
                return Err(AuthError::NonceReplay);
            }
        }

        Ok(())
    }
}
