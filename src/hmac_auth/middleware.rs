//! Authentication gate for Axum.
//!
//! Runs header extraction, secret resolution and signature verification in
//! order. On rejection the error response is returned and the tenant handler
//! never runs. On acceptance the original request (body included) is
//! forwarded unchanged.

use axum::{
    body::{Body, to_bytes},
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{
    credentials::CredentialStore,
    error::AuthError,
    headers::extract_signed_headers,
    nonce_store::NonceStore,
    verifier::{HmacVerifier, SignedRequest, VerifierSettings},
};
use crate::config::HmacConfig;
use crate::error::ApiError;

/// Authentication state shared across requests.
#[derive(Clone)]
pub struct AuthState {
    pub credentials: Arc<CredentialStore>,
    pub verifier: HmacVerifier,
    /// Largest body buffered for signing
    pub max_body_bytes: usize,
}

impl AuthState {
    pub fn new(
        credentials: Arc<CredentialStore>,
        verifier: HmacVerifier,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            credentials,
            verifier,
            max_body_bytes,
        }
    }

    pub fn from_config(
        config: &HmacConfig,
        nonce_store: Arc<dyn NonceStore>,
        max_body_bytes: usize,
    ) -> anyhow::Result<Self> {
        let credentials = CredentialStore::from_config(&config.keys)?;
        let verifier = HmacVerifier::new(VerifierSettings::from(config), nonce_store);
        Ok(Self::new(Arc::new(credentials), verifier, max_body_bytes))
    }
}

/// Identity of an authenticated caller, injected into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub key_id: String,
}

/// Authenticate one request. Returns the caller's key id on success.
pub async fn authenticate(
    state: &AuthState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
    now: i64,
) -> Result<String, AuthError> {
    // Step 1: Precondition check, before any cryptographic work
    let nonce_required = state.verifier.settings().nonce_enabled;
    let signed = extract_signed_headers(headers, nonce_required)?;

    // Step 2: Resolve secret (None is verified as a bad signature)
    let secret = state.credentials.resolve(signed.key_id);

    // Step 3: Verify signature, timestamp, nonce
    let request = SignedRequest {
        method,
        path,
        body,
        headers: signed,
    };
    state.verifier.verify(&request, secret, now).await?;

    Ok(signed.key_id.to_string())
}

/// Axum middleware guarding the internal tenant routes.
pub async fn hmac_auth_middleware(
    State(state): State<Arc<AuthState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    // Fail fast on missing headers before buffering the body
    let nonce_required = state.verifier.settings().nonce_enabled;
    if let Err(err) = extract_signed_headers(&parts.headers, nonce_required) {
        return Err(reject(&parts, err));
    }

    let bytes = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| ApiError::validation("Request body too large or unreadable."))?;

    let method = parts.method.as_str().to_string();
    let path = request_path(&parts);
    let now = chrono::Utc::now().timestamp();

    match authenticate(&state, &method, &path, &parts.headers, &bytes, now).await {
        Ok(key_id) => {
            tracing::debug!(key_id = %key_id, path = %path, "hmac request accepted");
            parts.extensions.insert(AuthenticatedCaller { key_id });
            let request = Request::from_parts(parts, Body::from(bytes));
            Ok(next.run(request).await)
        }
        Err(err) => Err(reject(&parts, err)),
    }
}

fn reject(parts: &Parts, err: AuthError) -> ApiError {
    let key_id = parts
        .headers
        .get(super::headers::KEY_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match &err {
        AuthError::NonceStoreUnavailable(cause) => {
            tracing::error!(key_id, path = %parts.uri.path(), cause = %cause, "nonce store failure, rejecting request");
        }
        _ => {
            tracing::warn!(key_id, path = %parts.uri.path(), code = err.code().name(), "hmac request rejected");
        }
    }
    ApiError::from(err)
}

/// Path as sent by the client, before any router prefix stripping.
fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}
