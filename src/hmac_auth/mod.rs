//! HMAC authentication for the internal service-to-service API.
//!
//! Callers sign every request with a pre-shared secret. The gate rejects a
//! request unless it carries a valid HMAC-SHA256 signature, a fresh
//! timestamp and (when nonce mode is on) a nonce that has not been seen
//! inside the clock-skew window.
//!
//! ## Components
//! - `headers`: header names and precondition check
//! - `credentials`: key id -> secret resolution
//! - `canonical`: canonical message construction
//! - `signature`: HMAC-SHA256 signing and constant-time verification
//! - `nonce_store`: replay detection store
//! - `verifier`: per-request verification sequence
//! - `middleware`: Axum gate in front of the tenant handlers
//! - `error`: rejection reasons

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod nonce_store;
pub mod signature;
pub mod verifier;

pub use canonical::CanonicalRequest;
pub use credentials::{CredentialStore, Secret};
pub use error::AuthError;
pub use headers::{SignedHeaders, extract_signed_headers};
pub use middleware::{AuthState, AuthenticatedCaller, authenticate, hmac_auth_middleware};
pub use nonce_store::{MemoryNonceStore, NonceStore, NonceStoreError, spawn_purge_task};
pub use signature::{SignedRequestHeaders, sign_request, verify_signature};
pub use verifier::{HmacVerifier, SignedRequest, VerifierSettings};
