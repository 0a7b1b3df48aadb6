//! Tenant Gate - HMAC-authenticated internal tenant lifecycle API
//!
//! Trusted internal services call `/internal/v1/tenants` to create, warn,
//! suspend and reactivate tenants. Every call is authenticated with a
//! pre-shared-secret HMAC-SHA256 signature, a timestamp window and an
//! optional single-use nonce.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`error`] - Error codes and the JSON error envelope
//! - [`hmac_auth`] - Signature verification, replay protection, Axum gate
//! - [`tenant`] - Tenant adapter contract, payloads, in-memory adapter
//! - [`gateway`] - HTTP router and server
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod error;
pub mod gateway;
pub mod hmac_auth;
pub mod logging;
pub mod tenant;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use gateway::{build_router, run_server, state::AppState};
pub use hmac_auth::{AuthError, AuthState, MemoryNonceStore, NonceStore, sign_request};
pub use tenant::{InMemoryTenantAdapter, TenantAdapter};
