//! Error mapper for the internal API.
//!
//! Every failure path (authentication, payload validation, downstream adapter)
//! is normalized into an [`ApiError`] and rendered with the same envelope:
//!
//! ```json
//! { "ok": false, "error": { "code": "INVALID_SIGNATURE", "message": "Invalid signature." } }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Wire-level error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing headers, malformed timestamp, bad payload
    ValidationError,
    /// Unknown key id or signature mismatch
    InvalidSignature,
    /// Timestamp outside the allowed clock skew
    RequestExpired,
    /// Nonce already used inside its TTL
    NonceReplay,
    /// Nonce store timed out or is unreachable
    NonceStoreUnavailable,
    TenantNotFound,
    TenantAlreadyExists,
    /// No such route or tenant action
    NotFound,
    /// Unexpected downstream failure
    ProvisionFailed,
}

impl ErrorCode {
    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::RequestExpired => "REQUEST_EXPIRED",
            Self::NonceReplay => "NONCE_REPLAY",
            Self::NonceStoreUnavailable => "NONCE_STORE_UNAVAILABLE",
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::TenantAlreadyExists => "TENANT_ALREADY_EXISTS",
            Self::NotFound => "NOT_FOUND",
            Self::ProvisionFailed => "PROVISION_FAILED",
        }
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::InvalidSignature | Self::RequestExpired | Self::NonceReplay => {
                StatusCode::UNAUTHORIZED
            }
            Self::TenantNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::TenantAlreadyExists => StatusCode::CONFLICT,
            Self::NonceStoreUnavailable | Self::ProvisionFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::ValidationError => "Invalid request.",
            Self::InvalidSignature => "Invalid signature.",
            Self::RequestExpired => "Request expired.",
            Self::NonceReplay => "Nonce replay detected.",
            Self::NonceStoreUnavailable => "Replay protection is temporarily unavailable.",
            Self::TenantNotFound => "Tenant not found.",
            Self::TenantAlreadyExists => "Tenant already exists.",
            Self::NotFound => "Not found.",
            Self::ProvisionFailed => "Tenant provisioning failed.",
        }
    }
}

/// Error with code, caller-facing message and optional structured details.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create error with default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

/// JSON body of the error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            ok: false,
            error: ErrorBody {
                code: self.code.name(),
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}
