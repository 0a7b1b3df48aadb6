//! Authentication rejection reasons.
//!
//! Each variant is a terminal outcome of the verification sequence. The
//! mapping to wire codes and statuses lives in [`crate::error`].

use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::error::{ApiError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// One or more required headers are absent or empty.
    #[error("missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<&'static str>),

    /// Unknown key id or signature mismatch. Deliberately indistinguishable.
    #[error("invalid signature")]
    InvalidSignature,

    #[error("request timestamp outside allowed clock skew")]
    RequestExpired,

    #[error("nonce already used")]
    NonceReplay,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("nonce store unavailable: {0}")]
    NonceStoreUnavailable(String),
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingHeaders(_) | Self::Validation(_) => ErrorCode::ValidationError,
            Self::InvalidSignature => ErrorCode::InvalidSignature,
            Self::RequestExpired => ErrorCode::RequestExpired,
            Self::NonceReplay => ErrorCode::NonceReplay,
            Self::NonceStoreUnavailable(_) => ErrorCode::NonceStoreUnavailable,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeaders(missing) => {
                ApiError::validation("Missing required HMAC headers.")
                    .with_details(json!({ "missing_headers": missing }))
            }
            AuthError::Validation(message) => ApiError::validation(message),
            // Store failures are logged by the gate; the caller only sees the code.
            other => ApiError::from_code(other.code()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_codes() {
        assert_eq!(
            AuthError::MissingHeaders(vec!["x-internal-key-id"]).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(AuthError::InvalidSignature.code(), ErrorCode::InvalidSignature);
        assert_eq!(AuthError::RequestExpired.code(), ErrorCode::RequestExpired);
        assert_eq!(AuthError::NonceReplay.code(), ErrorCode::NonceReplay);
    }

    #[test]
    fn test_missing_headers_details() {
        let err: ApiError =
            AuthError::MissingHeaders(vec!["x-internal-timestamp", "x-internal-signature"]).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let details = err.details.unwrap();
        assert_eq!(
            details["missing_headers"],
            json!(["x-internal-timestamp", "x-internal-signature"])
        );
    }

    #[test]
    fn test_store_failure_is_not_leaked() {
        let err: ApiError =
            AuthError::NonceStoreUnavailable("connection refused 10.0.0.3:6379".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_auth_failures_are_401() {
        for err in [
            AuthError::InvalidSignature,
            AuthError::RequestExpired,
            AuthError::NonceReplay,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::UNAUTHORIZED);
        }
    }
}
