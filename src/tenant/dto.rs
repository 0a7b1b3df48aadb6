//! Tenant request payloads.
//!
//! Only the fields the gate itself needs are typed; everything else is kept
//! in `extra` and handed to the adapter untouched.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::error::ApiError;

/// POST /internal/v1/tenants
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 128))]
    pub tenant_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub tenant_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// POST /internal/v1/tenants/{tenant_uuid}:warn|:suspend|:activate
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TenantActionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse and validate a JSON payload. An empty body reads as `{}`.
pub fn parse_payload<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    let payload: T = serde_json::from_slice(body).map_err(|e| {
        ApiError::validation("Invalid request payload.")
            .with_details(json!({ "reason": e.to_string() }))
    })?;

    if let Err(errors) = payload.validate() {
        let fields: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                (
                    field.to_string(),
                    errs.iter().map(|e| e.code.to_string()).collect(),
                )
            })
            .collect();
        return Err(ApiError::validation("Invalid request payload.")
            .with_details(json!({ "fields": fields })));
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_create_minimal() {
        let req: CreateTenantRequest = parse_payload(br#"{"tenant_uuid":"t-1"}"#).unwrap();
        assert_eq!(req.tenant_uuid, "t-1");
        assert!(req.tenant_name.is_none());
        assert!(req.extra.is_empty());
    }

    #[test]
    fn test_create_keeps_extra_fields() {
        let req: CreateTenantRequest = parse_payload(
            br#"{"tenant_uuid":"t-1","tenant_name":"Acme","locale_config":{"currency":"PEN"}}"#,
        )
        .unwrap();
        assert_eq!(req.tenant_name.as_deref(), Some("Acme"));
        assert_eq!(req.extra["locale_config"]["currency"], json!("PEN"));
    }

    #[test]
    fn test_create_requires_tenant_uuid() {
        let err = parse_payload::<CreateTenantRequest>(b"{}").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = parse_payload::<CreateTenantRequest>(br#"{"tenant_uuid":""}"#).unwrap_err();
        let details = err.details.unwrap();
        assert_eq!(details["fields"]["tenant_uuid"], json!(["length"]));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_payload::<CreateTenantRequest>(b"{not json").unwrap_err();
        assert_eq!(err.code.name(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_action_empty_body() {
        let req: TenantActionRequest = parse_payload(b"").unwrap();
        assert!(req.reason.is_none());
        let req: TenantActionRequest = parse_payload(b"  \n").unwrap();
        assert!(req.extra.is_empty());
    }

    #[test]
    fn test_action_with_reason() {
        let req: TenantActionRequest =
            parse_payload(br#"{"reason":"invoice overdue","days":15}"#).unwrap();
        assert_eq!(req.reason.as_deref(), Some("invoice overdue"));
        assert_eq!(req.extra["days"], json!(15));
    }
}
