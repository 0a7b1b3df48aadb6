//! Tenant lifecycle handlers.
//!
//! Only reached after the HMAC gate accepted the request. Adapter failures
//! are normalized through the same error envelope as authentication errors.

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::super::state::AppState;
use crate::error::{ApiError, ErrorCode};
use crate::hmac_auth::AuthenticatedCaller;
use crate::tenant::{AdapterError, CreateTenantRequest, TenantActionRequest, parse_payload};

/// Lifecycle action addressed as `{tenant_uuid}:<action>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantAction {
    Warn,
    Suspend,
    Activate,
}

impl TenantAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "warn" => Some(Self::Warn),
            "suspend" => Some(Self::Suspend),
            "activate" => Some(Self::Activate),
            _ => None,
        }
    }

    /// Status reported in the success body.
    pub fn status(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Suspend => "suspended",
            Self::Activate => "active",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Suspend => "suspend",
            Self::Activate => "activate",
        }
    }
}

/// Split `"<tenant_uuid>:<action>"` on the last colon.
pub fn parse_target(target: &str) -> Option<(&str, TenantAction)> {
    let (tenant_uuid, action) = target.rsplit_once(':')?;
    if tenant_uuid.is_empty() {
        return None;
    }
    Some((tenant_uuid, TenantAction::parse(action)?))
}

#[derive(Debug, Serialize)]
pub struct TenantActionResponse {
    pub ok: bool,
    pub tenant_uuid: String,
    pub status: &'static str,
}

/// POST /internal/v1/tenants
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedCaller>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: CreateTenantRequest = parse_payload(&body)?;
    let requested_uuid = request.tenant_uuid.clone();

    let data = state
        .adapter
        .create_tenant(request)
        .await
        .map_err(|e| adapter_failure(&state, &caller, "create", &requested_uuid, e))?;

    let tenant_uuid = data
        .get("tenant_uuid")
        .cloned()
        .unwrap_or(Value::String(requested_uuid));

    let mut response = Map::new();
    response.insert("ok".into(), Value::Bool(true));
    response.insert("tenant_uuid".into(), tenant_uuid);
    response.insert("status".into(), Value::String("created".into()));
    // Adapter fields never override ok/tenant_uuid/status
    for (key, value) in data {
        response.entry(key).or_insert(value);
    }

    tracing::info!(caller = %caller.key_id, tenant_uuid = %response["tenant_uuid"], "tenant created");
    Ok(Json(Value::Object(response)))
}

/// POST /internal/v1/tenants/{tenant_uuid}:warn|:suspend|:activate
pub async fn tenant_action(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedCaller>,
    Path(target): Path<String>,
    body: Bytes,
) -> Result<Json<TenantActionResponse>, ApiError> {
    let (tenant_uuid, action) =
        parse_target(&target).ok_or_else(|| ApiError::from_code(ErrorCode::NotFound))?;
    let request: TenantActionRequest = parse_payload(&body)?;

    let adapter = &state.adapter;
    let result = match action {
        TenantAction::Warn => adapter.warn_tenant(tenant_uuid, request).await,
        TenantAction::Suspend => adapter.suspend_tenant(tenant_uuid, request).await,
        TenantAction::Activate => adapter.activate_tenant(tenant_uuid, request).await,
    };
    result.map_err(|e| adapter_failure(&state, &caller, action.name(), tenant_uuid, e))?;

    tracing::info!(caller = %caller.key_id, tenant_uuid, action = action.name(), "tenant action applied");
    Ok(Json(TenantActionResponse {
        ok: true,
        tenant_uuid: tenant_uuid.to_string(),
        status: action.status(),
    }))
}

/// Fallback for unknown routes, keeps the error envelope consistent.
pub async fn not_found() -> ApiError {
    ApiError::from_code(ErrorCode::NotFound)
}

fn adapter_failure(
    state: &AppState,
    caller: &AuthenticatedCaller,
    operation: &'static str,
    tenant_uuid: &str,
    err: AdapterError,
) -> ApiError {
    let adapter = state.adapter.name();
    match &err {
        AdapterError::Unexpected(cause) => {
            tracing::error!(
                adapter,
                operation,
                tenant_uuid,
                caller = %caller.key_id,
                error = ?cause,
                "tenant adapter failed unexpectedly"
            );
        }
        AdapterError::ProvisionFailed(message) => {
            tracing::error!(adapter, operation, tenant_uuid, caller = %caller.key_id, message = %message, "tenant provisioning refused");
        }
        AdapterError::TenantNotFound(_) | AdapterError::TenantAlreadyExists(_) => {
            tracing::info!(adapter, operation, tenant_uuid, error = %err, "tenant adapter rejected request");
        }
    }
    ApiError::from(err)
}
