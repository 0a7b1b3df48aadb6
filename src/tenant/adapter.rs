//! Tenant adapter contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::dto::{CreateTenantRequest, TenantActionRequest};
use super::memory::InMemoryTenantAdapter;
use crate::config::AdapterKind;
use crate::error::{ApiError, ErrorCode};

/// Failures reported by a tenant adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("tenant already exists: {0}")]
    TenantAlreadyExists(String),

    /// Provisioning refused with an adapter-authored message.
    #[error("provisioning failed: {0}")]
    ProvisionFailed(String),

    /// Anything else. Logged in full, never returned verbatim.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::TenantNotFound(tenant_uuid) => {
                ApiError::from_code(ErrorCode::TenantNotFound)
                    .with_details(json!({ "tenant_uuid": tenant_uuid }))
            }
            AdapterError::TenantAlreadyExists(tenant_uuid) => {
                ApiError::from_code(ErrorCode::TenantAlreadyExists)
                    .with_details(json!({ "tenant_uuid": tenant_uuid }))
            }
            AdapterError::ProvisionFailed(message) => {
                ApiError::new(ErrorCode::ProvisionFailed, message)
            }
            AdapterError::Unexpected(_) => ApiError::from_code(ErrorCode::ProvisionFailed),
        }
    }
}

/// Capability set invoked only after authentication succeeds.
#[async_trait]
pub trait TenantAdapter: Send + Sync {
    /// Get adapter name for logging
    fn name(&self) -> &'static str;

    /// Provision a tenant. Returned fields are merged into the response body.
    async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<Map<String, Value>, AdapterError>;

    async fn warn_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError>;

    async fn suspend_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError>;

    async fn activate_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError>;
}

/// Resolve the configured adapter once at startup.
pub fn build_adapter(kind: AdapterKind) -> Arc<dyn TenantAdapter> {
    match kind {
        AdapterKind::Memory => Arc::new(InMemoryTenantAdapter::new()),
    }
}
