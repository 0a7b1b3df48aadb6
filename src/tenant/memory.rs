//! In-memory tenant adapter.
//!
//! Keeps tenant state in a DashMap for local runs and integration tests.
//! Lifecycle transitions are not restricted here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::adapter::{AdapterError, TenantAdapter};
use super::dto::{CreateTenantRequest, TenantActionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Warned,
    Suspended,
}

#[derive(Debug, Clone)]
pub struct TenantRecord {
    pub tenant_name: Option<String>,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Reason given on the last lifecycle action
    pub last_reason: Option<String>,
}

#[derive(Default)]
pub struct InMemoryTenantAdapter {
    tenants: DashMap<String, TenantRecord>,
}

impl InMemoryTenantAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tenant_uuid: &str) -> Option<TenantRecord> {
        self.tenants.get(tenant_uuid).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    fn transition(
        &self,
        tenant_uuid: &str,
        status: TenantStatus,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError> {
        let mut record = self
            .tenants
            .get_mut(tenant_uuid)
            .ok_or_else(|| AdapterError::TenantNotFound(tenant_uuid.to_string()))?;
        record.status = status;
        record.updated_at = Utc::now();
        record.last_reason = request.reason;
        tracing::info!(tenant_uuid, status = ?status, "tenant status changed");
        Ok(())
    }
}

#[async_trait]
impl TenantAdapter for InMemoryTenantAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<Map<String, Value>, AdapterError> {
        let now = Utc::now();
        match self.tenants.entry(request.tenant_uuid.clone()) {
            Entry::Occupied(_) => Err(AdapterError::TenantAlreadyExists(request.tenant_uuid)),
            Entry::Vacant(entry) => {
                entry.insert(TenantRecord {
                    tenant_name: request.tenant_name.clone(),
                    status: TenantStatus::Active,
                    created_at: now,
                    updated_at: now,
                    last_reason: None,
                });
                tracing::info!(tenant_uuid = %request.tenant_uuid, "tenant created");

                let mut fields = Map::new();
                fields.insert("tenant_uuid".into(), json!(request.tenant_uuid));
                fields.insert("tenant_status".into(), json!(TenantStatus::Active));
                fields.insert("created_at".into(), json!(now.to_rfc3339()));
                Ok(fields)
            }
        }
    }

    async fn warn_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError> {
        self.transition(tenant_uuid, TenantStatus::Warned, request)
    }

    async fn suspend_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError> {
        self.transition(tenant_uuid, TenantStatus::Suspended, request)
    }

    async fn activate_tenant(
        &self,
        tenant_uuid: &str,
        request: TenantActionRequest,
    ) -> Result<(), AdapterError> {
        self.transition(tenant_uuid, TenantStatus::Active, request)
    }
}
