//! HTTP handlers
//!
//! - `health`: liveness probe (unauthenticated)
//! - `tenants`: tenant lifecycle endpoints behind the HMAC gate

pub mod health;
pub mod tenants;

pub use health::health_check;
pub use tenants::{TenantAction, create_tenant, not_found, tenant_action};
