//! Tenant lifecycle collaborator.
//!
//! The gate never applies tenant business rules itself; it hands
//! authenticated requests to a [`TenantAdapter`] chosen at startup.

pub mod adapter;
pub mod dto;
pub mod memory;

pub use adapter::{AdapterError, TenantAdapter, build_adapter};
pub use dto::{CreateTenantRequest, TenantActionRequest, parse_payload};
pub use memory::{InMemoryTenantAdapter, TenantStatus};
