use std::sync::Arc;

use crate::hmac_auth::AuthState;
use crate::tenant::TenantAdapter;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// HMAC gate settings, credentials and nonce store
    pub auth: Arc<AuthState>,
    /// Tenant adapter, resolved once at startup
    pub adapter: Arc<dyn TenantAdapter>,
    /// Whether /internal/v1 routes are mounted
    pub internal_api_enabled: bool,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthState>,
        adapter: Arc<dyn TenantAdapter>,
        internal_api_enabled: bool,
    ) -> Self {
        Self {
            auth,
            adapter,
            internal_api_enabled,
        }
    }
}
