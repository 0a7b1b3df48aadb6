#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use tenant_gate::config::HmacConfig;
use tenant_gate::gateway::{build_router, state::AppState};
use tenant_gate::hmac_auth::{AuthState, MemoryNonceStore, NonceStore, sign_request};
use tenant_gate::tenant::{InMemoryTenantAdapter, TenantAdapter};

pub const KEY_ID: &str = "svc-billing";
pub const SECRET: &str = "billing-shared-secret";
pub const OTHER_KEY_ID: &str = "svc-ops";
pub const OTHER_SECRET: &str = "ops-shared-secret";
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct TestApp {
    pub router: Router,
    pub adapter: Arc<InMemoryTenantAdapter>,
    pub nonce_store: Arc<MemoryNonceStore>,
}

pub fn hmac_config() -> HmacConfig {
    let mut config = HmacConfig::default();
    config.keys.insert(KEY_ID.to_string(), SECRET.to_string());
    config
        .keys
        .insert(OTHER_KEY_ID.to_string(), OTHER_SECRET.to_string());
    config
}

pub fn test_app() -> TestApp {
    test_app_with(hmac_config(), true)
}

pub fn test_app_with(config: HmacConfig, enabled: bool) -> TestApp {
    let nonce_store = Arc::new(MemoryNonceStore::new(config.nonce.prefix.clone()));
    let adapter = Arc::new(InMemoryTenantAdapter::new());
    let router = router_with(config, enabled, nonce_store.clone(), adapter.clone());
    TestApp {
        router,
        adapter,
        nonce_store,
    }
}

pub fn router_with(
    config: HmacConfig,
    enabled: bool,
    nonce_store: Arc<dyn NonceStore>,
    adapter: Arc<dyn TenantAdapter>,
) -> Router {
    let auth = AuthState::from_config(&config, nonce_store, MAX_BODY_BYTES).expect("auth state");
    build_router(Arc::new(AppState::new(Arc::new(auth), adapter, enabled)))
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn fresh_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Describes one signed call. Fields can be tweaked after signing to
/// simulate tampering.
pub struct SignedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Vec<u8>,
    pub key_id: String,
    pub secret: String,
    pub timestamp: String,
    pub nonce: Option<String>,
}

impl SignedCall {
    pub fn post(path: &str, body: &str) -> Self {
        Self {
            method: "POST",
            path: path.to_string(),
            body: body.as_bytes().to_vec(),
            key_id: KEY_ID.to_string(),
            secret: SECRET.to_string(),
            timestamp: now().to_string(),
            nonce: Some(fresh_nonce()),
        }
    }

    pub fn timestamp(mut self, timestamp: impl ToString) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn nonce(mut self, nonce: Option<&str>) -> Self {
        self.nonce = nonce.map(str::to_string);
        self
    }

    pub fn key(mut self, key_id: &str, secret: &str) -> Self {
        self.key_id = key_id.to_string();
        self.secret = secret.to_string();
        self
    }

    /// Signature over the current fields.
    pub fn signature(&self) -> String {
        sign_request(
            &self.key_id,
            self.secret.as_bytes(),
            self.method,
            &self.path,
            &self.body,
            &self.timestamp,
            self.nonce.as_deref(),
        )
        .signature
    }

    /// Build the HTTP request carrying `signature`.
    pub fn request_with_signature(&self, signature: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(self.method)
            .uri(self.path.as_str())
            .header("content-type", "application/json")
            .header("x-internal-key-id", self.key_id.as_str())
            .header("x-internal-timestamp", self.timestamp.as_str())
            .header("x-internal-signature", signature);
        if let Some(nonce) = &self.nonce {
            builder = builder.header("x-internal-nonce", nonce.as_str());
        }
        builder.body(Body::from(self.body.clone())).expect("request")
    }

    pub fn request(&self) -> Request<Body> {
        self.request_with_signature(&self.signature())
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}
