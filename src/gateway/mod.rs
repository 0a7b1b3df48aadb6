pub mod handlers;
pub mod state;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::hmac_auth::{AuthState, MemoryNonceStore, hmac_auth_middleware, spawn_purge_task};
use crate::tenant::build_adapter;
use state::AppState;

/// Build the HTTP router.
///
/// `/health` is always mounted. The internal tenant routes are mounted only
/// when enabled, each behind the HMAC gate.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new().route("/health", get(handlers::health_check));

    if state.internal_api_enabled {
        let internal_routes = Router::new()
            .route("/tenants", post(handlers::create_tenant))
            .route("/tenants/{target}", post(handlers::tenant_action))
            .route_layer(from_fn_with_state(
                state.auth.clone(),
                hmac_auth_middleware,
            ));
        app = app.nest("/internal/v1", internal_routes);
    }

    app.fallback(handlers::not_found).with_state(state)
}

/// Start HTTP gateway server
pub async fn run_server(config: &AppConfig, port_override: Option<u16>) -> anyhow::Result<()> {
    let api = &config.internal_api;
    let nonce = &api.hmac.nonce;

    let nonce_store = Arc::new(MemoryNonceStore::new(nonce.prefix.clone()));
    let purge_task = spawn_purge_task(
        nonce_store.clone(),
        Duration::from_secs(nonce.purge_interval_seconds),
    );

    let auth = AuthState::from_config(&api.hmac, nonce_store, config.gateway.max_body_bytes)
        .context("Failed to build HMAC auth state")?;
    let adapter = build_adapter(api.adapter);
    tracing::info!(
        adapter = adapter.name(),
        keys = auth.credentials.len(),
        nonce_enabled = nonce.enabled,
        skew_seconds = api.hmac.allowed_clock_skew_seconds,
        "internal API configured"
    );

    let state = Arc::new(AppState::new(Arc::new(auth), adapter, api.enabled));
    let app = build_router(state);

    let port = port_override.unwrap_or(config.gateway.port);
    let addr = format!("{}:{}", config.gateway.host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port may already be in use)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    if api.enabled {
        tracing::info!("Internal API: /internal/v1/tenants (HMAC required)");
    } else {
        tracing::warn!("Internal API disabled, /internal/v1 routes not mounted");
    }

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    purge_task.abort();
    tracing::info!("Gateway stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
