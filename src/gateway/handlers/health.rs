//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Server time in Unix seconds, handy for diagnosing clock skew
    pub timestamp: i64,
    pub internal_api_enabled: bool,
    pub adapter: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        timestamp: chrono::Utc::now().timestamp(),
        internal_api_enabled: state.internal_api_enabled,
        adapter: state.adapter.name(),
    })
}
