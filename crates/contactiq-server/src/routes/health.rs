//! Health and capability reporting.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /api/health — service capabilities and queue depth.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let client = state.pipeline.client();
    Json(serde_json::json!({
        "status": "ok",
        "ocrAvailable": state.pipeline.ocr_available(),
        "llmAvailable": client.has_provider(),
        "providers": client.configured_providers(),
        "defaultProvider": client.active_provider(),
        "queueSize": state.queue_size(),
    }))
}
