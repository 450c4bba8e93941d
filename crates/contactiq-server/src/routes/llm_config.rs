//! Provider configuration routes — masked view and update.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use contactiq_llm::ProviderConfigUpdate;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm-config", get(get_config))
        .route("/llm-config", put(update_config))
}

/// GET /api/llm-config — masked config view, keys never leave the process.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.pipeline.client().config_response())
}

/// PUT /api/llm-config — merge an update and persist it.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProviderConfigUpdate>,
) -> impl IntoResponse {
    match state.pipeline.client().update_config(&update) {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Failed to save config: {}", e) })),
        ),
    }
}
