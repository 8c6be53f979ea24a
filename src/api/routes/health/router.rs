//! Router for the health API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

async fn health(State(state): State<SharedState>) -> Json<public::HealthResponse> {
    let (assistant, endpoints) = {
        let state = state.read().unwrap();
        (state.assistant.clone(), state.endpoints.clone())
    };
    let backend_healthy = assistant.health().await;
    Json(public::HealthResponse {
        backend_healthy,
        endpoints,
    })
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(health))
}
