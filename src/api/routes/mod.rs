//! API routes module

pub mod health;
pub mod install;
pub mod session;
pub mod share;
pub mod workflow;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Upload, extract, review and commit
        .nest("/workflow", workflow::router())
        // Sign in and sign out events
        .nest("/session", session::router())
        // iOS add-to-home-screen hint
        .nest("/install-prompt", install::router())
        // Backend health and resolved endpoints
        .nest("/health", health::router())
}
