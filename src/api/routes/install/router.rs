//! Router for the install prompt API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use http::{HeaderMap, header};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::storage::{dismiss_install_prompt, install_prompt_dismissed};

type SharedState = Arc<RwLock<AppState>>;

fn is_ios(user_agent: &str) -> bool {
    ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device))
}

/// The add-to-home-screen hint is only for iOS browsers that aren't
/// already running the installed app and haven't been told no.
fn should_show(user_agent: &str, standalone: bool, dismissed: bool) -> bool {
    is_ios(user_agent) && !standalone && !dismissed
}

async fn get_install_prompt(
    State(state): State<SharedState>,
    Query(params): Query<public::InstallPromptQuery>,
    headers: HeaderMap,
) -> Result<Json<public::InstallPromptResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let dismissed = install_prompt_dismissed(&db).await?;
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    Ok(Json(public::InstallPromptResponse {
        show: should_show(user_agent, params.standalone, dismissed),
        dismissed,
    }))
}

async fn dismiss(
    State(state): State<SharedState>,
) -> Result<Json<public::InstallPromptResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();
    dismiss_install_prompt(&db).await?;
    Ok(Json(public::InstallPromptResponse {
        show: false,
        dismissed: true,
    }))
}

/// Create the install prompt router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_install_prompt))
        .route("/dismiss", post(dismiss))
}
