//! Router for the session API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::WorkflowError;
use crate::session::{Session, SessionProvider};

type SharedState = Arc<RwLock<AppState>>;

async fn get_session(State(state): State<SharedState>) -> Json<public::SessionResponse> {
    Json(state.read().unwrap().sessions.current().into())
}

async fn sign_in(
    State(state): State<SharedState>,
    Json(payload): Json<public::SignInRequest>,
) -> Result<Json<public::SessionResponse>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(WorkflowError::validation("A user id is required to sign in").into());
    }
    let session = Session {
        user_id: payload.user_id,
        email: payload.email,
        display_name: payload.display_name,
    };
    let state = state.read().unwrap();
    state.sessions.sign_in(session);
    Ok(Json(state.sessions.current().into()))
}

/// Sign out and throw away whatever the user was working on. A request
/// still waiting on the backend can no longer complete and gets a 409.
async fn sign_out(State(state): State<SharedState>) -> Json<public::SessionResponse> {
    let mut state = state.write().unwrap();
    state.sessions.sign_out();
    state.workflow.discard();
    Json(state.sessions.current().into())
}

/// Create the session router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(get_session).post(sign_in).delete(sign_out))
}
