//! Router for the workflow API
//!
//! Every handler returns the workflow view after the operation. A failed
//! network step is not an HTTP error: the view comes back in the `error`
//! phase with the message to show.

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::read_image_field;
use crate::assistant::CalendarAssistant;
use crate::core::WorkflowError;
use crate::intake::{IntakeSource, NOT_AN_IMAGE_MESSAGE, receive_shared};
use crate::storage::take_shared_image;
use crate::workflow::{Workflow, WorkflowView};

type SharedState = Arc<RwLock<AppState>>;

/// Apply a synchronous operation for a signed in user
fn apply<F>(state: &SharedState, op: F) -> Result<Json<WorkflowView>, ApiError>
where
    F: FnOnce(&mut Workflow) -> Result<(), WorkflowError>,
{
    let mut state = state.write().unwrap();
    state.require_session()?;
    op(&mut state.workflow)?;
    Ok(Json(state.workflow.view()))
}

async fn get_workflow(State(state): State<SharedState>) -> Json<WorkflowView> {
    Json(state.read().unwrap().workflow.view())
}

async fn select_file(
    State(state): State<SharedState>,
    Query(params): Query<public::SelectFileQuery>,
    mut multipart: Multipart,
) -> Result<Json<WorkflowView>, ApiError> {
    // Don't read the upload for someone who can't use it
    state.read().unwrap().require_session()?;
    let image = read_image_field(&mut multipart, "file", "upload")
        .await?
        .ok_or_else(|| WorkflowError::validation(NOT_AN_IMAGE_MESSAGE))?;
    let source = params.source.unwrap_or(IntakeSource::FilePicker);
    apply(&state, |workflow| workflow.select(source, image))
}

async fn extract(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    // Lock only long enough to move into Processing. A second request
    // while this one is waiting on the backend gets a 409.
    let (attempt, image, assistant) = {
        let mut state = state.write().unwrap();
        state.require_session()?;
        let (attempt, image) = state.workflow.begin_extraction()?;
        (attempt, image, state.assistant.clone())
    };

    let outcome = assistant.extract(&image).await;

    // A sign-out while waiting makes this attempt stale and it is dropped
    let mut state = state.write().unwrap();
    state.workflow.complete_extraction(attempt, outcome)?;
    Ok(Json(state.workflow.view()))
}

async fn toggle_event(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, |workflow| workflow.toggle_event(index).map(|_| ()))
}

async fn toggle_all(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, Workflow::toggle_all)
}

async fn select_all(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, Workflow::select_all)
}

async fn select_none(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, Workflow::select_none)
}

async fn commit(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    let (attempt, events, calendar_id, assistant) = {
        let mut state = state.write().unwrap();
        state.require_session()?;
        let (attempt, events, calendar_id) = state.workflow.begin_commit()?;
        (attempt, events, calendar_id, state.assistant.clone())
    };

    let outcome = assistant.commit(&events, &calendar_id).await;

    let mut state = state.write().unwrap();
    state.workflow.complete_commit(attempt, outcome)?;
    Ok(Json(state.workflow.view()))
}

async fn retry(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, Workflow::retry)
}

async fn reset(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    apply(&state, Workflow::start_over)
}

/// Pick up the image left by the share sheet receiver. If nobody is
/// signed in yet, wait (bounded) for a session before selecting it.
async fn select_shared(State(state): State<SharedState>) -> Result<Json<WorkflowView>, ApiError> {
    let (db, sessions, timeout, interval) = {
        let state = state.read().unwrap();
        (
            state.db.clone(),
            state.sessions.clone(),
            state.config.auth_wait_timeout,
            state.config.auth_poll_interval,
        )
    };

    let Some(image) = take_shared_image(&db).await? else {
        return Err(ApiError::not_found("No shared image is waiting"));
    };

    match receive_shared(image, &sessions, timeout, interval).await {
        Ok((image, session)) => {
            tracing::debug!("Shared image accepted for {}", session.user_id);
            let mut state = state.write().unwrap();
            state.workflow.select(IntakeSource::ShareSheet, image)?;
            Ok(Json(state.workflow.view()))
        }
        Err(err @ WorkflowError::AuthRequired) => {
            // Busy with another step: leave it alone but still report the
            // missing sign-in
            if let Err(e) = state.write().unwrap().workflow.fail(&err) {
                tracing::debug!("Not recording the sign-in timeout: {}", e);
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Create the workflow router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_workflow))
        .route("/file", post(select_file))
        .route("/extract", post(extract))
        .route("/events/{index}/toggle", post(toggle_event))
        .route("/events/toggle-all", post(toggle_all))
        .route("/events/select-all", post(select_all))
        .route("/events/select-none", post(select_none))
        .route("/commit", post(commit))
        .route("/retry", post(retry))
        .route("/reset", post(reset))
        .route("/shared", post(select_shared))
}
