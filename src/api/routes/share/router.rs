//! Share sheet receiver
//!
//! The OS posts the shared file here. It is parked in the client store
//! and the browser is sent back to the app, which then claims it through
//! `POST /api/workflow/shared`.

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Multipart, State},
    response::Redirect,
    routing::post,
};

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::read_image_field;
use crate::storage::put_shared_image;

type SharedState = Arc<RwLock<AppState>>;

async fn share_target(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let Some(image) = read_image_field(&mut multipart, "image", "shared-image").await? else {
        tracing::warn!("Share target called without an image");
        return Ok(Redirect::to("/"));
    };

    let db = state.read().unwrap().db.clone();
    put_shared_image(&db, &image).await?;
    tracing::debug!("Stored shared image {}", image.filename);

    Ok(Redirect::to("/?share-target=true"))
}

/// Create the share target router
pub fn router() -> Router<SharedState> {
    Router::new().route("/share-target", post(share_target))
}
