//! Public API types

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::core::WorkflowError;

// Errors

/// Something the client asked for that isn't there
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct NotFound(pub String);

pub struct ApiError(anyhow::Error);

impl ApiError {
    pub fn not_found(message: &str) -> Self {
        Self(NotFound(message.to_string()).into())
    }

    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<WorkflowError>() {
            return match err {
                WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
                WorkflowError::AuthRequired => StatusCode::UNAUTHORIZED,
                WorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
                WorkflowError::Backend { .. } | WorkflowError::Transport(_) => {
                    StatusCode::BAD_GATEWAY
                }
            };
        }
        if self.0.downcast_ref::<NotFound>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        if self.0.downcast_ref::<MultipartError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::warn!("{} {}", status, self.0);
        }

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            format!("Something went wrong: {}", self.0)
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` or `Result<_, WorkflowError>` to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod health {
    pub use crate::api::routes::health::public::*;
}

pub mod install {
    pub use crate::api::routes::install::public::*;
}

pub mod workflow {
    pub use crate::api::routes::workflow::public::*;
}

pub mod session {
    pub use crate::api::routes::session::public::*;
}
