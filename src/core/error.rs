use thiserror::Error;

/// Message shown when a share-sheet image arrives and nobody signs in.
pub const AUTH_REQUIRED_MESSAGE: &str = "Please sign in to upload calendar images.";

/// Message shown for any request that never got a response.
pub const TRANSPORT_MESSAGE: &str = "Could not reach the calendar assistant. Please try again.";

/// Every failure the workflow can surface to a user. The `Display`
/// output is the human-readable message shown verbatim by renderers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", TRANSPORT_MESSAGE)]
    Transport(String),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("{}", AUTH_REQUIRED_MESSAGE)]
    AuthRequired,
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl WorkflowError {
    pub fn validation(message: &str) -> Self {
        WorkflowError::Validation(message.to_string())
    }

    /// Transport and backend failures can be retried by the user
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkflowError::Transport(_) | WorkflowError::Backend { .. }
        )
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Request to calendar assistant failed: {}", err);
        WorkflowError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_backend_detail_verbatim() {
        let err = WorkflowError::Backend {
            status: 500,
            message: String::from("OCR engine timeout"),
        };
        assert_eq!(err.to_string(), "OCR engine timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn it_hides_transport_detail_from_the_message() {
        let err = WorkflowError::Transport(String::from("connection refused"));
        assert_eq!(err.to_string(), TRANSPORT_MESSAGE);
    }

    #[test]
    fn it_describes_invalid_transitions() {
        let err = WorkflowError::InvalidTransition {
            action: "extract",
            state: "processing",
        };
        assert_eq!(err.to_string(), "Cannot extract while processing");
        assert!(!err.is_retryable());
        assert!(!WorkflowError::AuthRequired.is_retryable());
    }
}
