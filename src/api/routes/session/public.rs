//! Public types for the session API
use serde::{Deserialize, Serialize};

pub use crate::session::Session;

/// Sign in event forwarded by the identity provider
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub signed_in: bool,
    pub session: Option<Session>,
}

impl From<Option<Session>> for SessionResponse {
    fn from(session: Option<Session>) -> Self {
        Self {
            signed_in: session.is_some(),
            session,
        }
    }
}
