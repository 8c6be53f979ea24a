//! Signed-in session tracking
//!
//! Authentication itself belongs to the identity provider. This module
//! only answers "is somebody signed in right now" and provides the one
//! bounded wait used when a shared image arrives before sign-in.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::WorkflowError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

pub trait SessionProvider: Send + Sync {
    fn current(&self) -> Option<Session>;
}

/// In-memory session holder updated by sign-in and sign-out events
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, session: Session) {
        tracing::debug!("Signed in as {}", session.user_id);
        *self.inner.write().expect("Session lock poisoned") = Some(session);
    }

    pub fn sign_out(&self) {
        tracing::debug!("Signed out");
        *self.inner.write().expect("Session lock poisoned") = None;
    }
}

impl SessionProvider for SessionStore {
    fn current(&self) -> Option<Session> {
        self.inner.read().expect("Session lock poisoned").clone()
    }
}

/// Wait until `provider` has a session, checking every `interval`.
///
/// Resolves with the session or, once `timeout` elapses,
/// `WorkflowError::AuthRequired`. Dropping the future cancels the wait.
pub async fn wait_for_session<P>(
    provider: &P,
    timeout: Duration,
    interval: Duration,
) -> Result<Session, WorkflowError>
where
    P: SessionProvider + ?Sized,
{
    let poll = async {
        let mut ticker = tokio::time::interval(interval);
        loop {
            // First tick completes immediately
            ticker.tick().await;
            if let Some(session) = provider.current() {
                return session;
            }
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(session) => Ok(session),
        Err(_) => {
            tracing::warn!("No session after {:?}, giving up", timeout);
            Err(WorkflowError::AuthRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: String::from("user-1"),
            email: Some(String::from("parent@example.com")),
            display_name: Some(String::from("Parent")),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_resolves_immediately_when_signed_in() {
        let store = SessionStore::new();
        store.sign_in(session());

        let start = tokio::time::Instant::now();
        let actual = wait_for_session(
            &store,
            Duration::from_secs(10),
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(actual, Ok(session()));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn it_resolves_when_sign_in_happens_during_the_wait() {
        let store = SessionStore::new();
        let signer = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            signer.sign_in(session());
        });

        let actual = wait_for_session(
            &store,
            Duration::from_secs(10),
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(actual, Ok(session()));
    }

    #[tokio::test(start_paused = true)]
    async fn it_times_out_after_the_ceiling() {
        let store = SessionStore::new();

        let start = tokio::time::Instant::now();
        let actual = wait_for_session(
            &store,
            Duration::from_secs(10),
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(actual, Err(WorkflowError::AuthRequired));
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[test]
    fn it_signs_out() {
        let store = SessionStore::new();
        store.sign_in(session());
        assert!(store.current().is_some());
        store.sign_out();
        assert!(store.current().is_none());
    }
}
