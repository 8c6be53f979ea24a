use tokio_rusqlite::Connection;

use crate::assistant::AssistantClient;
use crate::core::{AppConfig, WorkflowError};
use crate::origin::EndpointSet;
use crate::session::{Session, SessionProvider, SessionStore};
use crate::workflow::Workflow;

pub struct AppState {
    pub workflow: Workflow,
    pub sessions: SessionStore,
    pub assistant: AssistantClient,
    // Resolved once at startup and never re-resolved
    pub endpoints: EndpointSet,
    pub db: Connection,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, endpoints: EndpointSet) -> Self {
        Self {
            workflow: Workflow::new(&config.calendar_id),
            sessions: SessionStore::new(),
            assistant: AssistantClient::from_endpoints(&endpoints),
            endpoints,
            db,
            config,
        }
    }

    pub fn require_session(&self) -> Result<Session, WorkflowError> {
        self.sessions.current().ok_or(WorkflowError::AuthRequired)
    }
}
