mod client;
pub mod models;

pub use client::{AssistantClient, CalendarAssistant, COMMIT_FAILED_MESSAGE, EXTRACT_FAILED_MESSAGE};
pub use models::*;
