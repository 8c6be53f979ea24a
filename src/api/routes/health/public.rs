//! Public types for the health API
use serde::Serialize;

pub use crate::origin::EndpointSet;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Whether the calendar assistant answered its health check
    pub backend_healthy: bool,
    pub endpoints: EndpointSet,
}
