//! Public types for the workflow API
use serde::Deserialize;

pub use crate::workflow::{Affordances, WorkflowPhase, WorkflowView};
use crate::intake::IntakeSource;

/// Query parameters for selecting a file
#[derive(Debug, Default, Deserialize)]
pub struct SelectFileQuery {
    /// Where the file came from, defaults to the file picker
    pub source: Option<IntakeSource>,
}
