//! What renderers show and which controls they enable

use serde::Serialize;

use super::{FailedStep, Workflow, WorkflowState};
use crate::intake::IntakeSource;
use crate::review::{EventRow, success_message};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    Selected,
    Processing,
    Reviewing,
    Committing,
    Done,
    Error,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::Selected => "selected",
            WorkflowPhase::Processing => "processing",
            WorkflowPhase::Reviewing => "reviewing",
            WorkflowPhase::Committing => "committing",
            WorkflowPhase::Done => "done",
            WorkflowPhase::Error => "error",
        }
    }
}

/// Controls a renderer may enable. Everything is off while a network
/// step is in flight, which is what keeps submissions single-flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Affordances {
    pub select_file: bool,
    pub remove_file: bool,
    pub extract: bool,
    pub toggle_events: bool,
    pub commit: bool,
    pub retry: bool,
    pub start_over: bool,
    pub busy: bool,
}

impl Affordances {
    pub(super) fn for_workflow(workflow: &Workflow) -> Self {
        match workflow.state() {
            WorkflowState::Idle => Self {
                select_file: true,
                ..Self::default()
            },
            WorkflowState::Selected => Self {
                select_file: true,
                remove_file: true,
                extract: true,
                ..Self::default()
            },
            WorkflowState::Processing | WorkflowState::Committing { .. } => Self {
                busy: true,
                ..Self::default()
            },
            WorkflowState::Reviewing(review) => Self {
                select_file: true,
                toggle_events: true,
                commit: review.can_commit(),
                start_over: true,
                ..Self::default()
            },
            WorkflowState::Done { .. } => Self {
                select_file: true,
                start_over: true,
                ..Self::default()
            },
            WorkflowState::Error { .. } => Self {
                select_file: true,
                retry: true,
                start_over: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectedFileView {
    pub filename: String,
    pub media_type: String,
    pub size: u64,
    pub display_size: String,
    pub is_heic: bool,
    pub source: Option<IntakeSource>,
    pub preview: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub heading: String,
    pub select_all_label: String,
    pub all_selected: bool,
    pub selected_count: usize,
    pub commit_label: String,
    pub events: Vec<EventRow>,
    pub ocr_text: String,
    pub image_id: String,
}

/// Snapshot of the workflow shared by every renderer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    pub phase: WorkflowPhase,
    pub affordances: Affordances,
    pub file: Option<SelectedFileView>,
    pub review: Option<ReviewView>,
    pub message: Option<String>,
    pub failed_step: Option<FailedStep>,
    pub added: Option<usize>,
}

impl WorkflowView {
    pub(super) fn from_workflow(workflow: &Workflow) -> Self {
        let intake = workflow.intake();
        let file = intake.selected().map(|image| SelectedFileView {
            filename: image.filename.clone(),
            media_type: image.media_type.clone(),
            size: image.size,
            display_size: image.display_size(),
            is_heic: image.is_heic(),
            source: intake.source(),
            preview: intake.preview().map(str::to_string),
        });

        let review = workflow.review().map(|review| ReviewView {
            heading: review.heading(),
            select_all_label: review.select_all_label(),
            all_selected: review.selection().is_all_selected(),
            selected_count: review.selection().count(),
            commit_label: review.commit_label(),
            events: review.rows(),
            ocr_text: review.result().ocr_text.clone(),
            image_id: review.result().image_id.clone(),
        });

        let (message, failed_step, added) = match workflow.state() {
            WorkflowState::Processing => {
                (Some(String::from("Analyzing calendar image...")), None, None)
            }
            WorkflowState::Committing { .. } => (
                Some(String::from("Adding events to your calendar...")),
                None,
                None,
            ),
            WorkflowState::Done { added } => (Some(success_message(*added)), None, Some(*added)),
            WorkflowState::Error { message, step } => (Some(message.clone()), Some(*step), None),
            _ => (None, None, None),
        };

        Self {
            phase: workflow.phase(),
            affordances: workflow.affordances(),
            file,
            review,
            message,
            failed_step,
            added,
        }
    }
}
