//! The upload, extract, review, commit state machine
//!
//! Transitions are synchronous. The two network steps are split into a
//! `begin_*` call that moves into the in-flight state and hands back what
//! to send, and a `complete_*` call that takes the outcome. A renderer
//! that owns the workflow outright can use `run_extraction` and
//! `run_commit` instead; a shared one (the HTTP server) releases its lock
//! between the two halves. Either way a second attempt while a step is in
//! flight is an `InvalidTransition`.
//!
//! Each `begin_*` hands out an `Attempt`. Its `complete_*` must present the
//! same one, so an outcome that arrives after the workflow was discarded
//! (e.g. on sign-out) or restarted is dropped instead of landing in
//! somebody else's workflow.

mod view;

pub use view::{Affordances, WorkflowPhase, WorkflowView};

use crate::assistant::{CalendarAssistant, CommitResult, ExtractedEvent, ExtractionResult};
use crate::core::WorkflowError;
use crate::intake::{IntakeController, IntakeSource, SelectedImage};
use crate::review::ReviewState;

pub const NOTHING_SELECTED_MESSAGE: &str = "Please select at least one event to add";

/// Which network step put the workflow into `Error`
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStep {
    Intake,
    Extraction,
    Commit,
}

/// Ticket for one network step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Selected,
    Processing,
    Reviewing(ReviewState),
    Committing { submitted: usize },
    Done { added: usize },
    Error { message: String, step: FailedStep },
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Idle => WorkflowPhase::Idle,
            WorkflowState::Selected => WorkflowPhase::Selected,
            WorkflowState::Processing => WorkflowPhase::Processing,
            WorkflowState::Reviewing(_) => WorkflowPhase::Reviewing,
            WorkflowState::Committing { .. } => WorkflowPhase::Committing,
            WorkflowState::Done { .. } => WorkflowPhase::Done,
            WorkflowState::Error { .. } => WorkflowPhase::Error,
        }
    }

    fn is_in_flight(&self) -> bool {
        matches!(
            self,
            WorkflowState::Processing | WorkflowState::Committing { .. }
        )
    }
}

#[derive(Debug)]
pub struct Workflow {
    state: WorkflowState,
    intake: IntakeController,
    calendar_id: String,
    generation: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new("primary")
    }
}

impl Workflow {
    pub fn new(calendar_id: &str) -> Self {
        Self {
            state: WorkflowState::Idle,
            intake: IntakeController::new(),
            calendar_id: calendar_id.to_string(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    pub fn intake(&self) -> &IntakeController {
        &self.intake
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn review(&self) -> Option<&ReviewState> {
        match &self.state {
            WorkflowState::Reviewing(review) => Some(review),
            _ => None,
        }
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::debug!("Workflow {:?} -> {:?}", self.state.phase(), next.phase());
        self.state = next;
    }

    fn next_attempt(&mut self) -> Attempt {
        self.generation += 1;
        Attempt(self.generation)
    }

    fn is_current(&self, attempt: Attempt) -> bool {
        attempt == Attempt(self.generation)
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            action,
            state: self.state.phase().as_str(),
        }
    }

    /// Take a new image from any intake source. Starting over this way
    /// discards any extraction under review. A rejected image leaves the
    /// workflow exactly as it was.
    pub fn select(
        &mut self,
        source: IntakeSource,
        image: SelectedImage,
    ) -> Result<(), WorkflowError> {
        if self.state.is_in_flight() {
            return Err(self.invalid("select an image"));
        }
        self.intake.accept(source, image)?;
        self.transition(WorkflowState::Selected);
        Ok(())
    }

    /// Move to `Processing` and return the image to upload
    pub fn begin_extraction(&mut self) -> Result<(Attempt, SelectedImage), WorkflowError> {
        if self.state != WorkflowState::Selected {
            return Err(self.invalid("extract events"));
        }
        let image = self
            .intake
            .selected()
            .cloned()
            .ok_or_else(|| self.invalid("extract events"))?;
        let attempt = self.next_attempt();
        self.transition(WorkflowState::Processing);
        Ok((attempt, image))
    }

    pub fn complete_extraction(
        &mut self,
        attempt: Attempt,
        outcome: Result<ExtractionResult, WorkflowError>,
    ) -> Result<(), WorkflowError> {
        if !self.is_current(attempt) {
            tracing::warn!("Dropping extraction result of a superseded attempt");
            return Err(self.invalid("finish a superseded extraction"));
        }
        if self.state != WorkflowState::Processing {
            return Err(self.invalid("finish extracting"));
        }
        match outcome {
            Ok(result) => {
                // The upload is done with, release the image
                self.intake.reset();
                self.transition(WorkflowState::Reviewing(ReviewState::new(result)));
            }
            Err(err) => {
                // Keep the image so a retry can go straight back to Selected
                self.transition(WorkflowState::Error {
                    message: err.to_string(),
                    step: FailedStep::Extraction,
                });
            }
        }
        Ok(())
    }

    fn review_mut(&mut self, action: &'static str) -> Result<&mut ReviewState, WorkflowError> {
        let state = self.state.phase().as_str();
        match &mut self.state {
            WorkflowState::Reviewing(review) => Ok(review),
            _ => Err(WorkflowError::InvalidTransition { action, state }),
        }
    }

    /// Flip one event. Out-of-range indices are ignored.
    pub fn toggle_event(&mut self, index: usize) -> Result<bool, WorkflowError> {
        Ok(self.review_mut("toggle an event")?.selection_mut().toggle(index))
    }

    pub fn toggle_all(&mut self) -> Result<(), WorkflowError> {
        self.review_mut("toggle all events")?
            .selection_mut()
            .toggle_all();
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<(), WorkflowError> {
        self.review_mut("select all events")?
            .selection_mut()
            .select_all();
        Ok(())
    }

    pub fn select_none(&mut self) -> Result<(), WorkflowError> {
        self.review_mut("clear the selection")?
            .selection_mut()
            .select_none();
        Ok(())
    }

    /// Move to `Committing` and return the checked events with the
    /// target calendar. With nothing checked this fails and the review
    /// stays as it is.
    pub fn begin_commit(
        &mut self,
    ) -> Result<(Attempt, Vec<ExtractedEvent>, String), WorkflowError> {
        let review = self.review_mut("add events")?;
        if !review.can_commit() {
            return Err(WorkflowError::validation(NOTHING_SELECTED_MESSAGE));
        }
        let events = review.selected_events();
        let attempt = self.next_attempt();
        self.transition(WorkflowState::Committing {
            submitted: events.len(),
        });
        Ok((attempt, events, self.calendar_id.clone()))
    }

    pub fn complete_commit(
        &mut self,
        attempt: Attempt,
        outcome: Result<CommitResult, WorkflowError>,
    ) -> Result<(), WorkflowError> {
        if !self.is_current(attempt) {
            tracing::warn!("Dropping commit result of a superseded attempt");
            return Err(self.invalid("finish a superseded commit"));
        }
        let WorkflowState::Committing { submitted } = self.state else {
            return Err(self.invalid("finish adding events"));
        };
        match outcome {
            Ok(ack) => {
                let added = ack.events_created.unwrap_or(submitted);
                self.transition(WorkflowState::Done { added });
            }
            Err(err) => {
                self.transition(WorkflowState::Error {
                    message: err.to_string(),
                    step: FailedStep::Commit,
                });
            }
        }
        Ok(())
    }

    /// Enter `Error` for a failure that happened outside the two network
    /// steps, e.g. a shared image that never saw a sign-in.
    pub fn fail(&mut self, err: &WorkflowError) -> Result<(), WorkflowError> {
        if self.state.is_in_flight() {
            return Err(self.invalid("report an error"));
        }
        self.transition(WorkflowState::Error {
            message: err.to_string(),
            step: FailedStep::Intake,
        });
        Ok(())
    }

    /// Leave `Error`: back to `Selected` when the image is still held
    /// (extraction failed), otherwise `Idle`.
    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.state, WorkflowState::Error { .. }) {
            return Err(self.invalid("retry"));
        }
        if self.intake.selected().is_some() {
            self.transition(WorkflowState::Selected);
        } else {
            self.intake.reset();
            self.transition(WorkflowState::Idle);
        }
        Ok(())
    }

    /// Drop everything and return to `Idle`
    pub fn start_over(&mut self) -> Result<(), WorkflowError> {
        if self.state.is_in_flight() {
            return Err(self.invalid("start over"));
        }
        self.intake.reset();
        self.transition(WorkflowState::Idle);
        Ok(())
    }

    /// Throw everything away from any state, including mid-step. Whatever
    /// is in flight can no longer complete.
    pub fn discard(&mut self) {
        self.generation += 1;
        self.intake.reset();
        self.transition(WorkflowState::Idle);
    }

    /// Upload the selected image and wait for the result
    pub async fn run_extraction<A>(&mut self, assistant: &A) -> Result<(), WorkflowError>
    where
        A: CalendarAssistant + ?Sized,
    {
        let (attempt, image) = self.begin_extraction()?;
        let outcome = assistant.extract(&image).await;
        self.complete_extraction(attempt, outcome)
    }

    /// Submit the checked events and wait for the acknowledgement
    pub async fn run_commit<A>(&mut self, assistant: &A) -> Result<(), WorkflowError>
    where
        A: CalendarAssistant + ?Sized,
    {
        let (attempt, events, calendar_id) = self.begin_commit()?;
        let outcome = assistant.commit(&events, &calendar_id).await;
        self.complete_commit(attempt, outcome)
    }

    pub fn affordances(&self) -> Affordances {
        Affordances::for_workflow(self)
    }

    pub fn view(&self) -> WorkflowView {
        WorkflowView::from_workflow(self)
    }
}
