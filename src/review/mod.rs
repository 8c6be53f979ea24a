//! Which extracted events the user has checked for commit

use std::collections::BTreeSet;

use serde::Serialize;

use crate::assistant::{ExtractedEvent, ExtractionResult};

/// Indices into the current event list. Always valid for `len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<usize>,
    len: usize,
}

impl SelectionSet {
    pub fn all(len: usize) -> Self {
        Self {
            selected: (0..len).collect(),
            len,
        }
    }

    pub fn empty(len: usize) -> Self {
        Self {
            selected: BTreeSet::new(),
            len,
        }
    }

    /// Flip one index. Returns false and changes nothing when `index`
    /// is out of range.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        true
    }

    /// Clear a fully selected set, otherwise select everything
    pub fn toggle_all(&mut self) {
        if self.is_all_selected() {
            self.select_none();
        } else {
            self.select_all();
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.len).collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_all_selected(&self) -> bool {
        self.selected.len() == self.len
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Number of events the indices refer to
    pub fn total(&self) -> usize {
        self.len
    }

    /// True when nothing is checked
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// An extraction result under review. Built fresh for every result so
/// no selection survives a replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewState {
    result: ExtractionResult,
    selection: SelectionSet,
}

impl ReviewState {
    /// Everything starts selected
    pub fn new(result: ExtractionResult) -> Self {
        let selection = SelectionSet::all(result.events.len());
        Self { result, selection }
    }

    pub fn result(&self) -> &ExtractionResult {
        &self.result
    }

    pub fn events(&self) -> &[ExtractedEvent] {
        &self.result.events
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Checked events in list order
    pub fn selected_events(&self) -> Vec<ExtractedEvent> {
        self.selection
            .indices()
            .map(|i| self.result.events[i].clone())
            .collect()
    }

    pub fn can_commit(&self) -> bool {
        !self.selection.is_empty()
    }

    /// "Found 3 Events"
    pub fn heading(&self) -> String {
        let n = self.result.events.len();
        format!("Found {} Event{}", n, plural(n))
    }

    /// "Select All (2/3 selected)"
    pub fn select_all_label(&self) -> String {
        format!(
            "Select All ({}/{} selected)",
            self.selection.count(),
            self.selection.total()
        )
    }

    /// "Add 2 Events to Calendar"
    pub fn commit_label(&self) -> String {
        let n = self.selection.count();
        format!("Add {} Event{} to Calendar", n, plural(n))
    }

    pub fn rows(&self) -> Vec<EventRow> {
        self.result
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| EventRow {
                index,
                selected: self.selection.is_selected(index),
                summary: event.summary.clone(),
                time_range: event.time_range(),
                description: event.description.clone().filter(|d| !d.is_empty()),
                location: event.location.clone().filter(|l| !l.is_empty()),
                time_anomaly: event.has_time_anomaly(),
            })
            .collect()
    }
}

/// One event as a renderer shows it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventRow {
    pub index: usize,
    pub selected: bool,
    pub summary: String,
    pub time_range: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub time_anomaly: bool,
}

pub fn success_message(added: usize) -> String {
    format!(
        "Successfully added {} event{} to your calendar!",
        added,
        plural(added)
    )
}
