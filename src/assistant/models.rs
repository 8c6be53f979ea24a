//! Wire types for the calendar assistant backend
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEvent {
    pub summary: String,
    // Kept as sent by the backend so commits round-trip unchanged
    pub start_datetime: String,
    pub end_datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Accepts RFC 3339 and the offset-less ISO form the extractor sometimes
/// emits. Offset-less times are read as UTC.
fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

impl ExtractedEvent {
    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(&self.start_datetime)
    }

    pub fn end(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(&self.end_datetime)
    }

    /// True when either time is unreadable or the event ends before it
    /// starts. Display only, never blocks a commit.
    pub fn has_time_anomaly(&self) -> bool {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => end < start,
            _ => true,
        }
    }

    /// e.g. "Sat, Jun 1, 9:00 AM - 10:00 AM", falling back to the raw
    /// strings when they don't parse
    pub fn time_range(&self) -> String {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => format!(
                "{} - {}",
                start.format("%a, %b %-d, %-I:%M %p"),
                end.format("%-I:%M %p")
            ),
            _ => format!("{} - {}", self.start_datetime, self.end_datetime),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub events: Vec<ExtractedEvent>,
    pub ocr_text: String,
    pub image_id: String,
}

#[derive(Serialize)]
pub struct CommitRequest<'a> {
    pub events: &'a [ExtractedEvent],
    pub calendar_id: &'a str,
}

/// Acknowledgement from the add-to-calendar route. Every field is
/// optional, a 2xx status is what signals success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub events_created: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

// What a bare 2xx means
impl Default for CommitResult {
    fn default() -> Self {
        Self {
            success: true,
            events_created: None,
            message: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start: &str, end: &str) -> ExtractedEvent {
        ExtractedEvent {
            summary: String::from("Dentist"),
            start_datetime: start.to_string(),
            end_datetime: end.to_string(),
            description: None,
            location: None,
        }
    }

    #[test]
    fn it_parses_rfc3339_and_naive_times() {
        let e = event("2024-06-01T09:00:00Z", "2024-06-01T10:00:00");
        assert!(e.start().is_some());
        assert!(e.end().is_some());
        assert!(!e.has_time_anomaly());
    }

    #[test]
    fn it_flags_events_that_end_before_they_start() {
        let e = event("2024-06-01T10:00:00Z", "2024-06-01T09:00:00Z");
        assert!(e.has_time_anomaly());
    }

    #[test]
    fn it_flags_unreadable_times() {
        let e = event("next tuesday", "2024-06-01T09:00:00Z");
        assert!(e.has_time_anomaly());
        assert_eq!(e.time_range(), "next tuesday - 2024-06-01T09:00:00Z");
    }

    #[test]
    fn it_formats_a_time_range() {
        let e = event("2024-06-01T09:00:00Z", "2024-06-01T10:30:00Z");
        assert_eq!(e.time_range(), "Sat, Jun 1, 9:00 AM - 10:30 AM");
    }

    #[test]
    fn it_deserializes_events_without_optional_fields() {
        let json = r#"{"summary":"Dentist","start_datetime":"2024-06-01T09:00:00Z","end_datetime":"2024-06-01T10:00:00Z"}"#;
        let e: ExtractedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.description, None);
        assert_eq!(e.location, None);
        // Optional fields stay off the wire when absent
        assert_eq!(serde_json::to_string(&e).unwrap(), json);
    }

    #[test]
    fn it_reads_a_sparse_commit_acknowledgement() {
        let ack: CommitResult = serde_json::from_str("{}").unwrap();
        assert!(ack.success);
        assert_eq!(ack.events_created, None);

        let ack: CommitResult =
            serde_json::from_str(r#"{"success":true,"events_created":2,"events":[],"message":"ok"}"#)
                .unwrap();
        assert_eq!(ack.events_created, Some(2));
        assert_eq!(ack.message.as_deref(), Some("ok"));
    }
}
