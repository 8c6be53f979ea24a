//! Plain text rendering of the workflow view

use std::fmt::Write;

use crate::workflow::{WorkflowPhase, WorkflowView};

pub fn render(view: &WorkflowView) -> String {
    let mut out = String::new();

    if let Some(file) = &view.file {
        let _ = writeln!(
            out,
            "Selected: {} ({}, {})",
            file.filename, file.media_type, file.display_size
        );
        if file.is_heic {
            let _ = writeln!(out, "HEIC image, it will be converted during upload");
        }
    }

    if let Some(review) = &view.review {
        let _ = writeln!(out, "{}", review.heading);
        for row in &review.events {
            let check = if row.selected { "x" } else { " " };
            let _ = writeln!(out, "[{}] {}. {}", check, row.index + 1, row.summary);
            let _ = writeln!(out, "      {}", row.time_range);
            if row.time_anomaly {
                let _ = writeln!(out, "      (check the times, it ends before it starts)");
            }
            if let Some(location) = &row.location {
                let _ = writeln!(out, "      @ {}", location);
            }
            if let Some(description) = &row.description {
                let _ = writeln!(out, "      {}", description);
            }
        }
        let _ = writeln!(
            out,
            "{} of {} selected",
            review.selected_count,
            review.events.len()
        );
    }

    if let Some(message) = &view.message {
        match view.phase {
            WorkflowPhase::Error => {
                let _ = writeln!(out, "Error: {}", message);
            }
            _ => {
                let _ = writeln!(out, "{}", message);
            }
        }
    }

    out
}

/// Key help for whatever the current phase allows
pub fn prompt_help(view: &WorkflowView) -> String {
    let a = &view.affordances;
    let mut keys = Vec::new();
    if a.toggle_events {
        keys.push(String::from("<n> toggle"));
        if let Some(review) = &view.review {
            keys.push(format!("a {}", review.select_all_label.to_lowercase()));
        }
        keys.push(String::from("n select none"));
    }
    if a.commit {
        if let Some(review) = &view.review {
            keys.push(format!("c {}", review.commit_label.to_lowercase()));
        }
    }
    if a.retry {
        keys.push(String::from("r retry"));
    }
    keys.push(String::from("q quit"));
    keys.join(", ")
}
