//! Note-service rendering of an extracted event.

use crate::domain::event::ExtractedEvent;

/// A note ready for publication: a title plus one text block holding the
/// event fields in a fixed order (date, time range, category, priority,
/// optional location, optional attendees, description, notes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub title: String,
    pub body: String,
}

impl NoteRecord {
    pub fn from_event(event: &ExtractedEvent) -> Self {
        let mut lines = vec![
            format!("**Date:** {}", event.date.format("%Y-%m-%d")),
            format!("**Time:** {}", event.time_range()),
            format!("**Category:** {}", event.category),
            format!("**Priority:** {}", event.priority),
        ];

        if !event.location.is_empty() {
            lines.push(format!("**Location:** {}", event.location));
        }
        if !event.attendees.is_empty() {
            lines.push(format!("**Attendees:** {}", event.attendees.join(", ")));
        }

        lines.extend([
            String::new(),
            "**Description:**".to_string(),
            event.description.clone(),
            String::new(),
            "**Additional Notes:**".to_string(),
            event.notes.clone(),
        ]);

        Self {
            title: event.title.clone(),
            body: lines.join("\n"),
        }
    }
}
