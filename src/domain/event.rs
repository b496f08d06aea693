//! The canonical structured event extracted from a voice note.
//!
//! An `ExtractedEvent` is constructed exactly once per voice note, either
//! from the language model's response or from the deterministic fallback,
//! and is immutable afterwards. Both publishers consume it independently.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder title used when the model response cannot be parsed.
pub const FALLBACK_TITLE: &str = "Voice Note Event";

/// Placeholder notes line attached to fallback records.
pub const FALLBACK_NOTES: &str = "Analyzed from voice note";

/// Event urgency as stated (or implied) in the voice note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Map a model-supplied string onto the enum. Anything unrecognized
    /// degrades to `Medium` rather than failing the record.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Kind of event described by the voice note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meeting,
    Appointment,
    Reminder,
    Task,
    #[default]
    Other,
}

impl Category {
    /// Map a model-supplied string onto the enum. Anything unrecognized
    /// degrades to `Other`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "meeting" => Self::Meeting,
            "appointment" => Self::Appointment,
            "reminder" => Self::Reminder,
            "task" => Self::Task,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Meeting => "meeting",
            Self::Appointment => "appointment",
            Self::Reminder => "reminder",
            Self::Task => "task",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Structured event record produced by the extractor.
///
/// `date` is always the reference date the extraction ran with, never a
/// value taken from the model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub priority: Priority,
    pub category: Category,
    pub attendees: Vec<String>,
    pub notes: String,
}

impl ExtractedEvent {
    /// Deterministic record used whenever the model output cannot be
    /// parsed: the transcript itself becomes the description.
    pub fn fallback(transcript: &str, reference_date: NaiveDate) -> Self {
        let (start_time, end_time) = default_time_pair();
        Self {
            title: FALLBACK_TITLE.to_string(),
            description: transcript.to_string(),
            date: reference_date,
            start_time,
            end_time,
            location: String::new(),
            priority: Priority::Medium,
            category: Category::Other,
            attendees: Vec::new(),
            notes: FALLBACK_NOTES.to_string(),
        }
    }

    /// `HH:MM - HH:MM` rendering of the event window.
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Default start/end pair applied when no valid time survives parsing.
pub fn default_time_pair() -> (NaiveTime, NaiveTime) {
    // 09:00 and 10:00 are always valid
    let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
    let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default();
    (start, end)
}

/// Parse a model-supplied `HH:MM` string. Hours outside 0-23 or minutes
/// outside 0-59 are rejected.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Apply the time policy to the model's raw `start_time`/`end_time`:
///
/// - invalid or missing start discards both and yields the default pair
/// - invalid or missing end with a valid start is start + 1 hour (wrapping)
pub fn normalize_times(start: Option<&str>, end: Option<&str>) -> (NaiveTime, NaiveTime) {
    let Some(start) = start.and_then(parse_hhmm) else {
        return default_time_pair();
    };
    let end = end
        .and_then(parse_hhmm)
        .unwrap_or_else(|| start.overflowing_add_signed(Duration::hours(1)).0);
    (start, end)
}
