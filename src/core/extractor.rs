//! Event extraction from transcript text.
//!
//! The extractor sends the transcript plus a fixed instruction prompt to
//! a chat model and defensively parses the response. Malformed output is
//! never an error: it degrades to a deterministic fallback record built
//! from the raw transcript, so every voice note yields a usable event.
//! Only a failure of the model call itself propagates.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::adapters::{AdapterError, ChatModel};
use crate::domain::event::{self, Category, ExtractedEvent, Priority};

/// How an extraction result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The model response contained a parseable JSON object
    Parsed,
    /// The response was unusable and the deterministic fallback applied
    Fallback,
}

/// An extracted event plus its provenance
#[derive(Debug, Clone)]
pub struct Extraction {
    pub event: ExtractedEvent,
    pub source: ExtractionSource,
}

/// Turns transcripts into structured events via a chat model.
pub struct EventExtractor {
    model: Arc<dyn ChatModel>,
}

impl EventExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Extract a structured event from a transcript.
    ///
    /// The returned event's `date` is always `reference_date`, regardless
    /// of anything the model asserts. Errors only when the model call
    /// itself fails; response content problems resolve to a fallback
    /// record.
    pub async fn extract(
        &self,
        transcript: &str,
        reference_date: NaiveDate,
    ) -> Result<Extraction, AdapterError> {
        let system = build_system_prompt(reference_date);
        let user = format!(
            "Please analyze this voice note and extract event information:\n\n{transcript}"
        );

        let response = self.model.complete(&system, &user).await?;
        let extraction = parse_model_response(&response, transcript, reference_date);

        match extraction.source {
            ExtractionSource::Parsed => {
                info!(title = %extraction.event.title, "event extracted")
            }
            ExtractionSource::Fallback => {
                warn!("model response was not parseable, using fallback record")
            }
        }

        Ok(extraction)
    }
}

/// Build the fixed instruction prompt for a given reference date.
///
/// The date is embedded in the prompt itself and the model told never to
/// vary it; the caller overwrites the field afterwards regardless.
pub fn build_system_prompt(reference_date: NaiveDate) -> String {
    let today = reference_date.format("%Y-%m-%d");
    format!(
        r#"You are an AI assistant that analyzes voice notes to extract calendar event information.

From the provided text, extract the following information and return it as JSON:
{{
    "title": "Brief, descriptive title for the event based on the content",
    "description": "Detailed description including all relevant information from the voice note",
    "date": "{today}",
    "start_time": "HH:MM format (extract time from voice note - this is REQUIRED)",
    "end_time": "HH:MM format (extract from voice note, if not mentioned add 1 hour to start_time)",
    "location": "Location if mentioned, otherwise empty string",
    "priority": "high/medium/low based on urgency indicators in the voice note",
    "category": "meeting/appointment/reminder/task/other",
    "attendees": ["list of email addresses if mentioned in the voice note"],
    "notes": "Any additional context or details from the voice note"
}}

CRITICAL TIME PARSING INSTRUCTIONS:
- The DATE is ALWAYS today ({today}) - do not change this
- Look for time mentions like: "at 2 PM", "3:30", "nine thirty", "half past two", "quarter to five", "7 AM", "seven o'clock"
- Convert ALL times to valid 24-hour format (e.g., "2 PM" = "14:00", "7 AM" = "07:00")
- IGNORE any invalid times like "29:00", "25:00", or any hour > 23
- If you see malformed times like "22:00 PM", interpret them logically: "22:00" is already evening in 24-hour format, keep it
- Valid hours: 00-23, valid minutes: 00-59
- If NO valid time is found or all times are garbled/invalid, use these defaults:
  * start_time: "09:00"
  * end_time: "10:00"
- Common speech patterns: "7 o'clock" = "07:00", "half past 7" = "07:30", "quarter to 8" = "07:45"
- Create a meaningful TITLE based on what the user is talking about
- Include all relevant details in the DESCRIPTION"#
    )
}

/// Raw shape of the model's JSON payload. Every field defaults so a
/// partially valid object still yields a usable record; the model's own
/// `date` field is not even deserialized.
#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_time: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    attendees: Vec<String>,
    #[serde(default)]
    notes: String,
}

/// Parse a raw model response into an event, falling back on any failure.
///
/// The JSON payload is the substring between the first `{` and the last
/// `}` of the response; anything around it is ignored.
pub fn parse_model_response(
    response: &str,
    transcript: &str,
    reference_date: NaiveDate,
) -> Extraction {
    let Some(json) = extract_json_object(response) else {
        return fallback(transcript, reference_date);
    };

    let Ok(raw) = serde_json::from_str::<RawEvent>(json) else {
        return fallback(transcript, reference_date);
    };

    let (start_time, end_time) =
        event::normalize_times(Some(raw.start_time.as_str()), Some(raw.end_time.as_str()));

    let event = ExtractedEvent {
        title: if raw.title.trim().is_empty() {
            event::FALLBACK_TITLE.to_string()
        } else {
            raw.title
        },
        description: if raw.description.is_empty() {
            transcript.to_string()
        } else {
            raw.description
        },
        date: reference_date,
        start_time,
        end_time,
        location: raw.location,
        priority: Priority::parse_lenient(&raw.priority),
        category: Category::parse_lenient(&raw.category),
        attendees: raw.attendees,
        notes: raw.notes,
    };

    Extraction {
        event,
        source: ExtractionSource::Parsed,
    }
}

fn fallback(transcript: &str, reference_date: NaiveDate) -> Extraction {
    Extraction {
        event: ExtractedEvent::fallback(transcript, reference_date),
        source: ExtractionSource::Fallback,
    }
}

/// Locate the JSON payload inside free-form response text.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
