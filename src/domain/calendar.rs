//! Calendar-service representation of an extracted event.
//!
//! Field names follow the Google Calendar v3 wire format; the structs are
//! serialized directly into the event-insert payload.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::event::ExtractedEvent;

/// Time zone attached to every published event.
pub const EVENT_TIME_ZONE: &str = "America/Los_Angeles";

/// An event as the calendar service expects it. Built at publish time and
/// never persisted locally.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<Attendee>,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

impl EventDateTime {
    fn new(instant: NaiveDateTime) -> Self {
        Self {
            date_time: instant.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: EVENT_TIME_ZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attendee {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    /// Fixed policy: one email reminder 24 hours prior, one popup
    /// reminder 10 minutes prior.
    pub fn fixed_policy() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup".to_string(),
                    minutes: 10,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl CalendarEvent {
    pub fn from_event(event: &ExtractedEvent) -> Self {
        Self {
            summary: event.title.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            start: EventDateTime::new(event.date.and_time(event.start_time)),
            end: EventDateTime::new(event.date.and_time(event.end_time)),
            attendees: event
                .attendees
                .iter()
                .map(|email| Attendee {
                    email: email.clone(),
                })
                .collect(),
            reminders: Reminders::fixed_policy(),
        }
    }
}
