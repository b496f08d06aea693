//! Extraction Contract Tests
//!
//! Drives `EventExtractor` against scripted models to pin the
//! time-normalization, date-override, and fallback behavior.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use voxcal::adapters::{AdapterError, ChatModel};
use voxcal::core::{EventExtractor, ExtractionSource};
use voxcal::domain::Category;

/// Model that always returns the same response text.
struct ScriptedModel {
    response: String,
}

impl ScriptedModel {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AdapterError> {
        Ok(self.response.clone())
    }
}

/// Model whose call itself fails.
struct UnreachableModel;

#[async_trait]
impl ChatModel for UnreachableModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AdapterError> {
        Err(AdapterError::Network {
            service: "language model",
            reason: "connection refused".to_string(),
        })
    }
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn hhmm(time: chrono::NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[tokio::test]
async fn team_sync_scenario_extracts_afternoon_times() {
    let model = ScriptedModel::new(
        r#"{
            "title": "Team sync",
            "description": "Team sync about budget",
            "date": "2024-06-01",
            "start_time": "15:00",
            "end_time": "16:00",
            "location": "",
            "priority": "medium",
            "category": "meeting",
            "attendees": [],
            "notes": ""
        }"#,
    );
    let extractor = EventExtractor::new(model);

    let extraction = extractor
        .extract("Team sync at 3pm about budget", reference_date())
        .await
        .unwrap();

    assert_eq!(extraction.source, ExtractionSource::Parsed);
    assert_eq!(hhmm(extraction.event.start_time), "15:00");
    assert_eq!(hhmm(extraction.event.end_time), "16:00");
    assert_eq!(extraction.event.category, Category::Meeting);
    assert_eq!(extraction.event.date, reference_date());
}

#[tokio::test]
async fn no_time_expression_defaults_to_morning_pair() {
    let model = ScriptedModel::new(
        r#"{"title": "Buy groceries", "description": "Remember to buy groceries", "category": "task"}"#,
    );
    let extractor = EventExtractor::new(model);

    let extraction = extractor
        .extract("Remember to buy groceries", reference_date())
        .await
        .unwrap();

    assert_eq!(hhmm(extraction.event.start_time), "09:00");
    assert_eq!(hhmm(extraction.event.end_time), "10:00");
    assert_eq!(extraction.event.category, Category::Task);
}

#[tokio::test]
async fn model_supplied_date_is_always_overridden() {
    let model = ScriptedModel::new(
        r#"{"title": "Trip", "date": "1999-12-31", "start_time": "08:00"}"#,
    );
    let extractor = EventExtractor::new(model);

    let extraction = extractor
        .extract("plan the trip", reference_date())
        .await
        .unwrap();

    assert_eq!(extraction.event.date, reference_date());
}

#[tokio::test]
async fn out_of_range_hours_never_reach_the_event() {
    let model =
        ScriptedModel::new(r#"{"title": "Late call", "start_time": "29:00", "end_time": "25:30"}"#);
    let extractor = EventExtractor::new(model);

    let extraction = extractor
        .extract("call at twenty nine hundred", reference_date())
        .await
        .unwrap();

    assert_eq!(hhmm(extraction.event.start_time), "09:00");
    assert_eq!(hhmm(extraction.event.end_time), "10:00");
}

#[tokio::test]
async fn unparsable_response_yields_fallback_with_verbatim_transcript() {
    let transcript = "Team sync at 3pm about budget";
    let model = ScriptedModel::new("Sorry, I cannot produce structured data for that.");
    let extractor = EventExtractor::new(model);

    let extraction = extractor.extract(transcript, reference_date()).await.unwrap();

    assert_eq!(extraction.source, ExtractionSource::Fallback);
    assert_eq!(extraction.event.title, "Voice Note Event");
    assert_eq!(extraction.event.description, transcript);
    assert_eq!(hhmm(extraction.event.start_time), "09:00");
    assert_eq!(hhmm(extraction.event.end_time), "10:00");
}

#[tokio::test]
async fn extraction_is_idempotent_for_identical_inputs() {
    let response = r#"{"title": "Dentist", "start_time": "11:00", "category": "appointment"}"#;
    let extractor_a = EventExtractor::new(ScriptedModel::new(response));
    let extractor_b = EventExtractor::new(ScriptedModel::new(response));

    let first = extractor_a
        .extract("dentist at eleven", reference_date())
        .await
        .unwrap();
    let again_same_instance = extractor_a
        .extract("dentist at eleven", reference_date())
        .await
        .unwrap();
    let other_instance = extractor_b
        .extract("dentist at eleven", reference_date())
        .await
        .unwrap();

    assert_eq!(first.event, again_same_instance.event);
    assert_eq!(first.event, other_instance.event);
}

#[tokio::test]
async fn model_call_failure_propagates() {
    let extractor = EventExtractor::new(Arc::new(UnreachableModel));

    let err = extractor
        .extract("anything", reference_date())
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::Network { .. }));
}

#[tokio::test]
async fn prose_wrapped_json_still_parses() {
    let model = ScriptedModel::new(
        "Here is the event you asked for:\n\n{\"title\": \"Standup\", \"start_time\": \"09:30\", \"category\": \"meeting\"}\n\nAnything else?",
    );
    let extractor = EventExtractor::new(model);

    let extraction = extractor
        .extract("standup at nine thirty", reference_date())
        .await
        .unwrap();

    assert_eq!(extraction.source, ExtractionSource::Parsed);
    assert_eq!(extraction.event.title, "Standup");
    assert_eq!(hhmm(extraction.event.start_time), "09:30");
    // end defaults to start + 1 hour
    assert_eq!(hhmm(extraction.event.end_time), "10:30");
}
