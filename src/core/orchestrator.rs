//! Voice-note pipeline orchestration.
//!
//! Sequences capture → transcribe → extract → publish(note) →
//! publish(calendar), removes the temporary audio artifact, and reports a
//! single outcome per invocation. Strictly linear: one external call in
//! flight at a time, no retries at this layer, no state carried across
//! voice notes.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{
    AdapterError, CalendarSink, ChatClient, ChatModel, GoogleCalendarClient, NoteSink,
    NotionClient, SpeechToText, WhisperClient,
};
use crate::audio::{AudioSource, CaptureMode, Microphone, VoiceNote};
use crate::config::Settings;
use crate::core::extractor::EventExtractor;
use crate::core::pipeline::{PipelineError, PipelineOutcome, Stage};
use crate::domain::{CalendarEvent, ExtractedEvent, NoteRecord};

/// Main pipeline orchestrator
pub struct Orchestrator {
    audio: Box<dyn AudioSource>,
    transcriber: Box<dyn SpeechToText>,
    extractor: EventExtractor,
    notes: Box<dyn NoteSink>,
    calendar: Box<dyn CalendarSink>,
}

impl Orchestrator {
    pub fn new(
        audio: Box<dyn AudioSource>,
        transcriber: Box<dyn SpeechToText>,
        model: Arc<dyn ChatModel>,
        notes: Box<dyn NoteSink>,
        calendar: Box<dyn CalendarSink>,
    ) -> Self {
        Self {
            audio,
            transcriber,
            extractor: EventExtractor::new(model),
            notes,
            calendar,
        }
    }

    /// Build an orchestrator with the real clients. Unconfigured services
    /// are reported here once and again when the pipeline first touches
    /// them.
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.whisper.is_none() {
            error!("whisper client not configured, transcription will fail (set WHISPER_API_KEY)");
        }
        if settings.llm.is_none() {
            error!("language model client not configured, extraction will fail (set LLM_API_KEY)");
        }
        if settings.notion.is_none() {
            warn!("notion client not configured, note publishing will fail");
        }
        if !settings.calendar.credentials_path.exists() {
            warn!(
                path = %settings.calendar.credentials_path.display(),
                "calendar client secret not found, calendar publishing will fail"
            );
        }

        Self::new(
            Box::new(Microphone::new()),
            Box::new(WhisperClient::new(settings.whisper.clone())),
            Arc::new(ChatClient::new(settings.llm.clone())),
            Box::new(NotionClient::new(settings.notion.clone())),
            Box::new(GoogleCalendarClient::new(settings.calendar.clone())),
        )
    }

    /// Process one voice note end to end.
    ///
    /// Always returns exactly one outcome; every internal failure is
    /// caught and converted into the error variant. The temporary audio
    /// file is removed whether or not the run succeeds.
    #[instrument(skip(self, mode))]
    pub async fn process_voice_note(&self, mode: CaptureMode) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        info!(%run_id, "starting voice note run");

        let voice_note = match self.audio.record(mode).await {
            Ok(note) => note,
            Err(e) => {
                let err = PipelineError::Device(e.to_string());
                error!(%run_id, stage = %Stage::Recording, error = %err, "voice note run failed");
                return PipelineOutcome::Error {
                    run_id,
                    stage: Stage::Recording,
                    message: err.to_string(),
                };
            }
        };

        let result = self.process_audio(run_id, &voice_note).await;

        // Best-effort cleanup on both paths; a leftover file never fails
        // the run
        if let Err(e) = std::fs::remove_file(&voice_note.path) {
            warn!(
                %run_id,
                path = %voice_note.path.display(),
                error = %e,
                "could not remove temporary audio file"
            );
        } else {
            info!(%run_id, "temporary audio file removed");
        }

        match result {
            Ok((transcript, event, note_url, event_link)) => {
                info!(%run_id, stage = %Stage::Done, title = %event.title, "voice note run completed");
                PipelineOutcome::Success {
                    run_id,
                    transcript,
                    event,
                    note_url,
                    event_link,
                }
            }
            Err((stage, err)) => {
                error!(%run_id, %stage, error = %err, "voice note run failed");
                PipelineOutcome::Error {
                    run_id,
                    stage,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Everything after capture. Split out so cleanup runs on both paths.
    async fn process_audio(
        &self,
        run_id: Uuid,
        voice_note: &VoiceNote,
    ) -> Result<(String, ExtractedEvent, String, String), (Stage, PipelineError)> {
        info!(%run_id, stage = %Stage::Transcribing, path = %voice_note.path.display(), "transcribing audio");
        let transcript = self
            .transcriber
            .transcribe(&voice_note.path)
            .await
            .map_err(|e| (Stage::Transcribing, service_unavailable("transcription service", e)))?;
        info!(%run_id, chars = transcript.len(), "transcription complete");

        // The date is taken from the wall clock here, once per run; the
        // extractor never reads the clock itself
        let reference_date = Local::now().date_naive();

        info!(%run_id, stage = %Stage::Extracting, "extracting event");
        let extraction = self
            .extractor
            .extract(&transcript, reference_date)
            .await
            .map_err(|e| (Stage::Extracting, model_unavailable(e)))?;
        let event = extraction.event;

        info!(%run_id, stage = %Stage::PublishingNote, title = %event.title, "publishing note");
        let note = NoteRecord::from_event(&event);
        let note_url = self
            .notes
            .publish(&note)
            .await
            .map_err(|e| (Stage::PublishingNote, publish_error("note service", e)))?;

        info!(%run_id, stage = %Stage::PublishingCalendar, "publishing calendar event");
        let calendar_event = CalendarEvent::from_event(&event);
        let event_link = self
            .calendar
            .insert(&calendar_event)
            .await
            .map_err(|e| (Stage::PublishingCalendar, publish_error("calendar service", e)))?;

        Ok((transcript, event, note_url, event_link))
    }
}

fn service_unavailable(service: &'static str, err: AdapterError) -> PipelineError {
    PipelineError::ServiceUnavailable {
        service,
        reason: err.to_string(),
    }
}

/// An unconfigured model client is a missing precondition; anything else
/// is the model call itself failing.
fn model_unavailable(err: AdapterError) -> PipelineError {
    match err {
        AdapterError::NotConfigured(_) => PipelineError::ServiceUnavailable {
            service: "language model",
            reason: err.to_string(),
        },
        other => PipelineError::ModelUnavailable(other.to_string()),
    }
}

/// A rejected publish is its own error kind; everything else means the
/// service never usably answered.
fn publish_error(service: &'static str, err: AdapterError) -> PipelineError {
    match err {
        AdapterError::Rejected { .. } => PipelineError::Publish {
            service,
            reason: err.to_string(),
        },
        other => PipelineError::ServiceUnavailable {
            service,
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_classification() {
        let rejected = AdapterError::Rejected {
            service: "note service",
            status: 400,
            body: "bad block".to_string(),
        };
        assert!(matches!(
            publish_error("note service", rejected),
            PipelineError::Publish { .. }
        ));

        let network = AdapterError::Network {
            service: "note service",
            reason: "timeout".to_string(),
        };
        assert!(matches!(
            publish_error("note service", network),
            PipelineError::ServiceUnavailable { .. }
        ));
    }

    #[test]
    fn test_model_error_classification() {
        assert!(matches!(
            model_unavailable(AdapterError::NotConfigured("language model")),
            PipelineError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            model_unavailable(AdapterError::Network {
                service: "language model",
                reason: "reset".to_string()
            }),
            PipelineError::ModelUnavailable(_)
        ));
    }
}
