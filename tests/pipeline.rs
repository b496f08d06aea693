//! Pipeline Outcome Tests
//!
//! Exercises the orchestrator end to end with scripted service clients:
//! outcome shape, publish ordering on failure, and temp-file cleanup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use voxcal::adapters::{AdapterError, CalendarSink, ChatModel, NoteSink, SpeechToText};
use voxcal::audio::{AudioSource, CaptureMode, VoiceNote};
use voxcal::core::{Orchestrator, PipelineOutcome, Stage};
use voxcal::domain::{CalendarEvent, NoteRecord};

/// Recorder that writes a placeholder file instead of touching a device.
struct FakeRecorder {
    dir: PathBuf,
}

impl FakeRecorder {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn wav_path(&self) -> PathBuf {
        self.dir.join("note.wav")
    }
}

#[async_trait]
impl AudioSource for FakeRecorder {
    async fn record(&self, _mode: CaptureMode) -> anyhow::Result<VoiceNote> {
        let path = self.wav_path();
        tokio::fs::write(&path, b"RIFF").await?;
        Ok(VoiceNote {
            path,
            sample_rate: 44_100,
            channels: 1,
            bits_per_sample: 16,
        })
    }
}

/// Recorder whose device is unavailable.
struct BrokenRecorder;

#[async_trait]
impl AudioSource for BrokenRecorder {
    async fn record(&self, _mode: CaptureMode) -> anyhow::Result<VoiceNote> {
        anyhow::bail!("no input device available")
    }
}

struct FakeTranscriber {
    result: Result<String, ()>,
}

#[async_trait]
impl SpeechToText for FakeTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String, AdapterError> {
        match &self.result {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(AdapterError::Network {
                service: "transcription service",
                reason: "connection refused".to_string(),
            }),
        }
    }
}

struct ScriptedModel {
    response: String,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AdapterError> {
        Ok(self.response.clone())
    }
}

struct CountingNoteSink {
    calls: Arc<AtomicUsize>,
    fail_status: Option<u16>,
}

#[async_trait]
impl NoteSink for CountingNoteSink {
    async fn publish(&self, _note: &NoteRecord) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_status {
            Some(status) => Err(AdapterError::Rejected {
                service: "note service",
                status,
                body: "validation error".to_string(),
            }),
            None => Ok("https://notes.example/page-1".to_string()),
        }
    }
}

struct CountingCalendarSink {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CalendarSink for CountingCalendarSink {
    async fn insert(&self, _event: &CalendarEvent) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("https://calendar.example/event-1".to_string())
    }
}

const MODEL_RESPONSE: &str = r#"{
    "title": "Team sync",
    "description": "Team sync about budget",
    "start_time": "15:00",
    "end_time": "16:00",
    "category": "meeting"
}"#;

struct Harness {
    orchestrator: Orchestrator,
    note_calls: Arc<AtomicUsize>,
    calendar_calls: Arc<AtomicUsize>,
    wav_path: PathBuf,
}

fn harness(
    dir: &Path,
    transcriber: FakeTranscriber,
    model_response: &str,
    note_fail_status: Option<u16>,
) -> Harness {
    let note_calls = Arc::new(AtomicUsize::new(0));
    let calendar_calls = Arc::new(AtomicUsize::new(0));
    let recorder = FakeRecorder::new(dir);
    let wav_path = recorder.wav_path();

    let orchestrator = Orchestrator::new(
        Box::new(recorder),
        Box::new(transcriber),
        Arc::new(ScriptedModel {
            response: model_response.to_string(),
        }),
        Box::new(CountingNoteSink {
            calls: note_calls.clone(),
            fail_status: note_fail_status,
        }),
        Box::new(CountingCalendarSink {
            calls: calendar_calls.clone(),
        }),
    );

    Harness {
        orchestrator,
        note_calls,
        calendar_calls,
        wav_path,
    }
}

fn fixed_mode() -> CaptureMode {
    CaptureMode::Fixed(Duration::from_millis(1))
}

#[tokio::test]
async fn successful_run_publishes_both_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        dir.path(),
        FakeTranscriber {
            result: Ok("Team sync at 3pm about budget".to_string()),
        },
        MODEL_RESPONSE,
        None,
    );

    let outcome = h.orchestrator.process_voice_note(fixed_mode()).await;

    match outcome {
        PipelineOutcome::Success {
            transcript,
            event,
            note_url,
            event_link,
            ..
        } => {
            assert_eq!(transcript, "Team sync at 3pm about budget");
            assert_eq!(event.title, "Team sync");
            assert_eq!(note_url, "https://notes.example/page-1");
            assert_eq!(event_link, "https://calendar.example/event-1");
        }
        PipelineOutcome::Error { stage, message, .. } => {
            panic!("unexpected error at {stage}: {message}")
        }
    }

    assert_eq!(h.note_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.calendar_calls.load(Ordering::SeqCst), 1);
    // Temporary audio artifact is gone
    assert!(!h.wav_path.exists());
}

#[tokio::test]
async fn note_publish_failure_skips_calendar_and_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        dir.path(),
        FakeTranscriber {
            result: Ok("Team sync at 3pm".to_string()),
        },
        MODEL_RESPONSE,
        Some(400),
    );

    let outcome = h.orchestrator.process_voice_note(fixed_mode()).await;

    match outcome {
        PipelineOutcome::Error { stage, message, .. } => {
            assert_eq!(stage, Stage::PublishingNote);
            assert!(message.contains("note service"));
        }
        PipelineOutcome::Success { .. } => panic!("expected an error outcome"),
    }

    // The calendar publish was never attempted
    assert_eq!(h.note_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.calendar_calls.load(Ordering::SeqCst), 0);
    // Cleanup happens on the failure path too
    assert!(!h.wav_path.exists());
}

#[tokio::test]
async fn transcription_failure_aborts_before_any_publish() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        dir.path(),
        FakeTranscriber { result: Err(()) },
        MODEL_RESPONSE,
        None,
    );

    let outcome = h.orchestrator.process_voice_note(fixed_mode()).await;

    match outcome {
        PipelineOutcome::Error { stage, .. } => assert_eq!(stage, Stage::Transcribing),
        PipelineOutcome::Success { .. } => panic!("expected an error outcome"),
    }

    assert_eq!(h.note_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.calendar_calls.load(Ordering::SeqCst), 0);
    assert!(!h.wav_path.exists());
}

#[tokio::test]
async fn capture_failure_reports_device_error() {
    let note_calls = Arc::new(AtomicUsize::new(0));
    let calendar_calls = Arc::new(AtomicUsize::new(0));

    let orchestrator = Orchestrator::new(
        Box::new(BrokenRecorder),
        Box::new(FakeTranscriber {
            result: Ok("unused".to_string()),
        }),
        Arc::new(ScriptedModel {
            response: MODEL_RESPONSE.to_string(),
        }),
        Box::new(CountingNoteSink {
            calls: note_calls.clone(),
            fail_status: None,
        }),
        Box::new(CountingCalendarSink {
            calls: calendar_calls.clone(),
        }),
    );

    let outcome = orchestrator.process_voice_note(fixed_mode()).await;

    match outcome {
        PipelineOutcome::Error { stage, message, .. } => {
            assert_eq!(stage, Stage::Recording);
            assert!(message.contains("audio device error"));
        }
        PipelineOutcome::Success { .. } => panic!("expected an error outcome"),
    }

    assert_eq!(note_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_model_output_still_completes_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        dir.path(),
        FakeTranscriber {
            result: Ok("Remember to buy groceries".to_string()),
        },
        "no structured data here, sorry",
        None,
    );

    let outcome = h.orchestrator.process_voice_note(fixed_mode()).await;

    match outcome {
        PipelineOutcome::Success { event, .. } => {
            // Fallback record flows through to both publishers
            assert_eq!(event.title, "Voice Note Event");
            assert_eq!(event.description, "Remember to buy groceries");
        }
        PipelineOutcome::Error { stage, message, .. } => {
            panic!("unexpected error at {stage}: {message}")
        }
    }

    assert_eq!(h.note_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.calendar_calls.load(Ordering::SeqCst), 1);
}
