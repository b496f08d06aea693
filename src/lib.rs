//! voxcal - voice note to calendar pipeline
//!
//! Records a voice note from the microphone, transcribes it with a
//! speech-to-text service, extracts a structured event with a language
//! model, and publishes the result to a note service (Notion) and a
//! calendar service (Google Calendar).
//!
//! # Architecture
//!
//! Control flow is strictly linear per voice note:
//!
//! ```text
//! capture → transcribe → extract → publish(note) → publish(calendar)
//! ```
//!
//! The extraction step never fails on malformed model output: it
//! degrades to a deterministic fallback record built from the raw
//! transcript, so every recorded note produces a usable event. Only
//! outright service failures abort a run, and each run ends in exactly
//! one success/error outcome.
//!
//! # Modules
//!
//! - `adapters`: external service clients (transcription, LLM, Notion,
//!   Google Calendar)
//! - `audio`: microphone capture
//! - `core`: extraction and orchestration
//! - `domain`: data structures (ExtractedEvent, NoteRecord, CalendarEvent)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Interactive menu
//! voxcal
//!
//! # One-shot 10 second recording
//! voxcal record --duration 10
//!
//! # Show resolved configuration
//! voxcal config
//! ```

pub mod adapters;
pub mod audio;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{
    EventExtractor, Extraction, ExtractionSource, Orchestrator, PipelineError, PipelineOutcome,
    Stage,
};
pub use audio::{AudioSource, CaptureMode, Microphone, VoiceNote};
pub use config::Settings;
pub use domain::{CalendarEvent, Category, ExtractedEvent, NoteRecord, Priority};
