//! Pipeline stages, error taxonomy, and outcomes.
//!
//! One voice note flows through a strict linear sequence of stages. Every
//! invocation ends in exactly one outcome value; the orchestrator never
//! raises to its caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::ExtractedEvent;

/// Stages of one voice-note run. A fresh machine starts per invocation;
/// any stage can transition to `Failed`, except that the extractor's
/// JSON-parsing sub-step is absorbed as a same-stage fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Recording,
    Transcribing,
    Extracting,
    PublishingNote,
    PublishingCalendar,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Recording => "recording",
            Self::Transcribing => "transcribing",
            Self::Extracting => "extracting",
            Self::PublishingNote => "publishing note",
            Self::PublishingCalendar => "publishing calendar",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Pipeline-level error taxonomy.
///
/// Malformed model output never appears here: it is fully recovered
/// inside the extractor via the fallback record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Audio capture failed (device unavailable, I/O failure)
    #[error("audio device error: {0}")]
    Device(String),

    /// A service client is unconfigured or unreachable
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable {
        service: &'static str,
        reason: String,
    },

    /// The language-model call itself failed
    #[error("language model call failed: {0}")]
    ModelUnavailable(String),

    /// A publish call was rejected by the remote service
    #[error("{service} publish failed: {reason}")]
    Publish {
        service: &'static str,
        reason: String,
    },
}

/// Final result of one `process_voice_note` invocation.
#[derive(Debug)]
pub enum PipelineOutcome {
    Success {
        run_id: Uuid,
        transcript: String,
        event: ExtractedEvent,
        /// URL of the created note page
        note_url: String,
        /// Link to the created calendar event
        event_link: String,
    },
    Error {
        run_id: Uuid,
        stage: Stage,
        message: String,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
