//! Thin clients for the external services the pipeline talks to.
//!
//! Each client wraps one third-party HTTP API behind a small trait so the
//! orchestrator (and tests) never depend on a concrete endpoint. Clients
//! constructed without credentials stay inert and report `NotConfigured`
//! when first called.

pub mod gcal;
pub mod llm;
pub mod notion;
pub mod whisper;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the concrete clients
pub use gcal::GoogleCalendarClient;
pub use llm::ChatClient;
pub use notion::NotionClient;
pub use whisper::WhisperClient;

use crate::domain::{CalendarEvent, NoteRecord};

/// Errors surfaced by the service clients
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Client constructed without credentials, or its credential files
    /// are missing
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A local artifact or a response body did not have the expected shape
    #[error("invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },

    /// The request could not be completed
    #[error("request to {service} failed: {reason}")]
    Network {
        service: &'static str,
        reason: String,
    },

    /// The service answered with a failure status
    #[error("{service} rejected the request ({status}): {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },
}

impl AdapterError {
    pub(crate) fn network(service: &'static str, err: reqwest::Error) -> Self {
        Self::Network {
            service,
            reason: err.to_string(),
        }
    }
}

/// Speech-to-text service
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe one audio file into plain text.
    async fn transcribe(&self, audio: &Path) -> Result<String, AdapterError>;
}

/// Chat-completion language model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one (system, user) message pair and return the raw response
    /// text. No streaming, no multi-turn.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AdapterError>;
}

/// Note-taking service
#[async_trait]
pub trait NoteSink: Send + Sync {
    /// Publish a note, returning the created page URL.
    async fn publish(&self, note: &NoteRecord) -> Result<String, AdapterError>;
}

/// Calendar service
#[async_trait]
pub trait CalendarSink: Send + Sync {
    /// Insert an event, returning a link to it.
    async fn insert(&self, event: &CalendarEvent) -> Result<String, AdapterError>;
}
