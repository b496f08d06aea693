//! Speech-to-text client for OpenAI-compatible transcription endpoints.
//!
//! Uploads the recorded WAV file as a multipart form to
//! `{base_url}/audio/transcriptions` and returns the plain transcript.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::info;

use super::{AdapterError, SpeechToText};
use crate::config::WhisperSettings;

const SERVICE: &str = "transcription service";

/// Transcription API client
pub struct WhisperClient {
    settings: Option<WhisperSettings>,
    client: reqwest::Client,
}

/// Response from the transcription endpoint
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperClient {
    pub fn new(settings: Option<WhisperSettings>) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(base_url: &str) -> String {
        format!("{}/audio/transcriptions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio: &Path) -> Result<String, AdapterError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or(AdapterError::NotConfigured(SERVICE))?;

        let file_name = audio
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let file_bytes = tokio::fs::read(audio).await?;

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        let form = Form::new()
            .text("model", settings.model.clone())
            .part("file", file_part);

        let response = self
            .client
            .post(Self::endpoint(&settings.base_url))
            .bearer_auth(&settings.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Rejected {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        let text = parsed.text.trim().to_string();
        info!(chars = text.len(), "audio transcription completed");
        Ok(text)
    }
}
