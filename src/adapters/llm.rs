//! Chat-completion client for OpenAI-compatible language-model endpoints.
//!
//! Sends one (system, user) message pair to `{base_url}/chat/completions`
//! and returns the first choice's content verbatim. The extractor is
//! responsible for making sense of the text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AdapterError, ChatModel};
use crate::config::LlmSettings;

const SERVICE: &str = "language model";

/// Chat-completions API client
pub struct ChatClient {
    settings: Option<LlmSettings>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatClient {
    pub fn new(settings: Option<LlmSettings>) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AdapterError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or(AdapterError::NotConfigured(SERVICE))?;

        let request = ChatRequest {
            model: &settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(Self::endpoint(&settings.base_url))
            .bearer_auth(&settings.api_key)
            .json(&request)
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AdapterError::Invalid {
                what: "model response",
                reason: "no choices returned".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            ChatClient::endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_not_configured() {
        let client = ChatClient::new(None);
        let err = client.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured(_)));
    }
}
