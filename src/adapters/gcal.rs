//! Calendar-service client (Google Calendar v3).
//!
//! Consumes an OAuth2 client secret and a previously cached refresh
//! token. The interactive consent flow that produces the token cache is
//! provisioned outside this binary; missing files are a reported
//! precondition failure, never a prompt.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info};

use super::{AdapterError, CalendarSink};
use crate::config::CalendarSettings;
use crate::domain::CalendarEvent;

const SERVICE: &str = "calendar service";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Google Calendar event-insert client
pub struct GoogleCalendarClient {
    settings: CalendarSettings,
    client: reqwest::Client,
}

/// OAuth client secret file (`credentials.json` from the cloud console)
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
}

/// Cached token file written by the authorization flow (`token.json`)
#[derive(Debug, Deserialize)]
struct CachedToken {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    #[serde(rename = "htmlLink", default)]
    html_link: String,
}

impl GoogleCalendarClient {
    pub fn new(settings: CalendarSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Load the client secret and cached refresh token from disk.
    async fn load_credentials(&self) -> Result<(ClientSecret, String), AdapterError> {
        let credentials_path = &self.settings.credentials_path;
        let token_path = &self.settings.token_path;

        if !credentials_path.exists() || !token_path.exists() {
            error!(
                credentials = %credentials_path.display(),
                token = %token_path.display(),
                "calendar credentials missing; run the authorization flow and place the files there"
            );
            return Err(AdapterError::NotConfigured(SERVICE));
        }

        let secret = parse_client_secret(credentials_path).await?;
        let token = parse_cached_token(token_path).await?;

        Ok((secret, token.refresh_token))
    }

    /// Exchange the cached refresh token for a short-lived access token.
    async fn refresh_access_token(
        &self,
        secret: &ClientSecret,
        refresh_token: &str,
    ) -> Result<String, AdapterError> {
        let params = [
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
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

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        Ok(token.access_token)
    }
}

async fn parse_client_secret(path: &Path) -> Result<ClientSecret, AdapterError> {
    let content = tokio::fs::read_to_string(path).await?;
    let file: ClientSecretFile =
        serde_json::from_str(&content).map_err(|e| AdapterError::Invalid {
            what: "client secret file",
            reason: e.to_string(),
        })?;

    file.installed.or(file.web).ok_or(AdapterError::Invalid {
        what: "client secret file",
        reason: "missing installed/web section".to_string(),
    })
}

async fn parse_cached_token(path: &Path) -> Result<CachedToken, AdapterError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| AdapterError::Invalid {
        what: "token cache file",
        reason: e.to_string(),
    })
}

#[async_trait]
impl CalendarSink for GoogleCalendarClient {
    async fn insert(&self, event: &CalendarEvent) -> Result<String, AdapterError> {
        let (secret, refresh_token) = self.load_credentials().await?;
        let access_token = self.refresh_access_token(&secret, &refresh_token).await?;

        let response = self
            .client
            .post(EVENTS_URL)
            .bearer_auth(access_token)
            .json(event)
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

        let created: InsertResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        info!(link = %created.html_link, "calendar event created");
        Ok(created.html_link)
    }
}
