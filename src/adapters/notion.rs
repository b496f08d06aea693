//! Note-service client (Notion pages API).
//!
//! Creates each note as a sub-page of a configured parent page: one title
//! property plus a single paragraph block holding the rendered body.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::{AdapterError, NoteSink};
use crate::config::NotionSettings;
use crate::domain::NoteRecord;

const SERVICE: &str = "note service";
const PAGES_URL: &str = "https://api.notion.com/v1/pages";
// Required version header
const NOTION_VERSION: &str = "2022-06-28";

/// Notion page-creation client
pub struct NotionClient {
    settings: Option<NotionSettings>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    url: String,
}

impl NotionClient {
    pub fn new(settings: Option<NotionSettings>) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NoteSink for NotionClient {
    async fn publish(&self, note: &NoteRecord) -> Result<String, AdapterError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or(AdapterError::NotConfigured(SERVICE))?;

        let payload = serde_json::json!({
            "parent": { "page_id": settings.parent_page_id },
            "properties": {
                "title": [
                    { "text": { "content": note.title } }
                ]
            },
            "children": [
                {
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": {
                        "rich_text": [
                            { "type": "text", "text": { "content": note.body } }
                        ]
                    }
                }
            ]
        });

        let response = self
            .client
            .post(PAGES_URL)
            .bearer_auth(&settings.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
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

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::network(SERVICE, e))?;

        info!(url = %page.url, "note created");
        Ok(page.url)
    }
}
