//! Configuration for voxcal.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (WHISPER_API_KEY, LLM_API_KEY, ...)
//! 2. Config file (.voxcal/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .voxcal/config.yaml
//! - Falls back to ~/.voxcal/config.yaml
//!
//! Every service section is optional. A missing credential never aborts
//! startup: the corresponding client reports itself unavailable when the
//! pipeline first calls it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_whisper_model() -> String {
    DEFAULT_WHISPER_MODEL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub whisper: Option<WhisperSettings>,
    #[serde(default)]
    pub llm: Option<LlmSettings>,
    #[serde(default)]
    pub notion: Option<NotionSettings>,
    #[serde(default)]
    pub calendar: Option<CalendarSettings>,
}

/// Transcription endpoint credentials
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperSettings {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_whisper_model")]
    pub model: String,
}

/// Language-model endpoint credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// Note-service credentials
#[derive(Debug, Clone, Deserialize)]
pub struct NotionSettings {
    pub api_key: String,
    pub parent_page_id: String,
}

/// Paths to the OAuth client secret and the cached token
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarSettings {
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
}

/// Resolved runtime configuration, constructed once at startup and passed
/// by reference into each component constructor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub whisper: Option<WhisperSettings>,
    pub llm: Option<LlmSettings>,
    pub notion: Option<NotionSettings>,
    pub calendar: CalendarSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self> {
        let config_file = find_config_file();
        let file = match &config_file {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        let home = dirs::home_dir().context("failed to determine home directory")?;

        Ok(resolve(
            file,
            |key| std::env::var(key).ok(),
            &home,
            config_file,
        ))
    }
}

/// Find config file by searching current directory and parents, then the
/// home directory.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".voxcal").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let fallback = dirs::home_dir()?.join(".voxcal").join("config.yaml");
    fallback.exists().then_some(fallback)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values with environment overrides. Pure so it can be tested
/// without touching the process environment.
fn resolve(
    file: ConfigFile,
    env: impl Fn(&str) -> Option<String>,
    home: &Path,
    config_file: Option<PathBuf>,
) -> Settings {
    let whisper = match env("WHISPER_API_KEY") {
        Some(api_key) => Some(WhisperSettings {
            api_key,
            base_url: env("WHISPER_BASE_URL").unwrap_or_else(default_base_url),
            model: env("WHISPER_MODEL").unwrap_or_else(default_whisper_model),
        }),
        None => file.whisper,
    };

    let llm = match env("LLM_API_KEY") {
        Some(api_key) => Some(LlmSettings {
            api_key,
            base_url: env("LLM_BASE_URL").unwrap_or_else(default_base_url),
            model: env("LLM_MODEL").unwrap_or_else(default_llm_model),
        }),
        None => file.llm,
    };

    let notion = match (env("NOTION_API_KEY"), env("NOTION_PARENT_PAGE_ID")) {
        (Some(api_key), Some(parent_page_id)) => Some(NotionSettings {
            api_key,
            parent_page_id,
        }),
        _ => file.notion,
    };

    let default_dir = home.join(".voxcal");
    let base = file.calendar.unwrap_or_else(|| CalendarSettings {
        credentials_path: default_dir.join("credentials.json"),
        token_path: default_dir.join("token.json"),
    });
    let calendar = CalendarSettings {
        credentials_path: env("GOOGLE_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or(base.credentials_path),
        token_path: env("GOOGLE_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or(base.token_path),
    };

    Settings {
        whisper,
        llm,
        notion,
        calendar,
        config_file,
    }
}
