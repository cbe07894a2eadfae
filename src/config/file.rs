//! TOML configuration file loading
//!
//! Supports `~/.config/jeonghuni/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Completion service settings
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Conversation history limits
    #[serde(default)]
    pub context: ContextFileConfig,

    /// Fixed reply texts
    #[serde(default)]
    pub replies: RepliesFileConfig,

    /// System instruction table
    #[serde(default)]
    pub prompts: PromptsFileConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Telegram bot configuration
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    pub bot_token: Option<String>,
    /// Bot username without the leading `@`
    pub bot_username: Option<String>,
    /// Natural-language activation keyword (the bot's display name)
    pub keyword: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_url: Option<String>,
    /// Bot API server, for self-hosted `telegram-bot-api` deployments
    pub api_base: Option<String>,
}

/// Completion service configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Base URL of an OpenAI-compatible API (e.g. `https://api.openai.com/v1`)
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// Conversation history configuration
#[derive(Debug, Default, Deserialize)]
pub struct ContextFileConfig {
    /// Turns kept per chat
    pub max_turns: Option<usize>,
    /// Chats kept before the least recently used one is dropped
    pub max_chats: Option<usize>,
}

/// Fixed reply texts
#[derive(Debug, Default, Deserialize)]
pub struct RepliesFileConfig {
    pub thinking: Option<String>,
    pub bare_activation: Option<String>,
    pub empty_completion: Option<String>,
    pub failure: Option<String>,
}

/// System instruction table
#[derive(Debug, Default, Deserialize)]
pub struct PromptsFileConfig {
    pub default: Option<String>,
    pub automated: Option<String>,
    /// Per-sender instructions keyed by display name
    #[serde(default)]
    pub senders: HashMap<String, String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
}

/// Load the TOML config file
///
/// An explicit `path` must exist and parse. Without one the standard path is
/// tried, and a missing or unreadable file falls back to defaults.
///
/// # Errors
///
/// Returns error if an explicitly requested file cannot be read or parsed
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(ConfigFile::default());
    };

    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                Ok(ConfigFile::default())
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            Ok(ConfigFile::default())
        }
    }
}

/// Return the config file path: `~/.config/jeonghuni/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("jeonghuni").join("config.toml"))
}
