//! Configuration management
//!
//! Every setting resolves as env > TOML file > default.

pub mod file;

use std::num::NonZeroUsize;
use std::path::Path;

use self::file::ConfigFile;
use crate::context::MAX_CONTEXT;
use crate::prompt::{AUTOMATED_PROMPT, DEFAULT_PROMPT, PromptTable};
use crate::{Error, Result};

/// Default activation keyword (the bot's display name)
pub const DEFAULT_KEYWORD: &str = "정후니";

/// Default OpenAI-compatible API base URL
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot settings
    pub telegram: TelegramConfig,

    /// Completion service settings
    pub llm: LlmConfig,

    /// Conversation history limits
    pub context: ContextConfig,

    /// Fixed reply texts
    pub replies: ReplyTexts,

    /// System instruction table
    pub prompts: PromptTable,

    /// HTTP server port
    pub port: u16,
}

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token (`TELEGRAM_BOT_TOKEN`)
    pub bot_token: String,

    /// Bot username without `@`; resolved via `getMe` at startup when unset
    pub bot_username: Option<String>,

    /// Natural-language activation keyword
    pub keyword: String,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value
    pub webhook_secret: Option<String>,

    /// Public URL registered with `setWebhook`
    pub webhook_url: Option<String>,

    /// Bot API server; `None` means `https://api.telegram.org`
    pub api_base: Option<String>,
}

/// Completion service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

/// Conversation history limits
#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    /// Turns kept per chat
    pub max_turns: usize,

    /// Chats kept before LRU eviction; `None` keeps all chats
    pub max_chats: Option<NonZeroUsize>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_turns: MAX_CONTEXT,
            max_chats: None,
        }
    }
}

/// Fixed texts sent without consulting the completion service
#[derive(Debug, Clone)]
pub struct ReplyTexts {
    /// Placeholder sent while a reply is generated, later edited in place
    pub thinking: String,

    /// Reply to a bare activation (mention with no other text)
    pub bare_activation: String,

    /// Substituted when the completion service returns no text
    pub empty_completion: String,

    /// Shown when the completion service fails
    pub failure: String,
}

impl Default for ReplyTexts {
    fn default() -> Self {
        Self {
            thinking: "thinking...".to_string(),
            bare_activation: "yes, you called? how can I help".to_string(),
            empty_completion: "sorry, could not generate a response".to_string(),
            failure: "sorry, something went wrong while generating a response".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the config file is unreadable or required settings are missing
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the bot token is missing or a numeric setting is invalid
    pub fn from_sources(fc: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = env("TELEGRAM_BOT_TOKEN")
            .or(fc.telegram.bot_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

        let telegram = TelegramConfig {
            bot_token,
            bot_username: env("TELEGRAM_BOT_USERNAME")
                .or(fc.telegram.bot_username)
                .map(|u| u.trim().trim_start_matches('@').to_string())
                .filter(|u| !u.is_empty()),
            keyword: env("JEONGHUNI_KEYWORD")
                .or(fc.telegram.keyword)
                .unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
            webhook_secret: env("TELEGRAM_WEBHOOK_SECRET").or(fc.telegram.webhook_secret),
            webhook_url: env("TELEGRAM_WEBHOOK_URL").or(fc.telegram.webhook_url),
            api_base: env("TELEGRAM_API_BASE")
                .or(fc.telegram.api_base)
                .filter(|b| !b.trim().is_empty()),
        };

        let llm = LlmConfig {
            base_url: env("LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            api_key: env("LLM_API_KEY")
                .or_else(|| env("OPENAI_API_KEY"))
                .or(fc.llm.api_key),
            model: env("LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            max_tokens: fc.llm.max_tokens,
            temperature: fc.llm.temperature,
            timeout_secs: fc.llm.timeout_secs.unwrap_or(60),
        };

        let max_turns = parse_env(&env, "JEONGHUNI_MAX_TURNS")?
            .or(fc.context.max_turns)
            .unwrap_or(MAX_CONTEXT);
        if max_turns == 0 {
            return Err(Error::Config("context.max_turns must be at least 1".to_string()));
        }
        let max_chats = parse_env(&env, "JEONGHUNI_MAX_CHATS")?
            .or(fc.context.max_chats)
            .and_then(NonZeroUsize::new);
        let context = ContextConfig {
            max_turns,
            max_chats,
        };

        let defaults = ReplyTexts::default();
        let replies = ReplyTexts {
            thinking: fc.replies.thinking.unwrap_or(defaults.thinking),
            bare_activation: fc.replies.bare_activation.unwrap_or(defaults.bare_activation),
            empty_completion: fc.replies.empty_completion.unwrap_or(defaults.empty_completion),
            failure: fc.replies.failure.unwrap_or(defaults.failure),
        };

        let prompts = PromptTable::new(
            fc.prompts.default.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            fc.prompts.automated.unwrap_or_else(|| AUTOMATED_PROMPT.to_string()),
            fc.prompts.senders,
        );

        let port = match parse_env(&env, "JEONGHUNI_PORT")? {
            Some(port) => Some(port),
            None => parse_env(&env, "PORT")?,
        }
        .or(fc.server.port)
        .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            telegram,
            llm,
            context,
            replies,
            prompts,
            port,
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{key} has an invalid value: {raw}")))
        })
        .transpose()
}
