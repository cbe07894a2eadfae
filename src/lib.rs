//! Jeonghuni - conversational Telegram bot backed by an LLM
//!
//! This library provides the core functionality for the bot:
//! - Activation policy (when the bot speaks in a group, what text it answers)
//! - Bounded per-chat conversation history
//! - Sender-keyed system instructions
//! - Completion orchestration against an OpenAI-compatible endpoint
//! - Telegram webhook intake and Bot API delivery
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Telegram (webhook / Bot API)              │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Jeonghuni                         │
//! │  Activation  │  Context Store  │  Prompts  │  API   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        OpenAI-compatible completion service         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod activation;
pub mod api;
pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompt;

pub use activation::{ActivationPolicy, BotIdentity};
pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use channels::{Channel, TelegramChannel};
pub use config::Config;
pub use context::{ChatId, ContextStore, MAX_CONTEXT, Role, Turn};
pub use error::{Error, Result};
pub use llm::{CompletionClient, OpenAiCompletionClient};
pub use orchestrator::Responder;
pub use prompt::PromptTable;
