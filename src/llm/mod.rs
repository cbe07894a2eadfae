//! Completion service abstraction
//!
//! The orchestrator only needs "instruction + ordered turns in, text out";
//! anything that can do that implements [`CompletionClient`].

mod openai;

pub use openai::OpenAiCompletionClient;

use async_trait::async_trait;

use crate::Result;
use crate::context::Turn;

/// Language-model completion collaborator
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Generate a reply for the conversation
    ///
    /// Returns the generated text, which may be empty when the service
    /// produced nothing usable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Completion`] on transport, quota or model failures
    async fn complete(&self, system_instruction: &str, turns: &[Turn]) -> Result<String>;
}
