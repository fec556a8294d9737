// LLM provider support
//
// Abstraction over chat-completion APIs so the example generator does not
// depend on a particular vendor.

use anyhow::Result;
use async_trait::async_trait;

pub mod openai;
pub mod retry;
pub mod types;

pub use openai::{OpenAIProvider, ProviderError};
pub use retry::{with_retry, RetryPolicy};
pub use types::{ChatMessage, ChatRequest, ChatResponse};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the conversation and wait for the full completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Provider name for logs and metrics (e.g. "openai")
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;
}
