// OpenAI API provider implementation
//
// Works with any OpenAI-compatible chat completions endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{with_retry, RetryPolicy};
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use super::LlmProvider;
use crate::config::constants::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Failures that decide whether a request is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("OpenAI API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to send request to OpenAI API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OpenAI returned no choices in response")]
    EmptyResponse,
}

impl ProviderError {
    /// Rate limits, server errors and connection problems are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ProviderError::Transport(e) => e.is_timeout() || e.is_connect(),
            ProviderError::EmptyResponse => false,
        }
    }
}

fn is_retryable(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ProviderError>()
        .map_or(false, ProviderError::is_retryable)
}

/// OpenAI-compatible API provider
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    /// Provider for api.openai.com with the default model
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(api_key, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL)
    }

    pub fn new(api_key: String, base_url: &str, default_model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn to_openai_request(&self, request: &ChatRequest) -> OpenAIRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        OpenAIRequest {
            model,
            messages: request.messages.clone(),
            temperature: request.temperature,
        }
    }

    fn from_openai_response(response: OpenAIResponse) -> Result<ChatResponse, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(ChatResponse {
            model: response.model,
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }

    /// Send a single request (no retry)
    async fn complete_once(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let openai_request = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!("Sending request to OpenAI API: model={}", openai_request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body }.into());
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        Ok(Self::from_openai_response(openai_response)?)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        with_retry(self.retry, is_retryable, || self.complete_once(request)).await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Clone, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
