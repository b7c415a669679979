//! Anthropic Messages API client.
//!
//! Sends the system prompt and transcript to `/v1/messages` and returns the first
//! text block of the reply.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{ChatMessage, Res, Role},
};

use super::{GenericLlmClient, LlmClient};

/// Default Anthropic API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
pub const API_VERSION: &str = "2023-06-01";

// Extra methods on `LlmClient` applied by the anthropic implementation.

impl LlmClient {
    pub fn anthropic(config: &Config) -> Res<Self> {
        let client = AnthropicLlmClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: Role,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "text")]
struct ContentBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

// Specific implementations.

/// Anthropic LLM client implementation.
#[derive(Clone)]
pub struct AnthropicLlmClient {
    client: Client,
    api_base: String,
    config: Config,
}

impl AnthropicLlmClient {
    /// Create a new Anthropic LLM client.
    #[instrument(name = "AnthropicLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let api_base = config.ai_api_base.as_deref().unwrap_or(DEFAULT_API_BASE).trim_end_matches('/').to_string();

        Ok(Self {
            client: Client::builder().build()?,
            api_base,
            config: config.clone(),
        })
    }

    fn build_request<'a>(&'a self, system_prompt: &'a str, messages: &'a [ChatMessage]) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.ai_model,
            max_tokens: self.config.ai_max_tokens,
            temperature: self.config.ai_temperature,
            system: system_prompt,
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role,
                    content: vec![ContentBlock { text: &m.content }],
                })
                .collect(),
        }
    }
}

#[async_trait]
impl GenericLlmClient for AnthropicLlmClient {
    #[instrument(name = "AnthropicLlmClient::complete", skip_all)]
    async fn complete(&self, system_prompt: &str, messages: &[ChatMessage]) -> Res<String> {
        debug!("Sending {} messages to model `{}`", messages.len(), self.config.ai_model);

        let request = self.build_request(system_prompt, messages);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.config.ai_api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(anyhow::anyhow!("Anthropic API error ({}): {}", err.error.error_type, err.error.message));
            }

            return Err(anyhow::anyhow!("Anthropic API error (HTTP {status}): {body}"));
        }

        let response: MessagesResponse = response.json().await?;

        Ok(first_text(response))
    }
}

/// The first text block of a response, or an empty string when there is none.
fn first_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .unwrap_or_default()
}
