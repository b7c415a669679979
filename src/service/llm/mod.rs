pub mod anthropic;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tracing::{error, instrument};

use crate::base::{
    config::{Config, LlmProvider},
    types::{ChatMessage, Res},
};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with a hosted completion service.
/// Implementing this trait allows different LLM providers to be used by the assistant.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate a completion from a system prompt and an ordered transcript.
    ///
    /// Returns the first text segment of the response. Transport, authentication,
    /// and decoding failures are returned as errors.
    async fn complete(&self, system_prompt: &str, messages: &[ChatMessage]) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }

    /// Build the client for the provider selected in the configuration.
    pub fn from_config(config: &Config) -> Res<Self> {
        match config.ai_provider {
            LlmProvider::Anthropic => LlmClient::anthropic(config),
            LlmProvider::OpenAi => Ok(LlmClient::openai(config)),
        }
    }

    /// Generate a completion, degrading any failure to an empty answer.
    ///
    /// Callers cannot tell a failed call from a model that returned nothing.
    #[instrument(name = "LlmClient::complete_or_empty", skip_all)]
    pub async fn complete_or_empty(&self, system_prompt: &str, messages: &[ChatMessage]) -> String {
        match self.complete(system_prompt, messages).await {
            Ok(text) => text,
            Err(err) => {
                error!("Error calling AI: {err:#}");
                String::new()
            }
        }
    }
}
