//! OpenAI chat completions client.
//!
//! The system prompt is sent as a leading system message, followed by the
//! transcript as user / assistant messages.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{ChatMessage, Res, Role},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let mut cfg = OpenAIConfig::new().with_api_key(config.ai_api_key.clone());

        if let Some(api_base) = &config.ai_api_base {
            cfg = cfg.with_api_base(api_base.trim_end_matches('/'));
        }

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the chat completion request.
    #[instrument(name = "OpenAiLlmClient::build_request", skip_all)]
    fn build_request(&self, system_prompt: &str, messages: &[ChatMessage]) -> Res<CreateChatCompletionRequest> {
        let mut input: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(messages.len() + 1);

        input.push(ChatCompletionRequestSystemMessageArgs::default().content(system_prompt).build()?.into());

        for message in messages {
            let message: ChatCompletionRequestMessage = match message.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default().content(message.content.as_str()).build()?.into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default().content(message.content.as_str()).build()?.into(),
            };

            input.push(message);
        }

        Ok(CreateChatCompletionRequestArgs::default()
            .model(&self.config.ai_model)
            .messages(input)
            .temperature(self.config.ai_temperature)
            .max_completion_tokens(self.config.ai_max_tokens)
            .build()?)
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, system_prompt: &str, messages: &[ChatMessage]) -> Res<String> {
        debug!("Sending {} messages to model `{}`", messages.len(), self.config.ai_model);

        let request = self.build_request(system_prompt, messages)?;
        let response = self.client.chat().create(request).await?;

        Ok(response.choices.into_iter().next().and_then(|choice| choice.message.content).unwrap_or_default())
    }
}
