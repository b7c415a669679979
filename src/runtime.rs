//! Runtime services and shared state for the assistant.

use tracing::instrument;

use crate::{
    base::{config::Config, prompts::Prompts, types::Res},
    interaction::query,
    service::{llm::LlmClient, tracker::TrackerClient},
};

/// Runtime service context.
///
/// This struct holds the configuration and the constructed clients.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The prompt template resolver.
    pub prompts: Prompts,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The tracker client instance.
    pub tracker: TrackerClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        let prompts = Prompts::from_config(&config);
        let llm = LlmClient::from_config(&config)?;
        let tracker = TrackerClient::pivotal(&config)?;

        Ok(Self { config, prompts, llm, tracker })
    }

    /// Answer a single query.
    pub async fn handle_input(&self, user_input: &str) -> String {
        query::handle_query(user_input, &self.prompts, &self.llm, &self.tracker).await
    }
}
