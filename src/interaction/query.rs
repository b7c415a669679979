//! Two-stage routing of a user query.
//!
//! The query is first classified with the `default` prompt. A reply of exactly
//! `started` or `unstarted` triggers a second, data-grounded call with the `detail`
//! prompt; any other reply is the final answer.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    base::{
        output,
        prompts::{PromptKind, Prompts},
        types::{ChatMessage, StoryState},
    },
    service::{llm::LlmClient, tracker::TrackerClient},
};

const DATA_PREAMBLE: &str = "Here is the data you must use to answer my question:";
const DATA_ACKNOWLEDGEMENT: &str = "Understood, I will use this data to answer your questions. What would you like to know?";
const DATA_INSISTENCE: &str = "It is of utmost importance that your answer is based solely on this data!";
const INSISTENCE_ACKNOWLEDGEMENT: &str = "I understand. I will answer your questions strictly based on the provided data. What would you like to know?";

/// Where a classification response sends the query next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Re-answer from tracker stories in the given state.
    Stories(StoryState),
    /// The classification response is already the answer.
    Direct,
}

/// Interpret a classification response.
///
/// Only the exact tokens `started` and `unstarted` route to the detail stage.
pub fn classify_intent(response: &str) -> Intent {
    match response {
        "started" => Intent::Stories(StoryState::Started),
        "unstarted" => Intent::Stories(StoryState::Unstarted),
        other => {
            let normalized = other.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.').to_ascii_lowercase();

            if normalized == StoryState::Started.as_str() || normalized == StoryState::Unstarted.as_str() {
                warn!("Classification response `{other}` nearly matches `{normalized}`; treating it as a direct answer.");
            }

            Intent::Direct
        }
    }
}

/// Build the transcript that grounds the detail answer in `stories`.
pub fn detail_transcript(user_input: &str, stories: &[Value]) -> Vec<ChatMessage> {
    let data = Value::Array(stories.to_vec());

    vec![
        ChatMessage::user(format!("{DATA_PREAMBLE} {data}")),
        ChatMessage::assistant(DATA_ACKNOWLEDGEMENT),
        ChatMessage::user(DATA_INSISTENCE),
        ChatMessage::assistant(INSISTENCE_ACKNOWLEDGEMENT),
        ChatMessage::user(user_input),
    ]
}

/// Classification stage: answer the raw query with the `default` prompt.
#[instrument(skip_all)]
pub async fn call_default(user_input: &str, prompts: &Prompts, llm: &LlmClient) -> String {
    output::progress("call_default");

    let system_prompt = prompts.get_system_prompt(PromptKind::Default);
    let messages = vec![ChatMessage::user(user_input)];

    let response = llm.complete_or_empty(&system_prompt, &messages).await;

    output::heading("call_default_response:");
    output::intermediate(&response);

    response
}

/// Detail stage: answer strictly from the tracker stories in `state`.
#[instrument(skip(user_input, prompts, llm, tracker))]
pub async fn call_detail(user_input: &str, state: StoryState, prompts: &Prompts, llm: &LlmClient, tracker: &TrackerClient) -> String {
    output::progress("call_detail");

    let system_prompt = prompts.get_system_prompt(PromptKind::Detail);
    let stories = tracker.stories_or_empty(state).await;

    info!("Answering from {} `{state}` stories", stories.len());

    let messages = detail_transcript(user_input, &stories);

    llm.complete_or_empty(&system_prompt, &messages).await
}

/// Route a query through classification and, when asked for, the detail stage.
#[instrument(skip_all)]
pub async fn handle_query(user_input: &str, prompts: &Prompts, llm: &LlmClient, tracker: &TrackerClient) -> String {
    let classification = call_default(user_input, prompts, llm).await;

    match classify_intent(&classification) {
        Intent::Stories(state) => call_detail(user_input, state, prompts, llm, tracker).await,
        Intent::Direct => classification,
    }
}
