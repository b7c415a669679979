//! User interactions for the assistant.
//!
//! This module coordinates the services (prompts, LLM, tracker) to turn a
//! natural-language query into a final answer.

pub mod query;
