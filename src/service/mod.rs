//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the assistant:
//! - LLM services (e.g., Anthropic, OpenAI)
//! - Project tracker services (e.g., Pivotal Tracker)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod llm;
pub mod tracker;
