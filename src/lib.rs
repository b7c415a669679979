//! Library root for `tracker-assistant`.
//!
//! Tracker-assistant is an LLM-powered command-line helper that answers questions
//! about a Pivotal Tracker project:
//! - Classifies the query with a `default` prompt
//! - Fetches `started` or `unstarted` stories when the classification asks for them
//! - Re-answers strictly from that data with a `detail` prompt
//!
//! The architecture is built around traits for the completion and tracker services,
//! so each can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Res};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Builds the runtime from the configuration and answers `query`.
pub async fn start(config: Config, query: &str) -> Res<String> {
    info!("Starting tracker-assistant ...");

    let runtime = runtime::Runtime::new(config)?;

    Ok(runtime.handle_input(query).await)
}
