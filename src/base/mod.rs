//! Core components, types, and utilities for the assistant.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling from the settings file and environment variables.
//! - System prompt templates for LLM interactions.
//! - Colored terminal output.
//! - Common types and result handling.

pub mod config;
pub mod output;
pub mod prompts;
pub mod types;
