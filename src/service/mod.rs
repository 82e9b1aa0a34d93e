//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services the crew depends on:
//! - LLM services (e.g., OpenAI-compatible chat completions)
//! - Web search services (e.g., DuckDuckGo)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod llm;
pub mod search;
