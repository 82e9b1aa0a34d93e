//! Core components, types, and utilities for the lead-generation crew.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Agent personas, task directives, and prompt scaffolding.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
