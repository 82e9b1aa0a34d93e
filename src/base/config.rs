//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::Path, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Environment variable prefix for every configuration key.
pub const ENV_PREFIX: &str = "LEAD_GEN";

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".hidden/config.toml";

/// Default OpenAI-compatible API base (Gemini's compatibility endpoint).
fn default_llm_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

/// Default model to use for every agent.
fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default sampling temperature.
fn default_llm_temperature() -> f32 {
    0.7
}

/// Default max output tokens per request.
fn default_llm_max_tokens() -> u32 {
    8192
}

fn default_llm_max_retries() -> u32 {
    3
}

fn default_llm_timeout_secs() -> u64 {
    120
}

/// Default number of model calls an agent may make for a single task.
fn default_agent_max_iterations() -> u32 {
    10
}

fn default_search_enabled() -> bool {
    true
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

fn default_search_max_results() -> usize {
    5
}

fn default_qualification_task_directive() -> String {
    prompts::QUALIFICATION_TASK_DIRECTIVE.to_string()
}

fn default_research_task_directive() -> String {
    prompts::RESEARCH_TASK_DIRECTIVE.to_string()
}

fn default_email_task_directive() -> String {
    prompts::EMAIL_TASK_DIRECTIVE.to_string()
}

/// Configuration for the lead-generation crew.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// API key for the LLM provider (`LEAD_GEN_LLM_API_KEY`).
    #[serde(default)]
    pub llm_api_key: String,
    /// Base URL of an OpenAI-compatible chat completions API (`LEAD_GEN_LLM_API_BASE`).
    #[serde(default = "default_llm_api_base")]
    pub llm_api_base: String,
    /// Model used by every agent (`LEAD_GEN_LLM_MODEL`).
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Sampling temperature (`LEAD_GEN_LLM_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    /// Max output tokens per request (`LEAD_GEN_LLM_MAX_TOKENS`).
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,
    /// Retries for a failed or timed out request (`LEAD_GEN_LLM_MAX_RETRIES`).
    #[serde(default = "default_llm_max_retries")]
    pub llm_max_retries: u32,
    /// Per-request timeout in seconds (`LEAD_GEN_LLM_TIMEOUT_SECS`).
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Model calls an agent may make for one task before it must answer (`LEAD_GEN_AGENT_MAX_ITERATIONS`).
    #[serde(default = "default_agent_max_iterations")]
    pub agent_max_iterations: u32,
    /// Whether agents get the web search tool (`LEAD_GEN_SEARCH_ENABLED`).
    #[serde(default = "default_search_enabled")]
    pub search_enabled: bool,
    /// DuckDuckGo Instant Answer endpoint (`LEAD_GEN_SEARCH_ENDPOINT`).
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
    /// Related topics included per search (`LEAD_GEN_SEARCH_MAX_RESULTS`).
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
    /// Optional custom qualification directive; must contain `{business_description}`.
    #[serde(default = "default_qualification_task_directive")]
    pub qualification_task_directive: String,
    /// Optional custom research directive.
    #[serde(default = "default_research_task_directive")]
    pub research_task_directive: String,
    /// Optional custom email drafting directive.
    #[serde(default = "default_email_task_directive")]
    pub email_task_directive: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base: default_llm_api_base(),
            llm_model: default_llm_model(),
            llm_temperature: default_llm_temperature(),
            llm_max_tokens: default_llm_max_tokens(),
            llm_max_retries: default_llm_max_retries(),
            llm_timeout_secs: default_llm_timeout_secs(),
            agent_max_iterations: default_agent_max_iterations(),
            search_enabled: default_search_enabled(),
            search_endpoint: default_search_endpoint(),
            search_max_results: default_search_max_results(),
            qualification_task_directive: default_qualification_task_directive(),
            research_task_directive: default_research_task_directive(),
            email_task_directive: default_email_task_directive(),
        }
    }
}

impl Config {
    /// Load the configuration from a TOML file and `LEAD_GEN_*` environment variables.
    ///
    /// Environment variables take precedence over the file. The result is validated,
    /// so a missing API key fails here, before any client is constructed.
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            cfg = cfg.add_source(config::File::with_name(DEFAULT_CONFIG_PATH));
        }

        cfg = cfg.add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_"));

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the configuration for missing credentials and out-of-range values.
    pub fn validate(&self) -> Void {
        if self.llm_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "LLM API key is not set. Please set `{ENV_PREFIX}_LLM_API_KEY` in the environment or add it to your .env file."
            ));
        }

        if self.llm_api_base.trim().is_empty() {
            return Err(anyhow::anyhow!("LLM API base must not be empty."));
        }

        if self.llm_model.trim().is_empty() {
            return Err(anyhow::anyhow!("LLM model must not be empty."));
        }

        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(anyhow::anyhow!("LLM temperature must be between 0 and 2."));
        }

        if self.llm_max_tokens < 1 || self.llm_max_tokens > 128000 {
            return Err(anyhow::anyhow!("LLM max tokens must be between 1 and 128000."));
        }

        if self.llm_timeout_secs == 0 {
            return Err(anyhow::anyhow!("LLM timeout must be at least one second."));
        }

        if self.agent_max_iterations < 1 {
            return Err(anyhow::anyhow!("Agent max iterations must be at least 1."));
        }

        if self.search_max_results < 1 {
            return Err(anyhow::anyhow!("Search max results must be at least 1."));
        }

        if !self.qualification_task_directive.contains(prompts::BUSINESS_DESCRIPTION_PLACEHOLDER) {
            return Err(anyhow::anyhow!(
                "Qualification task directive must contain the `{}` placeholder.",
                prompts::BUSINESS_DESCRIPTION_PLACEHOLDER
            ));
        }

        Ok(())
    }
}

// Tests.
