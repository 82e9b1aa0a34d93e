//! Runtime services and shared state for the lead-generation crew.

use tracing::{info, instrument, warn};

use crate::{
    base::{config::Config, types::Res},
    service::{llm::LlmClient, search::SearchClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the LLM client, and the optional search client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The web search client, if search is enabled and available.
    pub search: Option<SearchClient>,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// The configuration is validated first, so a missing API key fails here
    /// without any client being constructed.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        config.validate()?;

        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);
        info!("Initialized LLM client for model `{}`", llm.model());

        // Initialize the search client; agents run without tools if this fails.
        let search = if config.search_enabled {
            match SearchClient::duckduckgo(&config) {
                Ok(search) => {
                    info!("Initialized {} search client", search.name());
                    Some(search)
                }
                Err(err) => {
                    warn!("Error initializing search client, continuing without tools: {err}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self { config, llm, search })
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::ConfigInner;

    #[test]
    fn runtime_requires_api_key() {
        let result = Runtime::new(Config::from(ConfigInner::default()));

        assert!(result.is_err());
    }

    #[test]
    fn runtime_respects_search_toggle() {
        let config = Config::from(ConfigInner {
            llm_api_key: "test_key".to_string(),
            search_enabled: false,
            ..Default::default()
        });

        let runtime = Runtime::new(config).unwrap();

        assert!(runtime.search.is_none());
        assert_eq!(runtime.llm.model(), "gemini-2.0-flash");
    }

    #[test]
    fn runtime_builds_search_client_by_default() {
        let config = Config::from(ConfigInner {
            llm_api_key: "test_key".to_string(),
            ..Default::default()
        });

        let runtime = Runtime::new(config).unwrap();

        assert!(runtime.search.is_some());
    }

    #[test]
    fn runtime_continues_without_search_when_client_fails() {
        let config = Config::from(ConfigInner {
            llm_api_key: "test_key".to_string(),
            search_endpoint: "not a url".to_string(),
            ..Default::default()
        });

        let runtime = Runtime::new(config).unwrap();

        assert!(runtime.search.is_none());
    }
}
