pub mod duckduckgo;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic web search trait that search backends must implement.
///
/// Agents reach this through the `web_search` tool, so the returned string is
/// fed straight back to the model and should be readable text.
#[async_trait]
pub trait GenericSearchClient: Send + Sync + 'static {
    /// A short name for the backend, used in logs.
    fn name(&self) -> &str;

    /// Run a search and return the formatted results.
    async fn search(&self, query: &str) -> Res<String>;
}

// Structs.

/// Search client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<dyn GenericSearchClient>,
}

impl Deref for SearchClient {
    type Target = dyn GenericSearchClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl SearchClient {
    pub fn new(inner: Arc<dyn GenericSearchClient>) -> Self {
        Self { inner }
    }
}
