pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ChatMessage, ChatReply, Res, ToolDefinition};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to drive the crew's agents.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// The model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send one chat request and return the model's reply.
    ///
    /// The `tools` slice lists the tools the model may call; when it is empty the
    /// request is sent without tools and the reply is expected to be plain text.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Res<ChatReply>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
