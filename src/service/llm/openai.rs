//! Integration with OpenAI-compatible chat completion services.
//!
//! The client talks to any endpoint that speaks the chat completions protocol
//! (OpenAI itself, or Gemini through its compatibility endpoint), converting the
//! crate's provider-neutral transcript into `async-openai` request types.

use std::sync::Arc;
use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs, CreateChatCompletionResponse, FunctionCall,
        FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::base::{
    config::Config,
    types::{ChatMessage, ChatReply, Res, ToolCall, ToolDefinition, UsageMetrics},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI-compatible LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI-compatible LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.clone())
            .with_api_base(config.llm_api_base.trim_end_matches('/'));

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Helper function to make API calls with retry logic and timeout handling.
    async fn call_chat_api(&self, request_builder: CreateChatCompletionRequestArgs) -> Res<CreateChatCompletionResponse> {
        let max_retries = self.config.llm_max_retries;
        let mut retries = 0;

        loop {
            let request = request_builder.build()?;
            let result = timeout(Duration::from_secs(self.config.llm_timeout_secs), self.client.chat().create(request)).await;

            match result {
                Ok(Ok(response)) => {
                    info!("LLM API call succeeded after {} attempts", retries + 1);
                    return Ok(response);
                }
                Ok(Err(err)) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("LLM API call failed after {max_retries} retries: {err}"));
                    }
                    retries += 1;
                    warn!("LLM API call failed, retrying {retries}/{max_retries}: {err}");

                    tokio::time::sleep(retry_delay(retries)).await;
                }
                Err(_) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("LLM API call timed out after {} attempts", max_retries + 1));
                    }
                    retries += 1;
                    warn!("LLM API call timed out, retrying {retries}/{max_retries}");

                    tokio::time::sleep(retry_delay(retries)).await;
                }
            }
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    fn model(&self) -> &str {
        &self.config.llm_model
    }

    #[instrument(name = "OpenAiLlmClient::chat", skip_all, fields(model = %self.config.llm_model, messages = messages.len(), tools = tools.len()))]
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Res<ChatReply> {
        let messages = messages.iter().map(to_request_message).collect::<Res<Vec<_>>>()?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.config.llm_model)
            .messages(messages)
            .temperature(self.config.llm_temperature)
            .max_completion_tokens(self.config.llm_max_tokens);

        // Some compatible endpoints reject an empty tool list, so only send one when needed.
        if !tools.is_empty() {
            let tools = tools.iter().map(to_chat_tool).collect::<Res<Vec<_>>>()?;
            request.tools(tools);
        }

        let response = self.call_chat_api(request).await?;

        parse_chat_response(response)
    }
}

const RETRY_DELAY_MS: u64 = 1000;
const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Backoff before the given retry (1-based): doubles from one second, capped at a minute.
fn retry_delay(retry: u32) -> Duration {
    let factor = 2_u64.saturating_pow(retry.saturating_sub(1));
    Duration::from_millis(RETRY_DELAY_MS.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
}

/// Convert a transcript message to the `async-openai` request type.
fn to_request_message(message: &ChatMessage) -> Res<ChatCompletionRequestMessage> {
    let result = match message {
        ChatMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default().content(content.as_str()).build()?.into(),
        ChatMessage::User { content } => ChatCompletionRequestUserMessageArgs::default().content(content.as_str()).build()?.into(),
        ChatMessage::Assistant { content, tool_calls } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();

            if let Some(content) = content {
                args.content(content.as_str());
            }

            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }

            args.build()?.into()
        }
        ChatMessage::Tool { tool_call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.as_str())
            .content(content.as_str())
            .build()?
            .into(),
    };

    Ok(result)
}

/// Convert a tool definition to the `async-openai` function tool type.
fn to_chat_tool(tool: &ToolDefinition) -> Res<ChatCompletionTool> {
    let function = FunctionObjectArgs::default()
        .name(tool.name.as_str())
        .description(tool.description.as_str())
        .parameters(tool.parameters.clone())
        .build()?;

    Ok(ChatCompletionToolArgs::default().r#type(ChatCompletionToolType::Function).function(function).build()?)
}

/// Parse a chat completion response into a provider-neutral reply.
#[instrument(skip_all)]
pub fn parse_chat_response(response: CreateChatCompletionResponse) -> Res<ChatReply> {
    let usage = response
        .usage
        .map(|usage| UsageMetrics {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            successful_requests: 1,
        })
        .unwrap_or(UsageMetrics {
            successful_requests: 1,
            ..Default::default()
        });

    let choice = response.choices.into_iter().next().ok_or_else(|| anyhow::anyhow!("LLM response contained no choices."))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(anyhow::anyhow!("Request refused: {refusal}"));
    }

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect::<Vec<_>>();

    debug!("LLM response has {} tool calls, finish reason {:?}.", tool_calls.len(), choice.finish_reason);

    Ok(ChatReply {
        content: choice.message.content,
        tool_calls,
        usage,
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::base::config::ConfigInner;

    fn create_test_config() -> Config {
        Config::from(ConfigInner {
            llm_api_key: std::env::var("LEAD_GEN_LLM_API_KEY").unwrap_or_else(|_| "test_key".to_string()),
            llm_max_tokens: 200u32,
            llm_max_retries: 0,
            llm_timeout_secs: 30,
            ..Default::default()
        })
    }

    fn response_from_json(value: serde_json::Value) -> CreateChatCompletionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parse_text_response() {
        let response = response_from_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gemini-2.0-flash",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Ideal customer profile ..." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42 }
        }));

        let reply = parse_chat_response(response).unwrap();

        assert_eq!(reply.content.as_deref(), Some("Ideal customer profile ..."));
        assert!(reply.tool_calls.is_empty());
        assert_eq!(reply.usage.total_tokens, 42);
        assert_eq!(reply.usage.successful_requests, 1);
    }

    #[test]
    fn parse_tool_call_response() {
        let response = response_from_json(json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1,
            "model": "gemini-2.0-flash",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "web_search", "arguments": "{\"query\":\"retail analytics\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }));

        let reply = parse_chat_response(response).unwrap();

        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "web_search");
        assert_eq!(reply.tool_calls[0].arguments, "{\"query\":\"retail analytics\"}");
        assert_eq!(reply.usage.successful_requests, 1);
        assert_eq!(reply.usage.total_tokens, 0);
    }

    #[test]
    fn parse_response_without_choices_fails() {
        let response = response_from_json(json!({
            "id": "chatcmpl-3",
            "object": "chat.completion",
            "created": 1,
            "model": "gemini-2.0-flash",
            "choices": []
        }));

        assert!(parse_chat_response(response).is_err());
    }

    #[test]
    fn transcript_messages_convert() {
        let messages = [
            ChatMessage::system("persona"),
            ChatMessage::user("task"),
            ChatMessage::Assistant {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "web_search".to_string(),
                    arguments: "{}".to_string(),
                }],
            },
            ChatMessage::tool("call_1", "results"),
        ];

        let converted = messages.iter().map(to_request_message).collect::<Res<Vec<_>>>().unwrap();

        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(converted[3], ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn client_reports_configured_model() {
        let client = LlmClient::openai(&create_test_config());

        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    #[ignore = "requires LEAD_GEN_LLM_API_KEY and network access"]
    async fn test_llm_client_chat_live() {
        let client = LlmClient::openai(&create_test_config());

        let reply = client
            .chat(&[ChatMessage::system("You are terse."), ChatMessage::user("Name one B2B SaaS category.")], &[])
            .await
            .unwrap();

        assert!(!reply.content.unwrap_or_default().is_empty(), "Response should not be empty");
    }

    #[tokio::test]
    async fn test_llm_client_error_handling_unreachable_endpoint() {
        let config = Config::from(ConfigInner {
            llm_api_key: "invalid-key-for-testing".to_string(),
            llm_api_base: "http://127.0.0.1:9".to_string(),
            llm_max_retries: 0,
            llm_timeout_secs: 5,
            ..Default::default()
        });

        let client = LlmClient::openai(&config);
        let result = client.chat(&[ChatMessage::user("test")], &[]).await;

        assert!(result.is_err(), "Should fail against an unreachable endpoint");
    }

    #[tokio::test]
    async fn test_llm_client_retries_before_failing() {
        let config = Config::from(ConfigInner {
            llm_api_key: "invalid-key-for-testing".to_string(),
            llm_api_base: "http://127.0.0.1:9".to_string(),
            llm_max_retries: 1,
            llm_timeout_secs: 5,
            ..Default::default()
        });

        let client = LlmClient::openai(&config);
        let started = std::time::Instant::now();
        let err = client.chat(&[ChatMessage::user("test")], &[]).await.unwrap_err();

        assert!(err.to_string().contains("after 1 retries"), "unexpected error: {err}");
        assert!(started.elapsed() >= retry_delay(1), "Should back off before retrying");
    }

    #[test]
    fn retry_delay_doubles_and_saturates() {
        assert_eq!(retry_delay(1), Duration::from_secs(1));
        assert_eq!(retry_delay(2), Duration::from_secs(2));
        assert_eq!(retry_delay(4), Duration::from_secs(8));
        assert_eq!(retry_delay(7), Duration::from_secs(60));
        assert_eq!(retry_delay(100), Duration::from_secs(60));
        assert_eq!(retry_delay(u32::MAX), Duration::from_secs(60));
    }
}
