//! Tools agents may call mid-conversation.

use std::sync::OnceLock;

use tracing::{info, instrument, warn};

use crate::{
    base::types::{Res, ToolCall, ToolDefinition, WebSearchArgs},
    service::search::SearchClient,
};

/// Name of the web search tool.
pub const WEB_SEARCH_TOOL: &str = "web_search";

static WEB_SEARCH_TOOL_DEFINITION: OnceLock<ToolDefinition> = OnceLock::new();

/// Get the web search tool definition.
pub fn web_search_tool() -> &'static ToolDefinition {
    WEB_SEARCH_TOOL_DEFINITION.get_or_init(|| ToolDefinition {
        name: WEB_SEARCH_TOOL.to_string(),
        description: "Search the web for companies, people, and recent news. Returns a short summary and related links.".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The search query, e.g. a company name plus \"funding news\"." },
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    })
}

/// Run a tool call and produce the text to hand back to the model.
///
/// Failures are reported to the model as text rather than aborting the task, so
/// the agent can retry with a different query or answer without the tool.
#[instrument(skip_all, fields(tool = %call.name))]
pub async fn invoke_tool(call: &ToolCall, search: Option<&SearchClient>) -> String {
    match try_invoke_tool(call, search).await {
        Ok(output) => output,
        Err(err) => {
            warn!("Tool call `{}` failed: {err:#}", call.name);
            format!("Error: {err:#}")
        }
    }
}

async fn try_invoke_tool(call: &ToolCall, search: Option<&SearchClient>) -> Res<String> {
    match call.name.as_str() {
        WEB_SEARCH_TOOL => {
            let search = search.ok_or_else(|| anyhow::anyhow!("web search is not available"))?;
            let WebSearchArgs { query } = serde_json::from_str(&call.arguments)?;

            info!("Searching {} for `{query}` ...", search.name());

            search.search(&query).await
        }
        other => Err(anyhow::anyhow!("unknown tool `{other}`")),
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn web_search_definition_requires_query() {
        let tool = web_search_tool();

        assert_eq!(tool.name, WEB_SEARCH_TOOL);
        assert_eq!(tool.parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn unknown_tool_reports_error_text() {
        let output = invoke_tool(&call("send_email", "{}"), None).await;

        assert!(output.starts_with("Error:"));
        assert!(output.contains("send_email"));
    }

    #[tokio::test]
    async fn search_without_client_reports_error_text() {
        let output = invoke_tool(&call(WEB_SEARCH_TOOL, r#"{"query":"acme"}"#), None).await;

        assert!(output.contains("not available"));
    }
}
