//! Agents: a persona that works a task through an LLM conversation.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        prompts,
        types::{ChatMessage, Res, UsageMetrics},
    },
    runtime::Runtime,
};

use super::tools::{invoke_tool, web_search_tool};

/// A role/goal/backstory persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Whether the agent may call tools (when the runtime provides any).
    pub allow_tools: bool,
}

/// What an agent produced for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentExecution {
    pub output: String,
    pub usage: UsageMetrics,
    /// Number of model calls made, including a forced final answer.
    pub iterations: u32,
}

impl Agent {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_tools: false,
        }
    }

    pub fn with_tools(mut self, allow_tools: bool) -> Self {
        self.allow_tools = allow_tools;
        self
    }

    /// Work a task prompt to a final answer.
    ///
    /// The model may call tools; each round of tool calls is answered and the
    /// conversation continues, up to `agent_max_iterations` model calls. After
    /// that, the agent is told to stop using tools and answer.
    #[instrument(name = "Agent::execute", skip_all, fields(role = %self.role))]
    pub async fn execute(&self, task_prompt: &str, runtime: &Runtime) -> Res<AgentExecution> {
        let search = runtime.search.as_ref();
        let has_tools = self.allow_tools && search.is_some();
        let tools = if has_tools { vec![web_search_tool().clone()] } else { Vec::new() };

        let mut messages = vec![ChatMessage::system(prompts::agent_system_prompt(&self.role, &self.goal, &self.backstory, has_tools)), ChatMessage::user(task_prompt)];
        let mut usage = UsageMetrics::default();
        let max_iterations = runtime.config.agent_max_iterations;

        for iteration in 1..=max_iterations {
            let reply = runtime.llm.chat(&messages, &tools).await?;
            usage += reply.usage;

            if reply.tool_calls.is_empty() {
                info!("{} finished after {iteration} model calls.", self.role);
                return Ok(AgentExecution {
                    output: final_answer(&self.role, reply.content)?,
                    usage,
                    iterations: iteration,
                });
            }

            info!("{} requested {} tool calls ({iteration}/{max_iterations}).", self.role, reply.tool_calls.len());

            let tool_calls = reply.tool_calls;
            messages.push(ChatMessage::Assistant {
                content: reply.content,
                tool_calls: tool_calls.clone(),
            });

            for call in &tool_calls {
                let output = invoke_tool(call, search).await;
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }

        warn!("{} hit the iteration limit; forcing a final answer.", self.role);

        messages.push(ChatMessage::user(prompts::FORCE_FINAL_ANSWER));
        let reply = runtime.llm.chat(&messages, &[]).await?;
        usage += reply.usage;

        Ok(AgentExecution {
            output: final_answer(&self.role, reply.content)?,
            usage,
            iterations: max_iterations + 1,
        })
    }
}

fn final_answer(role: &str, content: Option<String>) -> Res<String> {
    let output = content.map(|c| c.trim().to_string()).unwrap_or_default();

    if output.is_empty() {
        return Err(anyhow::anyhow!("{role} returned an empty answer."));
    }

    Ok(output)
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_answer_trims_and_rejects_empty() {
        assert_eq!(final_answer("Researcher", Some("  leads \n".to_string())).unwrap(), "leads");
        assert!(final_answer("Researcher", Some("   ".to_string())).is_err());
        assert!(final_answer("Researcher", None).is_err());
    }

    #[test]
    fn agents_default_to_no_tools() {
        let agent = Agent::new("Role", "Goal", "Backstory");
        assert!(!agent.allow_tools);
        assert!(agent.with_tools(true).allow_tools);
    }
}
