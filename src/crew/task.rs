use serde::{Deserialize, Serialize};

use crate::base::{prompts, types::UsageMetrics};

/// A unit of work assigned to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique name within a crew; dependencies refer to tasks by name.
    pub name: String,
    pub description: String,
    pub expected_output: Option<String>,
    /// Role of the agent that performs the task.
    pub agent: String,
    /// Names of earlier tasks whose outputs this task needs.
    pub dependencies: Vec<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: None,
            agent: agent.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = Some(expected_output.into());
        self
    }

    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        self.dependencies.push(task.into());
        self
    }

    /// The user message an agent receives for this task.
    pub fn prompt(&self, context: Option<&str>) -> String {
        prompts::task_prompt(&self.description, self.expected_output.as_deref(), context)
    }
}

/// The result of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub name: String,
    pub agent: String,
    pub raw: String,
    pub usage: UsageMetrics,
    /// Model calls the agent made, including a forced final answer.
    pub iterations: u32,
}
