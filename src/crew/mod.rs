//! A small sequential crew executor.
//!
//! A crew owns a list of agents and an ordered list of tasks. Kicking it off
//! runs each task, in order, with the agent named by the task, feeding the
//! outputs of earlier tasks forward as context.

pub mod agent;
pub mod task;
pub mod tools;

use std::{collections::HashSet, fmt};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    base::types::{Res, UsageMetrics},
    runtime::Runtime,
};

use agent::Agent;
use task::{Task, TaskOutput};

/// Separator between context blocks when a task has several dependencies.
const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// A validated set of agents and tasks, executed sequentially.
#[derive(Debug, Clone)]
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl Crew {
    /// Create a crew, checking that the tasks can run in the given order.
    ///
    /// Every task must name an agent in the crew, task names must be unique, and
    /// every dependency must name a task that appears earlier in the list.
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Res<Self> {
        if tasks.is_empty() {
            return Err(anyhow::anyhow!("A crew needs at least one task."));
        }

        let roles = agents.iter().map(|a| a.role.as_str()).collect::<HashSet<_>>();
        let mut seen = HashSet::new();

        for task in &tasks {
            if !roles.contains(task.agent.as_str()) {
                return Err(anyhow::anyhow!("Task `{}` is assigned to unknown agent `{}`.", task.name, task.agent));
            }

            for dependency in &task.dependencies {
                if !seen.contains(dependency.as_str()) {
                    return Err(anyhow::anyhow!("Task `{}` depends on `{dependency}`, which does not run before it.", task.name));
                }
            }

            if !seen.insert(task.name.as_str()) {
                return Err(anyhow::anyhow!("Duplicate task name `{}`.", task.name));
            }
        }

        Ok(Self { agents, tasks })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn agent(&self, role: &str) -> Res<&Agent> {
        self.agents
            .iter()
            .find(|a| a.role == role)
            .ok_or_else(|| anyhow::anyhow!("Unknown agent `{role}`."))
    }

    /// Run every task in order and collect the outputs.
    #[instrument(name = "Crew::kickoff", skip_all, fields(tasks = self.tasks.len()))]
    pub async fn kickoff(&self, runtime: &Runtime) -> Res<CrewOutput> {
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut usage = UsageMetrics::default();

        for (index, task) in self.tasks.iter().enumerate() {
            let agent = self.agent(&task.agent)?;
            info!("[{}/{}] {} working on `{}` ...", index + 1, self.tasks.len(), agent.role, task.name);

            let context = task_context(task, &outputs);
            let prompt = task.prompt(context.as_deref());

            let execution = agent.execute(&prompt, runtime).await.with_context(|| format!("Task `{}` failed", task.name))?;

            info!("`{}` completed in {} model calls ({} tokens).", task.name, execution.iterations, execution.usage.total_tokens);

            usage += execution.usage;
            outputs.push(TaskOutput {
                name: task.name.clone(),
                agent: agent.role.clone(),
                raw: execution.output,
                usage: execution.usage,
                iterations: execution.iterations,
            });
        }

        Ok(CrewOutput { tasks: outputs, usage })
    }
}

/// Gather the context a task receives from tasks that already ran.
///
/// Declared dependencies win; a task without any gets the previous task's output.
fn task_context(task: &Task, outputs: &[TaskOutput]) -> Option<String> {
    if task.dependencies.is_empty() {
        return outputs.last().map(|o| o.raw.clone());
    }

    let blocks = task
        .dependencies
        .iter()
        .filter_map(|name| outputs.iter().find(|o| &o.name == name))
        .map(|o| o.raw.as_str())
        .collect::<Vec<_>>();

    if blocks.is_empty() { None } else { Some(blocks.join(CONTEXT_SEPARATOR)) }
}

/// The outputs of a whole crew run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Task outputs, in execution order.
    pub tasks: Vec<TaskOutput>,
    pub usage: UsageMetrics,
}

impl CrewOutput {
    /// The final task's output.
    pub fn raw(&self) -> &str {
        self.tasks.last().map(|t| t.raw.as_str()).unwrap_or_default()
    }

    /// Render every task's output as a Markdown report.
    pub fn to_markdown(&self) -> String {
        let mut report = format!("# Lead Generation Report\n\n_Generated {}_\n", chrono::Utc::now().to_rfc3339());

        for task in &self.tasks {
            report.push_str(&format!("\n## {} ({}, {} model calls)\n\n{}\n", task.name, task.agent, task.iterations, task.raw));
        }

        report.push_str(&format!(
            "\n---\n\nRequests: {}, prompt tokens: {}, completion tokens: {}, total tokens: {}\n",
            self.usage.successful_requests, self.usage.prompt_tokens, self.usage.completion_tokens, self.usage.total_tokens
        ));

        report
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

// Tests.
