//! The lead-generation crew: qualify, research, then draft outreach.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        prompts::{self, BUSINESS_DESCRIPTION_VAR},
        types::Res,
    },
    crew::{Crew, CrewOutput, agent::Agent, task::Task},
    runtime::Runtime,
};

pub const DEFINE_CRITERIA_TASK: &str = "define_criteria";
pub const FIND_LEADS_TASK: &str = "find_leads";
pub const CREATE_EMAILS_TASK: &str = "create_emails";

/// A three-agent crew built around one business description.
#[derive(Debug, Clone)]
pub struct LeadGenerationCrew {
    business_description: String,
}

impl LeadGenerationCrew {
    pub fn new(business_description: impl Into<String>) -> Res<Self> {
        let business_description = business_description.into();

        if business_description.trim().is_empty() {
            return Err(anyhow::anyhow!("Business description must not be empty."));
        }

        info!("LeadGenerationCrew initialized with business description");

        Ok(Self { business_description })
    }

    pub fn business_description(&self) -> &str {
        &self.business_description
    }

    /// The qualifier, researcher, and email specialist, in that order.
    pub fn create_agents(&self) -> (Agent, Agent, Agent) {
        let lead_qualifier = Agent::new(prompts::LEAD_QUALIFIER_ROLE, prompts::LEAD_QUALIFIER_GOAL, prompts::LEAD_QUALIFIER_BACKSTORY).with_tools(true);
        let lead_researcher = Agent::new(prompts::LEAD_RESEARCHER_ROLE, prompts::LEAD_RESEARCHER_GOAL, prompts::LEAD_RESEARCHER_BACKSTORY).with_tools(true);
        let email_specialist = Agent::new(prompts::EMAIL_SPECIALIST_ROLE, prompts::EMAIL_SPECIALIST_GOAL, prompts::EMAIL_SPECIALIST_BACKSTORY).with_tools(true);

        (lead_qualifier, lead_researcher, email_specialist)
    }

    /// The three tasks, each depending on the one before it.
    pub fn create_tasks(&self, config: &Config) -> Vec<Task> {
        let qualification = prompts::render(&config.qualification_task_directive, &[(BUSINESS_DESCRIPTION_VAR, self.business_description.trim())]);

        let define_criteria = Task::new(DEFINE_CRITERIA_TASK, qualification, prompts::LEAD_QUALIFIER_ROLE).with_expected_output(prompts::QUALIFICATION_EXPECTED_OUTPUT);

        let find_leads = Task::new(FIND_LEADS_TASK, config.research_task_directive.clone(), prompts::LEAD_RESEARCHER_ROLE)
            .with_expected_output(prompts::RESEARCH_EXPECTED_OUTPUT)
            .depends_on(DEFINE_CRITERIA_TASK);

        let create_emails = Task::new(CREATE_EMAILS_TASK, config.email_task_directive.clone(), prompts::EMAIL_SPECIALIST_ROLE)
            .with_expected_output(prompts::EMAIL_EXPECTED_OUTPUT)
            .depends_on(FIND_LEADS_TASK);

        vec![define_criteria, find_leads, create_emails]
    }

    /// Assemble and validate the crew.
    pub fn crew(&self, config: &Config) -> Res<Crew> {
        let (lead_qualifier, lead_researcher, email_specialist) = self.create_agents();
        let tasks = self.create_tasks(config);

        Crew::new(vec![lead_qualifier, lead_researcher, email_specialist], tasks)
    }

    /// Run the crew to completion.
    #[instrument(name = "LeadGenerationCrew::run", skip_all)]
    pub async fn run(&self, runtime: &Runtime) -> Res<CrewOutput> {
        info!("Starting the lead generation crew ...");

        let crew = self.crew(&runtime.config)?;
        let result = crew.kickoff(runtime).await?;

        info!("Crew execution completed ({} total tokens).", result.usage.total_tokens);

        Ok(result)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{config::ConfigInner, prompts::BUSINESS_DESCRIPTION_PLACEHOLDER};

    fn config() -> Config {
        Config::from(ConfigInner {
            llm_api_key: "test_key".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn blank_description_is_rejected() {
        assert!(LeadGenerationCrew::new("").is_err());
        assert!(LeadGenerationCrew::new(" \n\t").is_err());
    }

    #[test]
    fn tasks_chain_in_order() {
        let crew = LeadGenerationCrew::new("Acme sells inventory software.").unwrap();
        let tasks = crew.create_tasks(&config());

        let names = tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, [DEFINE_CRITERIA_TASK, FIND_LEADS_TASK, CREATE_EMAILS_TASK]);

        assert!(tasks[0].dependencies.is_empty());
        assert_eq!(tasks[1].dependencies, [DEFINE_CRITERIA_TASK]);
        assert_eq!(tasks[2].dependencies, [FIND_LEADS_TASK]);
    }

    #[test]
    fn qualification_task_carries_business_description() {
        let crew = LeadGenerationCrew::new("Acme sells inventory software.").unwrap();
        let tasks = crew.create_tasks(&config());

        assert!(tasks[0].description.contains("Acme sells inventory software."));
        assert!(!tasks[0].description.contains(BUSINESS_DESCRIPTION_PLACEHOLDER));
    }

    #[test]
    fn custom_directives_are_used() {
        let config = Config::from(ConfigInner {
            llm_api_key: "test_key".to_string(),
            research_task_directive: "Find three leads.".to_string(),
            ..Default::default()
        });

        let crew = LeadGenerationCrew::new("Acme").unwrap();
        let tasks = crew.create_tasks(&config);

        assert_eq!(tasks[1].description, "Find three leads.");
    }

    #[test]
    fn crew_is_valid_and_agents_allow_tools() {
        let crew = LeadGenerationCrew::new("Acme").unwrap().crew(&config()).unwrap();

        assert_eq!(crew.agents().len(), 3);
        assert!(crew.agents().iter().all(|a| a.allow_tools));
        assert_eq!(crew.tasks()[2].agent, prompts::EMAIL_SPECIALIST_ROLE);
    }
}
