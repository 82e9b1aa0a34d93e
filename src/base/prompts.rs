//! Agent personas, task directives, and prompt scaffolding for the lead-generation crew.

/// Template variable holding the business description.
pub const BUSINESS_DESCRIPTION_VAR: &str = "business_description";

/// Placeholder replaced with the business description in task directives.
pub const BUSINESS_DESCRIPTION_PLACEHOLDER: &str = "{business_description}";

// Agents.

pub const LEAD_QUALIFIER_ROLE: &str = "Lead Qualification Expert";
pub const LEAD_QUALIFIER_GOAL: &str = "Define ideal customer profile and qualification criteria";
pub const LEAD_QUALIFIER_BACKSTORY: &str = "You are an expert in lead qualification and customer profiling. \
Your expertise lies in understanding businesses and determining what makes \
a lead qualified for their specific needs.";

pub const LEAD_RESEARCHER_ROLE: &str = "Lead Researcher";
pub const LEAD_RESEARCHER_GOAL: &str = "Find and validate qualified leads based on criteria";
pub const LEAD_RESEARCHER_BACKSTORY: &str = "You are a skilled researcher specializing in finding business \
leads that match specific criteria. You're excellent at validating \
contact information and ensuring leads are current and accurate.";

pub const EMAIL_SPECIALIST_ROLE: &str = "Email Campaign Specialist";
pub const EMAIL_SPECIALIST_GOAL: &str = "Create personalized email sequences and track potential outcomes";
pub const EMAIL_SPECIALIST_BACKSTORY: &str = "You are an expert in crafting compelling email campaigns \
that convert. You specialize in personalization and understanding \
the psychology of email marketing.";

// Tasks.

/// Directive for the qualification task.
pub const QUALIFICATION_TASK_DIRECTIVE: &str = r#####"
Analyze the following business and determine detailed qualification criteria:
{business_description}

Create a comprehensive ideal customer profile including:
1. Company size
2. Industry
3. Budget range
4. Pain points
5. Decision maker profiles
6. Technology stack requirements
7. Geographic location preferences

Provide the criteria in a structured format.
"#####;

/// Directive for the research task.
pub const RESEARCH_TASK_DIRECTIVE: &str = r#####"
Using the qualification criteria provided, find 5 highly qualified leads.
For each lead, provide:
1. Company name
2. Key decision maker's name and role
3. Company size and industry
4. Relevant technology stack or business practices
5. Recent company news or developments
6. LinkedIn profile or company website
7. Qualification score (1-10) with justification
"#####;

/// Directive for the email drafting task.
pub const EMAIL_TASK_DIRECTIVE: &str = r#####"
For each qualified lead, create:
1. Initial cold email
2. Three follow-up emails
3. Sales opportunity summary

Each email should be personalized based on:
- Company-specific information
- Recent news or developments
- Specific pain points
- Relevant use cases

Include subject lines and follow-up timing recommendations.
"#####;

pub const QUALIFICATION_EXPECTED_OUTPUT: &str = "A structured ideal customer profile covering all seven criteria.";
pub const RESEARCH_EXPECTED_OUTPUT: &str = "Five leads, each with all seven requested fields and a justified qualification score.";
pub const EMAIL_EXPECTED_OUTPUT: &str = "For every lead: a cold email, three follow-ups with timing, and an opportunity summary.";

// Scaffolding.

/// Appended to the agent system prompt when tools are available.
pub const TOOL_USE_DIRECTIVE: &str = "You have access to a `web_search` tool. Use it to look up companies, people, and recent news whenever it \
would make your answer more accurate. When you have enough information, reply with your final answer as plain text \
without calling any more tools.";

/// Sent when an agent has used up its tool iterations.
pub const FORCE_FINAL_ANSWER: &str = "You have reached the maximum number of tool uses for this task. \
Do not call any more tools. Give your best complete final answer now.";

/// Example business used when no description is supplied.
pub const DEFAULT_BUSINESS_DESCRIPTION: &str = r#####"
Company Name: TechFlow Analytics
Product/Service: AI-Powered Business Intelligence Platform

Core Offerings:
- Real-time data analytics dashboard
- Predictive sales forecasting
- Customer behavior analysis
- Automated reporting system

Target Market:
- Industry: E-commerce, Retail, SaaS companies
- Company Size: 50-1000 employees
- Geographic Focus: North America and Europe

Value Proposition:
- Reduce data analysis time by 75%
- Increase forecast accuracy by 40%
- Automate 90% of reporting tasks
- ROI within 3 months

Price Range:
- Entry level: $2,000/month
- Average deal size: $5,000/month
- Enterprise: Custom pricing, typically $15,000+/month

Current Customer Profile:
- Mid-sized e-commerce companies
- Data-driven SaaS businesses
- Success stories with major retail chains
"#####;

/// Replace every `{name}` placeholder in `template` with its value.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| acc.replace(&format!("{{{name}}}"), value))
}

/// Build the system prompt that puts the model in an agent's persona.
pub fn agent_system_prompt(role: &str, goal: &str, backstory: &str, has_tools: bool) -> String {
    let mut prompt = format!("You are {role}. {backstory}\nYour personal goal is: {goal}");

    if has_tools {
        prompt.push_str("\n\n");
        prompt.push_str(TOOL_USE_DIRECTIVE);
    }

    prompt
}

/// Build the user message for a task, including any context from earlier tasks.
pub fn task_prompt(description: &str, expected_output: Option<&str>, context: Option<&str>) -> String {
    let mut prompt = format!("# Current Task\n\n{}\n", description.trim());

    if let Some(expected_output) = expected_output {
        prompt.push_str(&format!(
            "\nThis is the expected criteria for your final answer: {expected_output}\nYou MUST return the actual complete content as the final answer, not a summary.\n"
        ));
    }

    if let Some(context) = context {
        prompt.push_str(&format!("\n# Context From Previous Tasks\n\n{}\n", context.trim()));
    }

    prompt
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_all_occurrences() {
        let rendered = render("{a} and {a} but not {b}", &[("a", "x")]);

        assert_eq!(rendered, "x and x but not {b}");
    }

    #[test]
    fn qualification_directive_interpolates_business() {
        let rendered = render(QUALIFICATION_TASK_DIRECTIVE, &[(BUSINESS_DESCRIPTION_VAR, "Acme Widgets")]);

        assert!(rendered.contains("Acme Widgets"));
        assert!(!rendered.contains(BUSINESS_DESCRIPTION_PLACEHOLDER));
    }

    #[test]
    fn system_prompt_mentions_tools_only_when_available() {
        let with_tools = agent_system_prompt(LEAD_RESEARCHER_ROLE, LEAD_RESEARCHER_GOAL, LEAD_RESEARCHER_BACKSTORY, true);
        let without_tools = agent_system_prompt(LEAD_RESEARCHER_ROLE, LEAD_RESEARCHER_GOAL, LEAD_RESEARCHER_BACKSTORY, false);

        assert!(with_tools.starts_with("You are Lead Researcher."));
        assert!(with_tools.contains("web_search"));
        assert!(!without_tools.contains("web_search"));
        assert!(without_tools.contains(LEAD_RESEARCHER_GOAL));
        assert!(without_tools.contains(LEAD_RESEARCHER_BACKSTORY));
    }

    #[test]
    fn task_prompt_includes_context_when_present() {
        let prompt = task_prompt("Find leads.", Some("Five leads."), Some("ICP: retailers"));

        assert!(prompt.contains("Find leads."));
        assert!(prompt.contains("Five leads."));
        assert!(prompt.contains("ICP: retailers"));

        let bare = task_prompt("Find leads.", None, None);
        assert!(!bare.contains("Context From Previous Tasks"));
        assert!(!bare.contains("expected criteria"));
    }
}
