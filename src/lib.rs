//! Library root for `lead-gen-crew`.
//!
//! Lead-gen-crew runs a three-stage sequential agent pipeline over a business description:
//! - A lead qualification expert derives an ideal customer profile
//! - A lead researcher finds and scores matching leads
//! - An email campaign specialist drafts personalized outreach sequences
//!
//! The agents talk to an OpenAI-compatible chat completions API, and may use
//! DuckDuckGo web search as a tool. The architecture is built around extensible
//! traits that allow for different implementations of each service.

pub mod base;
pub mod crew;
pub mod lead_generation;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Res};
use crew::CrewOutput;
use lead_generation::LeadGenerationCrew;
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and runs the lead-generation crew:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM and search clients
/// - Runs the qualification, research, and email tasks in order
pub async fn start(config: Config, business_description: &str) -> Res<CrewOutput> {
    info!("Starting lead-gen-crew ...");

    // Start the crypto provider; another component may already have installed one.
    let _ = crypto::ring::default_provider().install_default();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Run the crew.
    LeadGenerationCrew::new(business_description)?.run(&runtime).await
}
