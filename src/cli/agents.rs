//! `devflow agents`

use crate::app;
use anyhow::Result;
use devflow_core::{format_error_for_cli, Agent};

/// Initialize the agent pool and print it
pub async fn run() -> Result<()> {
    let config = app::load_config()?;
    let orchestrator = app::build_orchestrator(&config).await?;

    if let Err(e) = orchestrator.initialize().await {
        eprintln!("{}", format_error_for_cli(&e));
        anyhow::bail!("Agent setup failed");
    }

    let agents = orchestrator.get_all_agents();
    if agents.is_empty() {
        println!("No agents initialized");
    }
    for agent in &agents {
        println!(
            "{:<20} {:<14} {} (max {} tokens)",
            agent.id(),
            agent.agent_type().as_str(),
            agent.name(),
            agent.capabilities().max_tokens
        );
    }

    orchestrator.shutdown().await;
    Ok(())
}
