//! CLI module for devflow
//!
//! Provides commands:
//! - `run`: Run a command (or a named workflow) through the orchestrator
//! - `workflows`: List registered workflows and their steps
//! - `agents`: Initialize the agent pool and list it

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod agents;
pub mod run;
pub mod workflows;

/// Devflow CLI
#[derive(Parser, Debug)]
#[command(name = "devflow")]
#[command(about = "Agent orchestration and workflow runner")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command through the orchestrator
    Run(RunArgs),
    /// List registered workflows and their steps
    Workflows,
    /// Initialize the agent pool and list it
    Agents,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command text, e.g. "implement a rate limiter"
    pub command: String,
    /// Content handed to every step
    #[arg(long, default_value = "")]
    pub content: String,
    /// Session id (generated when omitted)
    #[arg(long)]
    pub session: Option<String>,
    /// Project id
    #[arg(long)]
    pub project: Option<String>,
    /// Working directory passed to agents
    #[arg(long)]
    pub workdir: Option<PathBuf>,
    /// Run this workflow instead of classifying the command
    #[arg(long)]
    pub workflow: Option<String>,
    /// Step parameter as KEY=VALUE (VALUE parsed as JSON when possible)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, serde_json::Value)>,
    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err("parameter key is empty".to_string());
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => run::run(args).await,
        Some(Commands::Workflows) => workflows::run().await,
        Some(Commands::Agents) => agents::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("depth=3").unwrap(), ("depth".to_string(), json!(3)));
        assert_eq!(
            parse_param("lang=rust").unwrap(),
            ("lang".to_string(), json!("rust"))
        );
        assert_eq!(
            parse_param("expr=a=b").unwrap(),
            ("expr".to_string(), json!("a=b"))
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "devflow",
            "run",
            "review auth.rs",
            "--workflow",
            "review",
            "--param",
            "strict=true",
            "--json",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.command, "review auth.rs");
        assert_eq!(args.workflow.as_deref(), Some("review"));
        assert_eq!(args.params, vec![("strict".to_string(), json!(true))]);
        assert!(args.json);
        assert!(args.content.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
