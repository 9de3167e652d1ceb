//! `devflow run`

use super::RunArgs;
use crate::app;
use anyhow::{Context, Result};
use devflow_core::{OrchestratorRequest, OrchestratorResponse, WorkflowRequest};
use tracing::{info, warn};

/// Run a command or a named workflow and print the result
pub async fn run(args: RunArgs) -> Result<()> {
    let config = app::load_config()?;
    let orchestrator = app::build_orchestrator(&config).await?;

    let interrupt = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling execution");
                orchestrator.cancel();
            }
        })
    };

    let response = match args.workflow.clone() {
        Some(workflow_id) => {
            let request = workflow_request(&args);
            orchestrator.execute_workflow(&workflow_id, request).await
        }
        None => orchestrator.process_command(command_request(&args)).await,
    };

    interrupt.abort();
    orchestrator.shutdown().await;

    info!(
        success = response.success,
        workflow = response.workflow_id.as_deref().unwrap_or("-"),
        steps = response.agent_responses.len(),
        duration_ms = response.duration_ms,
        "Execution finished"
    );
    print_response(&response, args.json)?;

    if !response.success {
        anyhow::bail!(
            "{}",
            response.error.as_deref().unwrap_or("execution failed")
        );
    }
    Ok(())
}

fn command_request(args: &RunArgs) -> OrchestratorRequest {
    let mut request = OrchestratorRequest::new(&args.command, &args.content);
    if let Some(session) = &args.session {
        request = request.with_session(session);
    }
    if let Some(project) = &args.project {
        request = request.with_project(project);
    }
    if let Some(dir) = &args.workdir {
        request = request.with_working_directory(dir);
    }
    for (key, value) in &args.params {
        request = request.with_parameter(key, value.clone());
    }
    request
}

fn workflow_request(args: &RunArgs) -> WorkflowRequest {
    let mut request = WorkflowRequest::new(&args.content);
    request.session_id = args.session.clone();
    request.project_id = args.project.clone();
    request.working_directory = args.workdir.clone();
    for (key, value) in &args.params {
        request = request.with_parameter(key, value.clone());
    }
    request
}

fn print_response(response: &OrchestratorResponse, json: bool) -> Result<()> {
    if json {
        let output =
            serde_json::to_string_pretty(response).context("Failed to serialize response")?;
        println!("{output}");
        return Ok(());
    }

    if !response.content.is_empty() {
        println!("{}", response.content);
    }
    for artifact in response.artifacts() {
        println!(
            "\n--- {} ({}) ---\n{}",
            artifact.name,
            artifact.language.as_deref().unwrap_or("text"),
            artifact.content
        );
    }
    Ok(())
}
