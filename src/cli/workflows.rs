//! `devflow workflows`

use anyhow::Result;
use devflow_core::{WorkflowDefinition, WorkflowEngine};

/// Print every registered workflow with its ordered steps
pub async fn run() -> Result<()> {
    let engine = WorkflowEngine::new();
    for workflow in engine.list_workflows() {
        println!("{}", render(&workflow));
    }
    Ok(())
}

fn render(workflow: &WorkflowDefinition) -> String {
    let mut out = format!("{} ({})", workflow.id, workflow.name);
    if !workflow.description.is_empty() {
        out.push_str(&format!("\n  {}", workflow.description));
    }
    for step in workflow.ordered_steps() {
        out.push_str(&format!(
            "\n  {}. {} [{} -> {}]{}",
            step.order,
            step.name,
            step.agent_type,
            step.command,
            if step.required { "" } else { " (optional)" }
        ));
    }
    out
}
