//! Workflow Engine
//!
//! Holds workflow definitions and selects one for an incoming request.
//! Selection is delegated to a [`WorkflowClassifier`]; unclassified commands
//! and unknown workflow ids fall back to the `default` workflow.

pub mod builtin;
mod classifier;
mod types;

pub use builtin::builtin_workflows;
pub use classifier::{KeywordClassifier, WorkflowClassifier};
pub use types::{WorkflowDefinition, WorkflowStep};

use crate::error::Result;
use crate::orchestrator::OrchestratorRequest;
use dashmap::DashMap;
use tracing::{debug, info};

/// Registry of workflows plus the classifier that picks between them
pub struct WorkflowEngine {
    workflows: DashMap<String, WorkflowDefinition>,
    classifier: Box<dyn WorkflowClassifier>,
}

impl WorkflowEngine {
    /// Engine with the keyword classifier and the built-in workflows
    #[must_use]
    pub fn new() -> Self {
        Self::with_classifier(KeywordClassifier)
    }

    /// Engine with a custom classifier and the built-in workflows
    #[must_use]
    pub fn with_classifier(classifier: impl WorkflowClassifier + 'static) -> Self {
        let workflows = DashMap::new();
        for workflow in builtin_workflows() {
            workflows.insert(workflow.id.clone(), workflow);
        }
        Self {
            workflows,
            classifier: Box::new(classifier),
        }
    }

    /// Pick the workflow for a request.
    ///
    /// `None` only when neither the classified workflow nor `default` is
    /// registered.
    pub fn determine_workflow(&self, request: &OrchestratorRequest) -> Option<WorkflowDefinition> {
        let classified = self.classifier.classify(&request.command);

        if let Some(id) = &classified {
            if let Some(workflow) = self.get_workflow(id) {
                debug!(
                    request_id = %request.request_id,
                    workflow = %id,
                    "Classified request"
                );
                return Some(workflow);
            }
            debug!(workflow = %id, "Classified workflow is not registered");
        }

        let fallback = self.get_workflow(builtin::DEFAULT);
        debug!(
            request_id = %request.request_id,
            classified = ?classified,
            found = fallback.is_some(),
            "Using default workflow"
        );
        fallback
    }

    /// Workflow by id
    #[must_use]
    pub fn get_workflow(&self, id: &str) -> Option<WorkflowDefinition> {
        self.workflows.get(id).map(|entry| entry.value().clone())
    }

    /// Add or replace a workflow
    pub fn register_workflow(&self, workflow: WorkflowDefinition) -> Result<()> {
        workflow.validate()?;
        let id = workflow.id.clone();
        let steps = workflow.steps.len();
        let replaced = self.workflows.insert(id.clone(), workflow).is_some();
        info!(workflow = %id, steps = steps, replaced = replaced, "Registered workflow");
        Ok(())
    }

    /// Remove a workflow
    pub fn remove_workflow(&self, id: &str) -> Option<WorkflowDefinition> {
        self.workflows.remove(id).map(|(_, workflow)| workflow)
    }

    /// All workflows, sorted by id
    #[must_use]
    pub fn list_workflows(&self) -> Vec<WorkflowDefinition> {
        let mut workflows: Vec<WorkflowDefinition> = self
            .workflows
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        workflows
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
