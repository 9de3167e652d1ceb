//! Workflow definitions

use crate::agents::AgentType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One step of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step name (used in errors and logs)
    pub name: String,
    /// Agent type that runs the step
    pub agent_type: AgentType,
    /// Command passed to the agent
    pub command: String,
    /// Content override (the request content is used when absent)
    #[serde(default)]
    pub content: Option<String>,
    /// Step parameters, overlaid on the request parameters
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Whether a failure stops the workflow
    #[serde(default = "default_required")]
    pub required: bool,
    /// Reserved; steps always run sequentially
    #[serde(default)]
    pub allow_parallel: bool,
    /// Execution order (unique within a workflow)
    pub order: u32,
    /// Per-step timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_required() -> bool {
    true
}

impl WorkflowStep {
    /// Required step
    pub fn new(
        order: u32,
        name: impl Into<String>,
        agent_type: AgentType,
        command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            agent_type,
            command: command.into(),
            content: None,
            parameters: HashMap::new(),
            required: true,
            allow_parallel: false,
            order,
            timeout_secs: None,
        }
    }

    /// Mark the step optional
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Override the content sent to the agent
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a parameter
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Set a timeout
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow id
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Steps (any order; see [`WorkflowDefinition::ordered_steps`])
    pub steps: Vec<WorkflowStep>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WorkflowDefinition {
    /// Create an empty workflow
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add a step
    #[must_use]
    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add metadata
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Steps sorted by ascending order
    #[must_use]
    pub fn ordered_steps(&self) -> Vec<&WorkflowStep> {
        let mut steps: Vec<&WorkflowStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }

    /// Check the definition can be registered
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidWorkflow("workflow id is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.order) {
                return Err(Error::InvalidWorkflow(format!(
                    "workflow '{}' has more than one step with order {}",
                    self.id, step.order
                )));
            }
        }
        Ok(())
    }
}
