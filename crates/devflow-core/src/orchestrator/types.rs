//! Orchestrator request, response and lifecycle types

use crate::agents::{AgentContext, AgentResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Orchestrator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// No agent pool
    Uninitialized,
    /// Agent setup in progress
    Initializing,
    /// Pool ready
    Initialized,
    /// Draining in-flight work and releasing agents
    ShuttingDown,
}

impl OrchestratorState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => OrchestratorState::Uninitialized,
            1 => OrchestratorState::Initializing,
            2 => OrchestratorState::Initialized,
            _ => OrchestratorState::ShuttingDown,
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Initialized => write!(f, "Initialized"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// A free-form request to classify and execute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorRequest {
    /// Request id
    pub request_id: String,
    /// Command text used for classification
    pub command: String,
    /// Content handed to each step
    pub content: String,
    /// Session id (generated when absent)
    #[serde(default)]
    pub session_id: Option<String>,
    /// Project id
    #[serde(default)]
    pub project_id: Option<String>,
    /// Working directory
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// Parameters passed to every step
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl OrchestratorRequest {
    /// Create a request with a fresh id
    pub fn new(command: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            command: command.into(),
            content: content.into(),
            session_id: None,
            project_id: None,
            working_directory: None,
            parameters: HashMap::new(),
        }
    }

    /// Set the session id
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the project id
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Add a parameter
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Input for running a named workflow directly
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// Content handed to each step
    pub content: String,
    /// Session id
    #[serde(default)]
    pub session_id: Option<String>,
    /// Project id
    #[serde(default)]
    pub project_id: Option<String>,
    /// Working directory
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    /// Parameters passed to every step
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl WorkflowRequest {
    /// Create a request
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the session id
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Add a parameter
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub(crate) fn into_request(self, command: impl Into<String>) -> OrchestratorRequest {
        OrchestratorRequest {
            request_id: Uuid::new_v4().to_string(),
            command: command.into(),
            content: self.content,
            session_id: self.session_id,
            project_id: self.project_id,
            working_directory: self.working_directory,
            parameters: self.parameters,
        }
    }
}

/// Aggregated result of a workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorResponse {
    /// Request id
    pub request_id: String,
    /// Whether every required step succeeded
    pub success: bool,
    /// Successful step outputs joined by blank lines
    pub content: String,
    /// Workflow that ran
    pub workflow_id: Option<String>,
    /// Per-step responses, in execution order
    pub agent_responses: Vec<AgentResponse>,
    /// Final context (absent when no workflow ran)
    pub context: Option<AgentContext>,
    /// Error message if failed
    pub error: Option<String>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl OrchestratorResponse {
    /// Failure before any workflow ran
    pub fn rejected(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            success: false,
            content: String::new(),
            workflow_id: None,
            agent_responses: Vec::new(),
            context: None,
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Artifacts from every step, in order
    pub fn artifacts(&self) -> impl Iterator<Item = &crate::agents::Artifact> {
        self.agent_responses.iter().flat_map(|r| r.artifacts.iter())
    }
}
