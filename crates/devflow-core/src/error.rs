//! Error types for devflow-core
//!
//! This module provides the core error type and user-friendly formatting.

use crate::agents::AgentType;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Agent setup could not run (e.g. no providers registered)
    #[error("setup error: {0}")]
    Setup(String),

    /// No workflow for a classification or lookup
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Workflow definition rejected at registration
    #[error("invalid workflow: {0}")]
    InvalidWorkflow(String),

    /// No pooled agent for a step's type
    #[error("no agent available for step '{step}' (type {agent_type})")]
    AgentUnavailable {
        /// Step name
        step: String,
        /// Requested agent type
        agent_type: AgentType,
    },

    /// A required step reported failure
    #[error("required step '{step}' failed: {message}")]
    StepFailed {
        /// Step name
        step: String,
        /// Failure reported by the agent
        message: String,
    },

    /// Agent could not be initialized
    #[error("agent initialization failed: {0}")]
    AgentInitialization(String),

    /// Execution was cancelled
    #[error("execution cancelled")]
    Cancelled,

    /// Token budget used up
    #[error("token budget exceeded: used {used} of {budget} tokens")]
    BudgetExceeded {
        /// Tokens used so far
        used: u64,
        /// Token budget limit
        budget: u64,
    },

    /// Orchestrator is shutting down and rejects new work
    #[error("orchestrator is shutting down")]
    ShuttingDown,

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] devflow_llm::Error),

    /// Unexpected fault
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Human-readable messages and hints for end users
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Setup(msg) => format!("Agent setup failed: {}", msg),
            Error::WorkflowNotFound(id) => format!("No workflow named '{}'.", id),
            Error::InvalidWorkflow(msg) => format!("Workflow definition rejected: {}", msg),
            Error::AgentUnavailable { step, agent_type } => format!(
                "Step '{}' needs a {} but none is available.",
                step,
                agent_type.display_name()
            ),
            Error::StepFailed { step, message } => {
                format!("Step '{}' failed: {}", step, message)
            }
            Error::AgentInitialization(msg) => format!("Agent could not start: {}", msg),
            Error::Cancelled => "The request was cancelled.".to_string(),
            Error::BudgetExceeded { used, budget } => format!(
                "Token budget exhausted ({} of {} tokens used).",
                used, budget
            ),
            Error::ShuttingDown => "The orchestrator is shutting down.".to_string(),
            Error::Llm(e) => format!("Provider error: {}", e),
            Error::Internal(msg) => format!("Internal error: {}", msg),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Setup(_) => Some(
                "Register at least one provider and check the [setup] section of the config."
                    .to_string(),
            ),
            Error::WorkflowNotFound(_) => {
                Some("Run `devflow workflows` to list registered workflows.".to_string())
            }
            Error::AgentUnavailable { .. } | Error::AgentInitialization(_) => Some(
                "Check that the agent's provider is registered and can connect.".to_string(),
            ),
            Error::BudgetExceeded { .. } => Some(
                "Raise orchestrator.token_budget or set it to 0 for no limit.".to_string(),
            ),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }
    output
}
