//! Configuration types for devflow-core
//!
//! Plain serde structs. The binary loads them with the `config` crate; tests
//! build them directly.

use crate::agents::AgentConfiguration;
use serde::{Deserialize, Serialize};

/// Orchestrator behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Token budget per execution (0 = unlimited)
    #[serde(default)]
    pub token_budget: u64,
    /// Timeout for steps that do not set their own
    #[serde(default)]
    pub default_step_timeout_secs: Option<u64>,
    /// Fail the workflow when a required step has no agent
    #[serde(default = "default_true")]
    pub fail_on_missing_required_agent: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            token_budget: 0,
            default_step_timeout_secs: None,
            fail_on_missing_required_agent: true,
        }
    }
}

impl OrchestratorConfig {
    /// Set the token budget
    #[must_use]
    pub fn with_token_budget(mut self, budget: u64) -> Self {
        self.token_budget = budget;
        self
    }

    /// Set the default step timeout
    #[must_use]
    pub fn with_default_step_timeout(mut self, secs: u64) -> Self {
        self.default_step_timeout_secs = Some(secs);
        self
    }
}

/// Agent setup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Provider for automatically created agents
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Model for automatically created agents
    #[serde(default)]
    pub default_model: Option<String>,
    /// Explicit agent list; empty means automatic setup
    #[serde(default)]
    pub custom_agents: Vec<AgentConfiguration>,
}

impl SetupConfig {
    /// Whether setup uses the explicit agent list
    #[must_use]
    pub fn is_custom(&self) -> bool {
        !self.custom_agents.is_empty()
    }
}
