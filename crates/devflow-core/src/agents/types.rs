//! Agent data model
//!
//! Types shared between agents, the setup service and the orchestrator.

use chrono::{DateTime, Utc};
use devflow_llm::MessageRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Custom setting naming a constructor in the factory's registry
pub const FACTORY_SETTING: &str = "factory";

/// Kind of work an agent performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Breaks requests into plans and designs
    Planning,
    /// Writes and modifies code
    Coding,
    /// Reviews code for quality and security
    Review,
    /// Writes and plans tests
    Testing,
    /// Writes documentation
    Documentation,
    /// Anything provided through the constructor registry
    Custom,
}

impl AgentType {
    /// Built-in types in setup order (everything except `Custom`)
    pub const BUILT_IN: [AgentType; 5] = [
        AgentType::Planning,
        AgentType::Coding,
        AgentType::Review,
        AgentType::Testing,
        AgentType::Documentation,
    ];

    /// Lowercase key
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Planning => "planning",
            AgentType::Coding => "coding",
            AgentType::Review => "review",
            AgentType::Testing => "testing",
            AgentType::Documentation => "documentation",
            AgentType::Custom => "custom",
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentType::Planning => "Planning Agent",
            AgentType::Coding => "Coding Agent",
            AgentType::Review => "Review Agent",
            AgentType::Testing => "Testing Agent",
            AgentType::Documentation => "Documentation Agent",
            AgentType::Custom => "Custom Agent",
        }
    }

    /// Default agent id for this type
    #[must_use]
    pub fn default_agent_id(&self) -> String {
        format!("{}-agent", self.as_str())
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" | "planner" => Ok(AgentType::Planning),
            "coding" | "coder" => Ok(AgentType::Coding),
            "review" | "reviewer" => Ok(AgentType::Review),
            "testing" | "tester" => Ok(AgentType::Testing),
            "documentation" | "docs" => Ok(AgentType::Documentation),
            "custom" => Ok(AgentType::Custom),
            _ => Err(format!("Unknown agent type: {}", s)),
        }
    }
}

/// What an agent can do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Whether the agent can stream partial output
    pub supports_streaming: bool,
    /// Languages the agent is tuned for (empty = any)
    #[serde(default)]
    pub supported_languages: Vec<String>,
    /// Token ceiling for a single response
    pub max_tokens: u32,
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self {
            supports_streaming: false,
            supported_languages: Vec::new(),
            max_tokens: 4096,
        }
    }
}

/// Configuration an agent is initialized with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    /// Agent id used as the pool key
    pub agent_id: String,
    /// Agent type
    pub agent_type: AgentType,
    /// Provider the agent sends messages through
    pub provider_id: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Max tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Free-form settings
    #[serde(default)]
    pub custom_settings: HashMap<String, String>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

impl AgentConfiguration {
    /// Create a configuration with default sampling settings
    pub fn new(
        agent_id: impl Into<String>,
        agent_type: AgentType,
        provider_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_type,
            provider_id: provider_id.into(),
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            custom_settings: HashMap::new(),
        }
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Add a custom setting
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_settings.insert(key.into(), value.into());
        self
    }

    /// Constructor key from the `factory` setting, if any
    #[must_use]
    pub fn factory_key(&self) -> Option<&str> {
        self.custom_settings.get(FACTORY_SETTING).map(String::as_str)
    }
}

/// One entry in the context history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    /// Message role
    pub role: MessageRole,
    /// Agent that produced the message
    pub agent_id: Option<String>,
    /// Message content
    pub content: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl ContextMessage {
    /// Message produced by an agent
    pub fn assistant(agent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            agent_id: Some(agent_id.into()),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Message from the requesting user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            agent_id: None,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// State threaded from step to step during a workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Session id
    pub session_id: String,
    /// Project id
    pub project_id: Option<String>,
    /// Ordered history
    pub history: Vec<ContextMessage>,
    /// Values shared between steps
    pub shared_state: HashMap<String, serde_json::Value>,
    /// Working directory for file-oriented agents
    pub working_directory: Option<PathBuf>,
    /// Tokens consumed so far
    pub tokens_used: u64,
    /// Tokens left in the budget (`u64::MAX` = unlimited)
    pub tokens_remaining: u64,
}

impl AgentContext {
    /// Fresh context for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            project_id: None,
            history: Vec::new(),
            shared_state: HashMap::new(),
            working_directory: None,
            tokens_used: 0,
            tokens_remaining: u64::MAX,
        }
    }

    /// Set the project id
    #[must_use]
    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn with_working_directory(mut self, working_directory: Option<PathBuf>) -> Self {
        self.working_directory = working_directory;
        self
    }

    /// Set the token budget (0 = unlimited)
    #[must_use]
    pub fn with_token_budget(mut self, budget: u64) -> Self {
        self.tokens_remaining = if budget == 0 { u64::MAX } else { budget };
        self
    }

    /// Record token consumption
    pub fn record_usage(&mut self, tokens: u64) {
        self.tokens_used = self.tokens_used.saturating_add(tokens);
        if self.tokens_remaining != u64::MAX {
            self.tokens_remaining = self.tokens_remaining.saturating_sub(tokens);
        }
    }

    /// Whether a finite budget has been used up
    #[must_use]
    pub fn budget_exhausted(&self) -> bool {
        self.tokens_remaining == 0
    }

    /// Append a history entry
    pub fn push_history(&mut self, message: ContextMessage) {
        self.history.push(message);
    }
}

impl Default for AgentContext {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Something an agent produced besides its text reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact name
    pub name: String,
    /// Language tag (for code)
    pub language: Option<String>,
    /// Artifact body
    pub content: String,
}

/// Input for a single agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Command verb (e.g. `create_plan`)
    pub command: String,
    /// Content to work on
    pub content: String,
    /// Current context
    pub context: AgentContext,
    /// Step parameters
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl AgentRequest {
    /// Create a request
    pub fn new(command: impl Into<String>, content: impl Into<String>, context: AgentContext) -> Self {
        Self {
            command: command.into(),
            content: content.into(),
            context,
            parameters: HashMap::new(),
        }
    }

    /// Set parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: HashMap<String, serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Result of a single agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Agent that responded
    pub agent_id: String,
    /// Whether the agent succeeded
    pub success: bool,
    /// Response content
    pub content: String,
    /// Context after the step
    pub context: AgentContext,
    /// Produced artifacts
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl AgentResponse {
    /// Successful response
    pub fn success(
        agent_id: impl Into<String>,
        content: impl Into<String>,
        context: AgentContext,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            success: true,
            content: content.into(),
            context,
            artifacts: Vec::new(),
            error: None,
            duration_ms: 0,
        }
    }

    /// Failed response
    pub fn failure(
        agent_id: impl Into<String>,
        error: impl Into<String>,
        context: AgentContext,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            success: false,
            content: String::new(),
            context,
            artifacts: Vec::new(),
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    /// Attach artifacts
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_parse() {
        assert_eq!("Coding".parse::<AgentType>(), Ok(AgentType::Coding));
        assert_eq!("docs".parse::<AgentType>(), Ok(AgentType::Documentation));
        assert!("deploy".parse::<AgentType>().is_err());
        assert_eq!(AgentType::Review.default_agent_id(), "review-agent");
    }

    #[test]
    fn test_built_in_excludes_custom() {
        assert_eq!(AgentType::BUILT_IN.len(), 5);
        assert!(!AgentType::BUILT_IN.contains(&AgentType::Custom));
    }

    #[test]
    fn test_configuration_factory_key() {
        let config = AgentConfiguration::new("lint", AgentType::Custom, "mock", "m")
            .with_setting(FACTORY_SETTING, "linter");
        assert_eq!(config.factory_key(), Some("linter"));
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_context_budget() {
        let mut unlimited = AgentContext::new("s1");
        unlimited.record_usage(1_000);
        assert_eq!(unlimited.tokens_used, 1_000);
        assert_eq!(unlimited.tokens_remaining, u64::MAX);
        assert!(!unlimited.budget_exhausted());

        let mut limited = AgentContext::new("s2").with_token_budget(100);
        limited.record_usage(60);
        assert_eq!(limited.tokens_remaining, 40);
        limited.record_usage(60);
        assert_eq!(limited.tokens_remaining, 0);
        assert!(limited.budget_exhausted());
    }
}
