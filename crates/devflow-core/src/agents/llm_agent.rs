//! Provider-backed agent
//!
//! [`LlmAgent`] is the concrete implementation behind every built-in agent
//! type. Each type gets an [`AgentProfile`] (system prompt and capability
//! profile); the bound provider and sampling settings come from the
//! [`AgentConfiguration`] at initialization.

use super::agent::Agent;
use super::types::{
    AgentCapabilities, AgentConfiguration, AgentRequest, AgentResponse, AgentType, Artifact,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use devflow_llm::{ChatMessage, ChatRequest, MessageRole, ProviderRegistry};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fenced code blocks in a reply (language tag optional)
static CODE_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([\w+#.-]*)[ \t]*\r?\n([\s\S]*?)```")
        .expect("CODE_BLOCK_REGEX is a compile-time constant")
});

/// Behavioral profile of a built-in agent type
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// Agent type
    pub agent_type: AgentType,
    /// Display name
    pub name: String,
    /// System prompt sent with every request
    pub system_prompt: String,
    /// Capability profile
    pub capabilities: AgentCapabilities,
}

impl AgentProfile {
    /// Profile for a built-in type (`None` for `Custom`)
    #[must_use]
    pub fn for_type(agent_type: AgentType) -> Option<Self> {
        match agent_type {
            AgentType::Planning => Some(Self::planning()),
            AgentType::Coding => Some(Self::coding()),
            AgentType::Review => Some(Self::review()),
            AgentType::Testing => Some(Self::testing()),
            AgentType::Documentation => Some(Self::documentation()),
            AgentType::Custom => None,
        }
    }

    /// Planning agent profile
    #[must_use]
    pub fn planning() -> Self {
        Self {
            agent_type: AgentType::Planning,
            name: AgentType::Planning.display_name().to_string(),
            system_prompt: r#"You are a software planning specialist. You excel at:
- Breaking requests into small, ordered tasks
- Identifying risks, dependencies and open questions
- Proposing architecture and component boundaries
Answer with a numbered plan."#
                .to_string(),
            capabilities: AgentCapabilities {
                supports_streaming: true,
                supported_languages: Vec::new(),
                max_tokens: 4096,
            },
        }
    }

    /// Coding agent profile
    #[must_use]
    pub fn coding() -> Self {
        Self {
            agent_type: AgentType::Coding,
            name: AgentType::Coding.display_name().to_string(),
            system_prompt: r#"You are a senior software engineer. You write complete,
idiomatic, compiling code that follows the plan in the conversation.
Put every file in its own fenced code block with a language tag."#
                .to_string(),
            capabilities: AgentCapabilities {
                supports_streaming: true,
                supported_languages: ["rust", "python", "typescript", "javascript", "go", "java"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                max_tokens: 8192,
            },
        }
    }

    /// Review agent profile
    #[must_use]
    pub fn review() -> Self {
        Self {
            agent_type: AgentType::Review,
            name: AgentType::Review.display_name().to_string(),
            system_prompt: r#"You are a meticulous code reviewer. Report correctness bugs,
security issues and maintainability problems, most severe first.
Reference the code you are commenting on."#
                .to_string(),
            capabilities: AgentCapabilities {
                supports_streaming: false,
                supported_languages: Vec::new(),
                max_tokens: 4096,
            },
        }
    }

    /// Testing agent profile
    #[must_use]
    pub fn testing() -> Self {
        Self {
            agent_type: AgentType::Testing,
            name: AgentType::Testing.display_name().to_string(),
            system_prompt: r#"You are a test engineer. Write focused unit and integration
tests for the code in the conversation, covering edge cases and failure paths.
Put tests in fenced code blocks."#
                .to_string(),
            capabilities: AgentCapabilities {
                supports_streaming: false,
                supported_languages: Vec::new(),
                max_tokens: 4096,
            },
        }
    }

    /// Documentation agent profile
    #[must_use]
    pub fn documentation() -> Self {
        Self {
            agent_type: AgentType::Documentation,
            name: AgentType::Documentation.display_name().to_string(),
            system_prompt: r#"You are a technical writer. Produce clear, accurate
documentation in Markdown: overview, usage examples and API reference."#
                .to_string(),
            capabilities: AgentCapabilities {
                supports_streaming: true,
                supported_languages: Vec::new(),
                max_tokens: 4096,
            },
        }
    }
}

/// Agent that answers through a registered provider
pub struct LlmAgent {
    default_id: String,
    profile: AgentProfile,
    registry: Arc<ProviderRegistry>,
    config: OnceLock<AgentConfiguration>,
    active: AtomicBool,
}

impl LlmAgent {
    /// Create an uninitialized agent
    #[must_use]
    pub fn new(profile: AgentProfile, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            default_id: profile.agent_type.default_agent_id(),
            profile,
            registry,
            config: OnceLock::new(),
            active: AtomicBool::new(false),
        }
    }

    /// Configuration, once initialized
    #[must_use]
    pub fn configuration(&self) -> Option<&AgentConfiguration> {
        self.config.get()
    }

    /// Whether the agent is initialized and not shut down
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn build_request(&self, config: &AgentConfiguration, request: &AgentRequest) -> ChatRequest {
        let history = request.context.history.iter().map(|entry| match entry.role {
            MessageRole::System => ChatMessage::system(entry.content.clone()),
            MessageRole::User => ChatMessage::user(entry.content.clone()),
            MessageRole::Assistant => match &entry.agent_id {
                Some(agent_id) => ChatMessage::assistant(format!("[{}] {}", agent_id, entry.content)),
                None => ChatMessage::assistant(entry.content.clone()),
            },
        });

        let mut prompt = format!("Command: {}", request.command);
        if let Some(dir) = &request.context.working_directory {
            prompt.push_str(&format!("\nWorking directory: {}", dir.display()));
        }
        if !request.content.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&request.content);
        }
        if !request.parameters.is_empty() {
            let params = serde_json::to_string_pretty(&request.parameters).unwrap_or_default();
            prompt.push_str("\n\nParameters:\n");
            prompt.push_str(&params);
        }

        ChatRequest::new(config.model.clone())
            .with_message(ChatMessage::system(self.profile.system_prompt.clone()))
            .with_messages(history)
            .with_message(ChatMessage::user(prompt))
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens.min(self.profile.capabilities.max_tokens))
    }
}

/// Pull fenced code blocks out of a reply
pub fn extract_code_artifacts(content: &str, command: &str) -> Vec<Artifact> {
    CODE_BLOCK_REGEX
        .captures_iter(content)
        .enumerate()
        .map(|(index, caps)| {
            let language = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .filter(|tag| !tag.is_empty())
                .map(str::to_string);
            Artifact {
                name: format!("{}-{}", command, index + 1),
                language,
                content: caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

#[async_trait]
impl Agent for LlmAgent {
    fn id(&self) -> &str {
        self.config
            .get()
            .map(|config| config.agent_id.as_str())
            .unwrap_or(&self.default_id)
    }

    fn agent_type(&self) -> AgentType {
        self.profile.agent_type
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    fn capabilities(&self) -> &AgentCapabilities {
        &self.profile.capabilities
    }

    async fn initialize(&self, config: AgentConfiguration, cancel: CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.config.get().is_some() {
            return Err(Error::AgentInitialization(format!(
                "agent '{}' is already initialized",
                self.id()
            )));
        }
        if config.agent_type != self.profile.agent_type {
            return Err(Error::AgentInitialization(format!(
                "configuration for {} cannot initialize a {} agent",
                config.agent_type, self.profile.agent_type
            )));
        }
        if !self.registry.contains(&config.provider_id) {
            return Err(Error::AgentInitialization(format!(
                "provider '{}' is not registered",
                config.provider_id
            )));
        }
        if !self.registry.ensure_connected(&config.provider_id).await {
            return Err(Error::AgentInitialization(format!(
                "provider '{}' is unavailable",
                config.provider_id
            )));
        }

        let agent_id = config.agent_id.clone();
        let provider_id = config.provider_id.clone();
        self.config.set(config).map_err(|_| {
            Error::AgentInitialization(format!("agent '{}' is already initialized", agent_id))
        })?;
        self.active.store(true, Ordering::SeqCst);

        info!(
            agent_id = %agent_id,
            agent_type = %self.profile.agent_type,
            provider = %provider_id,
            "Agent initialized"
        );
        Ok(())
    }

    async fn execute(&self, request: AgentRequest, cancel: CancellationToken) -> Result<AgentResponse> {
        let Some(config) = self.config.get() else {
            return Ok(AgentResponse::failure(
                self.id(),
                "agent is not initialized",
                request.context,
            ));
        };
        if !self.is_active() {
            return Ok(AgentResponse::failure(
                self.id(),
                "agent has been shut down",
                request.context,
            ));
        }

        let provider = match self.registry.get(&config.provider_id) {
            Some(provider) if self.registry.ensure_connected(&config.provider_id).await => provider,
            _ => {
                return Ok(AgentResponse::failure(
                    self.id(),
                    format!("provider '{}' is unavailable", config.provider_id),
                    request.context,
                ));
            }
        };

        let chat = self.build_request(config, &request);
        let start = Instant::now();

        debug!(
            agent_id = %config.agent_id,
            command = %request.command,
            messages = chat.messages.len(),
            "Sending request to provider"
        );

        let result = provider.send_message(chat, cancel.child_token()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(reply) => {
                let mut context = request.context;
                // Rough estimate (4 chars per token) when the provider reports no usage
                let tokens = reply
                    .usage
                    .map(|usage| u64::from(usage.total_tokens))
                    .unwrap_or_else(|| (reply.content.len() / 4) as u64);
                context.record_usage(tokens);

                let artifacts = extract_code_artifacts(&reply.content, &request.command);
                debug!(
                    agent_id = %config.agent_id,
                    duration_ms = duration_ms,
                    tokens = tokens,
                    artifacts = artifacts.len(),
                    "Agent request completed"
                );

                Ok(AgentResponse::success(config.agent_id.clone(), reply.content, context)
                    .with_artifacts(artifacts)
                    .with_duration(duration_ms))
            }
            Err(e) => {
                warn!(
                    agent_id = %config.agent_id,
                    error = %e,
                    "Agent request failed"
                );
                Ok(
                    AgentResponse::failure(config.agent_id.clone(), e.to_string(), request.context)
                        .with_duration(duration_ms),
                )
            }
        }
    }

    async fn shutdown(&self, _cancel: CancellationToken) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(agent_id = %self.id(), "Agent shut down");
        }
    }
}
