//! Test doubles shared by unit tests

use crate::agents::{
    Agent, AgentCapabilities, AgentConfiguration, AgentFactory, AgentRequest, AgentResponse,
    AgentType, SharedAgent, FACTORY_SETTING,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use devflow_llm::{MockProvider, ProviderRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Factory key the probe constructor is registered under
pub const PROBE: &str = "probe";

/// What a probe agent does when executed
#[derive(Debug, Clone)]
pub enum ProbeBehavior {
    /// Reply `"<agent_id>: <command>"` and use `tokens`
    Succeed { tokens: u64 },
    /// Report `success = false`
    Fail(String),
    /// Return `Err` from `execute`
    Error(String),
    /// Panic inside `execute`
    Panic,
    /// Sleep (cancellable), then succeed
    Delay(Duration),
}

impl Default for ProbeBehavior {
    fn default() -> Self {
        ProbeBehavior::Succeed { tokens: 10 }
    }
}

/// One recorded `execute` call
#[derive(Debug, Clone)]
pub struct ProbeCall {
    pub agent_id: String,
    pub command: String,
    pub content: String,
    pub parameters: HashMap<String, serde_json::Value>,
    pub history_len: usize,
}

/// Counters shared by every probe a factory creates
#[derive(Default)]
pub struct ProbeState {
    pub initialized: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub calls: Mutex<Vec<ProbeCall>>,
    behaviors: Mutex<HashMap<AgentType, ProbeBehavior>>,
    failing_init: Mutex<Vec<String>>,
}

impl ProbeState {
    pub fn set_behavior(&self, agent_type: AgentType, behavior: ProbeBehavior) {
        self.behaviors.lock().unwrap().insert(agent_type, behavior);
    }

    pub fn fail_init(&self, agent_id: &str) {
        self.failing_init.lock().unwrap().push(agent_id.to_string());
    }

    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    fn behavior(&self, agent_type: AgentType) -> ProbeBehavior {
        self.behaviors
            .lock()
            .unwrap()
            .get(&agent_type)
            .cloned()
            .unwrap_or_default()
    }
}

/// Agent with scripted behavior and call recording
pub struct ProbeAgent {
    agent_type: AgentType,
    default_id: String,
    capabilities: AgentCapabilities,
    config: OnceLock<AgentConfiguration>,
    state: Arc<ProbeState>,
}

impl ProbeAgent {
    pub fn new(agent_type: AgentType, state: Arc<ProbeState>) -> Self {
        Self {
            agent_type,
            default_id: agent_type.default_agent_id(),
            capabilities: AgentCapabilities::default(),
            config: OnceLock::new(),
            state,
        }
    }
}

#[async_trait]
impl Agent for ProbeAgent {
    fn id(&self) -> &str {
        self.config
            .get()
            .map(|c| c.agent_id.as_str())
            .unwrap_or(&self.default_id)
    }

    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    fn name(&self) -> &str {
        "Probe Agent"
    }

    fn capabilities(&self) -> &AgentCapabilities {
        &self.capabilities
    }

    async fn initialize(&self, config: AgentConfiguration, _cancel: CancellationToken) -> Result<()> {
        if self.state.failing_init.lock().unwrap().contains(&config.agent_id) {
            return Err(Error::AgentInitialization(format!("{} refused", config.agent_id)));
        }
        self.config
            .set(config)
            .map_err(|_| Error::AgentInitialization("already initialized".to_string()))?;
        self.state.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn execute(&self, request: AgentRequest, cancel: CancellationToken) -> Result<AgentResponse> {
        let agent_id = self.id().to_string();
        self.state.calls.lock().unwrap().push(ProbeCall {
            agent_id: agent_id.clone(),
            command: request.command.clone(),
            content: request.content.clone(),
            parameters: request.parameters.clone(),
            history_len: request.context.history.len(),
        });

        let reply = format!("{}: {}", agent_id, request.command);
        match self.state.behavior(self.agent_type) {
            ProbeBehavior::Succeed { tokens } => {
                let mut context = request.context;
                context.record_usage(tokens);
                Ok(AgentResponse::success(agent_id, reply, context))
            }
            ProbeBehavior::Fail(message) => {
                Ok(AgentResponse::failure(agent_id, message, request.context))
            }
            ProbeBehavior::Error(message) => Err(Error::Internal(message)),
            ProbeBehavior::Panic => panic!("probe agent panicked"),
            ProbeBehavior::Delay(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        Ok(AgentResponse::success(agent_id, reply, request.context))
                    }
                    _ = cancel.cancelled() => {
                        Ok(AgentResponse::failure(agent_id, "cancelled", request.context))
                    }
                }
            }
        }
    }

    async fn shutdown(&self, _cancel: CancellationToken) {
        self.state.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Registry with one mock provider (`"mock"`)
pub fn mock_registry() -> Arc<ProviderRegistry> {
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(Arc::new(MockProvider::new("mock")));
    registry
}

/// Factory whose `probe` constructor creates agents sharing `state`
pub fn probe_factory(registry: Arc<ProviderRegistry>, state: Arc<ProbeState>) -> AgentFactory {
    AgentFactory::new(registry).with_constructor(PROBE, move |agent_type, _| {
        Arc::new(ProbeAgent::new(agent_type, state.clone())) as SharedAgent
    })
}

/// Custom setup configuration creating one probe per type
pub fn probe_configs(types: &[AgentType]) -> Vec<AgentConfiguration> {
    types
        .iter()
        .map(|t| {
            AgentConfiguration::new(t.default_agent_id(), *t, "mock", "mock-model")
                .with_setting(FACTORY_SETTING, PROBE)
        })
        .collect()
}
