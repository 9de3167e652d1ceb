//! Agent Factory
//!
//! Builds agent instances by type. Built-in types are a closed `match`;
//! anything else is looked up in a constructor registry keyed by a stable
//! name (selected through the `factory` custom setting of a configuration).

use super::agent::SharedAgent;
use super::llm_agent::{AgentProfile, LlmAgent};
use super::types::AgentType;
use devflow_llm::ProviderRegistry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Constructor stored in the factory registry
pub type AgentConstructor =
    Arc<dyn Fn(AgentType, Arc<ProviderRegistry>) -> SharedAgent + Send + Sync>;

/// Creates agents bound to a provider registry
pub struct AgentFactory {
    registry: Arc<ProviderRegistry>,
    constructors: RwLock<HashMap<String, AgentConstructor>>,
}

impl AgentFactory {
    /// Create a factory with no named constructors
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Add a named constructor (builder form)
    #[must_use]
    pub fn with_constructor<F>(self, key: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(AgentType, Arc<ProviderRegistry>) -> SharedAgent + Send + Sync + 'static,
    {
        self.register_constructor(key, constructor);
        self
    }

    /// Add or replace a named constructor
    pub fn register_constructor<F>(&self, key: impl Into<String>, constructor: F)
    where
        F: Fn(AgentType, Arc<ProviderRegistry>) -> SharedAgent + Send + Sync + 'static,
    {
        let key = key.into();
        let previous = self
            .constructors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone(), Arc::new(constructor));
        if previous.is_some() {
            warn!(key = %key, "Replaced agent constructor");
        } else {
            debug!(key = %key, "Registered agent constructor");
        }
    }

    /// Provider registry agents are bound to
    #[must_use]
    pub fn provider_registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Create a built-in agent (`None` for `Custom`)
    #[must_use]
    pub fn create(&self, agent_type: AgentType) -> Option<SharedAgent> {
        let profile = match agent_type {
            AgentType::Planning => AgentProfile::planning(),
            AgentType::Coding => AgentProfile::coding(),
            AgentType::Review => AgentProfile::review(),
            AgentType::Testing => AgentProfile::testing(),
            AgentType::Documentation => AgentProfile::documentation(),
            AgentType::Custom => return None,
        };
        Some(Arc::new(LlmAgent::new(profile, self.registry.clone())))
    }

    /// Create an agent through a named constructor
    #[must_use]
    pub fn create_named(&self, key: &str, agent_type: AgentType) -> Option<SharedAgent> {
        let constructor = self
            .constructors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()?;
        Some(constructor(agent_type, self.registry.clone()))
    }

    /// Registered constructor keys, sorted
    #[must_use]
    pub fn constructor_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .constructors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
