//! Agents
//!
//! - [`Agent`]: capability trait the orchestrator drives
//! - [`LlmAgent`]: built-in provider-backed implementation
//! - [`AgentFactory`]: creates agents by type or named constructor
//! - [`AgentSetupService`]: builds the initialized agent pool

mod agent;
pub mod factory;
pub mod llm_agent;
pub mod setup;
mod types;

pub use agent::{Agent, SharedAgent};
pub use factory::{AgentConstructor, AgentFactory};
pub use llm_agent::{extract_code_artifacts, AgentProfile, LlmAgent};
pub use setup::{preset, AgentSetupService};
pub use types::{
    AgentCapabilities, AgentConfiguration, AgentContext, AgentRequest, AgentResponse, AgentType,
    Artifact, ContextMessage, FACTORY_SETTING,
};
