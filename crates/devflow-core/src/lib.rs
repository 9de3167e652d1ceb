//! Devflow Core - Agent Orchestration Engine
//!
//! This crate provides the orchestration side of devflow:
//! - Agents: the `Agent` trait, the provider-backed `LlmAgent`, the factory
//!   and the setup service that builds the agent pool
//! - Workflow: workflow definitions, built-in workflows and classification
//! - Orchestrator: lifecycle, sequential step execution and shutdown
//! - Config: orchestrator and setup configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{
    Agent, AgentCapabilities, AgentConfiguration, AgentContext, AgentFactory, AgentProfile,
    AgentRequest, AgentResponse, AgentSetupService, AgentType, Artifact, ContextMessage, LlmAgent,
    SharedAgent,
};
pub use config::{OrchestratorConfig, SetupConfig};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use orchestrator::{
    AgentOrchestrator, OrchestratorRequest, OrchestratorResponse, OrchestratorState,
    WorkflowRequest,
};
pub use workflow::{
    KeywordClassifier, WorkflowClassifier, WorkflowDefinition, WorkflowEngine, WorkflowStep,
};
