//! Agent trait
//!
//! The unit of execution the orchestrator drives. An agent is created by the
//! factory, initialized once with an [`AgentConfiguration`], executed any
//! number of times, and shut down when the orchestrator releases its pool.

use super::types::{AgentCapabilities, AgentConfiguration, AgentRequest, AgentResponse, AgentType};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared agent handle
pub type SharedAgent = Arc<dyn Agent>;

/// Agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier (the configured id once initialized)
    fn id(&self) -> &str;

    /// Agent type
    fn agent_type(&self) -> AgentType;

    /// Display name
    fn name(&self) -> &str;

    /// Capability profile
    fn capabilities(&self) -> &AgentCapabilities;

    /// Bind the agent to its configuration. Fails if the agent cannot be used.
    async fn initialize(&self, config: AgentConfiguration, cancel: CancellationToken)
        -> Result<()>;

    /// Run one request.
    ///
    /// Agent-level failures are reported through `AgentResponse::success`;
    /// `Err` is reserved for faults the agent could not turn into a response.
    async fn execute(&self, request: AgentRequest, cancel: CancellationToken)
        -> Result<AgentResponse>;

    /// Release resources
    async fn shutdown(&self, cancel: CancellationToken);
}
