//! Agent Orchestrator
//!
//! Owns the agent pool and runs workflows against it.
//!
//! # Module Structure
//!
//! - `types`: requests, responses and the lifecycle state
//! - `execution`: the step loop, per-step timeouts and fault containment
//!
//! # Lifecycle
//!
//! `Uninitialized → Initializing → Initialized → ShuttingDown → Uninitialized`.
//! The pool is built lazily on first use. Executions and `initialize` hold
//! the shutdown gate for reading; `shutdown` takes it for writing, so it
//! waits for in-flight work before releasing agents.

mod execution;
mod types;


pub use types::{OrchestratorRequest, OrchestratorResponse, OrchestratorState, WorkflowRequest};

use crate::agents::{Agent, AgentSetupService, AgentType, SharedAgent};
use crate::config::OrchestratorConfig;
use crate::error::{Error, Result};
use crate::workflow::WorkflowEngine;
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use tokio::sync::{Mutex as AsyncMutex, RwLock as AsyncRwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Coordinates setup, classification and workflow execution
pub struct AgentOrchestrator {
    pub(crate) setup: AgentSetupService,
    pub(crate) engine: WorkflowEngine,
    pub(crate) config: OrchestratorConfig,
    /// Pool keyed by agent id
    pub(crate) agents: DashMap<String, SharedAgent>,
    /// Agent ids in registration order
    pub(crate) agent_order: Mutex<Vec<String>>,
    state: AtomicU8,
    init_lock: AsyncMutex<()>,
    /// Read-held by executions, write-held by shutdown
    pub(crate) gate: AsyncRwLock<()>,
    /// Parent of every execution token; replaced on `cancel`
    cancel_token: Mutex<CancellationToken>,
}

impl AgentOrchestrator {
    /// Create an orchestrator with the built-in workflows
    #[must_use]
    pub fn new(setup: AgentSetupService, config: OrchestratorConfig) -> Self {
        Self {
            setup,
            engine: WorkflowEngine::new(),
            config,
            agents: DashMap::new(),
            agent_order: Mutex::new(Vec::new()),
            state: AtomicU8::new(OrchestratorState::Uninitialized as u8),
            init_lock: AsyncMutex::new(()),
            gate: AsyncRwLock::new(()),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Replace the workflow engine
    #[must_use]
    pub fn with_workflow_engine(mut self, engine: WorkflowEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        OrchestratorState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: OrchestratorState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn transition(&self, from: OrchestratorState, to: OrchestratorState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Orchestrator configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Workflow engine
    #[must_use]
    pub fn workflows(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Token for a new execution
    pub(crate) fn execution_token(&self) -> CancellationToken {
        self.cancel_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .child_token()
    }

    /// Cancel every in-flight execution.
    ///
    /// Later executions are unaffected.
    pub fn cancel(&self) {
        let previous = {
            let mut token = self.cancel_token.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *token, CancellationToken::new())
        };
        previous.cancel();
        info!("Cancelled in-flight executions");
    }

    /// Build the agent pool if it does not exist yet
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        let _gate = self.gate.read().await;
        self.initialize_gated().await
    }

    /// Initialize while the caller holds the gate for reading
    pub(crate) async fn initialize_gated(&self) -> Result<()> {
        if self.state() == OrchestratorState::ShuttingDown {
            return Err(Error::ShuttingDown);
        }

        let _guard = self.init_lock.lock().await;
        match self.state() {
            OrchestratorState::Initialized => return Ok(()),
            OrchestratorState::ShuttingDown => return Err(Error::ShuttingDown),
            OrchestratorState::Uninitialized | OrchestratorState::Initializing => {}
        }
        self.set_state(OrchestratorState::Initializing);

        let agents = match self.setup.setup_agents(self.execution_token()).await {
            Ok(agents) => agents,
            Err(e) => {
                self.transition(OrchestratorState::Initializing, OrchestratorState::Uninitialized);
                error!(error = %e, "Orchestrator initialization failed");
                return Err(e);
            }
        };

        for agent in agents {
            self.register_agent(agent);
        }
        self.transition(OrchestratorState::Initializing, OrchestratorState::Initialized);

        info!(agents = self.agent_count(), "Orchestrator initialized");
        Ok(())
    }

    fn register_agent(&self, agent: SharedAgent) {
        let id = agent.id().to_string();
        let inserted = match self.agents.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(agent);
                true
            }
        };

        if inserted {
            self.agent_order
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(id);
        } else {
            warn!(agent_id = %id, "Duplicate agent id, keeping the first agent");
        }
    }

    /// Agent by id
    #[must_use]
    pub fn get_agent(&self, id: &str) -> Option<SharedAgent> {
        self.agents.get(id).map(|entry| entry.value().clone())
    }

    /// First registered agent of a type
    #[must_use]
    pub fn get_agent_for_type(&self, agent_type: AgentType) -> Option<SharedAgent> {
        let order = self.agent_order.lock().unwrap_or_else(|e| e.into_inner());
        order
            .iter()
            .filter_map(|id| self.get_agent(id))
            .find(|agent| agent.agent_type() == agent_type)
    }

    /// Every pooled agent in registration order
    #[must_use]
    pub fn get_all_agents(&self) -> Vec<SharedAgent> {
        let order = self.agent_order.lock().unwrap_or_else(|e| e.into_inner());
        order.iter().filter_map(|id| self.get_agent(id)).collect()
    }

    /// Number of pooled agents
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Drain in-flight work, shut every agent down and clear the pool
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        loop {
            let current = self.state();
            match current {
                OrchestratorState::Uninitialized | OrchestratorState::ShuttingDown => return,
                OrchestratorState::Initializing | OrchestratorState::Initialized => {
                    if self.transition(current, OrchestratorState::ShuttingDown) {
                        break;
                    }
                }
            }
        }
        info!("Orchestrator shutting down");

        let _gate = self.gate.write().await;

        let agents: Vec<SharedAgent> = {
            let mut order = self.agent_order.lock().unwrap_or_else(|e| e.into_inner());
            order
                .drain(..)
                .filter_map(|id| self.agents.remove(&id).map(|(_, agent)| agent))
                .collect()
        };
        self.agents.clear();

        let token = CancellationToken::new();
        join_all(agents.iter().map(|agent| agent.shutdown(token.clone()))).await;

        self.set_state(OrchestratorState::Uninitialized);
        info!(agents = agents.len(), "Orchestrator shut down");
    }
}
