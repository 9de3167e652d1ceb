//! Workflow execution
//!
//! Runs a workflow's steps in order, threading one context through them.
//! Agent errors, panics and timeouts are contained and reported as failed
//! steps; nothing escapes to the caller.

use super::types::{OrchestratorRequest, OrchestratorResponse, OrchestratorState, WorkflowRequest};
use super::AgentOrchestrator;
use crate::agents::{
    Agent, AgentContext, AgentRequest, AgentResponse, ContextMessage, SharedAgent,
};
use crate::error::Error;
use crate::workflow::{WorkflowDefinition, WorkflowStep};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Message carried by a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl AgentOrchestrator {
    /// Classify a request and run the matching workflow
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn process_command(&self, request: OrchestratorRequest) -> OrchestratorResponse {
        let cancel = self.execution_token();
        self.process_command_with_cancel(request, cancel).await
    }

    /// Like [`process_command`](Self::process_command) with a caller token
    pub async fn process_command_with_cancel(
        &self,
        request: OrchestratorRequest,
        cancel: CancellationToken,
    ) -> OrchestratorResponse {
        let start = Instant::now();
        if self.state() == OrchestratorState::ShuttingDown {
            return OrchestratorResponse::rejected(&request.request_id, Error::ShuttingDown.to_string());
        }
        let _gate = self.gate.read().await;

        if let Err(e) = self.admit().await {
            return OrchestratorResponse::rejected(&request.request_id, e.to_string())
                .with_duration(start.elapsed().as_millis() as u64);
        }

        let Some(workflow) = self.engine.determine_workflow(&request) else {
            let error = Error::WorkflowNotFound(format!("no workflow matches '{}'", request.command));
            warn!(request_id = %request.request_id, error = %error, "Request not classified");
            return OrchestratorResponse::rejected(&request.request_id, error.to_string())
                .with_duration(start.elapsed().as_millis() as u64);
        };

        self.run_guarded(&workflow, &request, cancel)
            .await
            .with_duration(start.elapsed().as_millis() as u64)
    }

    /// Run a workflow by id.
    ///
    /// The definition is run as looked up; the command is never
    /// reclassified, so the synthesized request's command (the workflow
    /// name) only reaches the agents.
    #[instrument(skip(self, request))]
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        request: WorkflowRequest,
    ) -> OrchestratorResponse {
        let start = Instant::now();
        let cancel = self.execution_token();
        if self.state() == OrchestratorState::ShuttingDown {
            let request = request.into_request(workflow_id);
            return OrchestratorResponse::rejected(&request.request_id, Error::ShuttingDown.to_string());
        }
        let _gate = self.gate.read().await;

        let Some(workflow) = self.engine.get_workflow(workflow_id) else {
            let error = Error::WorkflowNotFound(workflow_id.to_string());
            let request = request.into_request(workflow_id);
            return OrchestratorResponse::rejected(&request.request_id, error.to_string());
        };
        let request = request.into_request(workflow.name.clone());

        if let Err(e) = self.admit().await {
            return OrchestratorResponse::rejected(&request.request_id, e.to_string())
                .with_duration(start.elapsed().as_millis() as u64);
        }

        self.run_guarded(&workflow, &request, cancel)
            .await
            .with_duration(start.elapsed().as_millis() as u64)
    }

    /// Reject during shutdown, initialize lazily otherwise
    async fn admit(&self) -> crate::error::Result<()> {
        if self.state() == OrchestratorState::ShuttingDown {
            return Err(Error::ShuttingDown);
        }
        self.initialize_gated().await
    }

    async fn run_guarded(
        &self,
        workflow: &WorkflowDefinition,
        request: &OrchestratorRequest,
        cancel: CancellationToken,
    ) -> OrchestratorResponse {
        match AssertUnwindSafe(self.run_workflow(workflow, request, cancel))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(
                    request_id = %request.request_id,
                    workflow = %workflow.id,
                    panic = %message,
                    "Workflow execution panicked"
                );
                let mut response = OrchestratorResponse::rejected(
                    &request.request_id,
                    Error::Internal(message).to_string(),
                );
                response.workflow_id = Some(workflow.id.clone());
                response
            }
        }
    }

    async fn run_workflow(
        &self,
        workflow: &WorkflowDefinition,
        request: &OrchestratorRequest,
        cancel: CancellationToken,
    ) -> OrchestratorResponse {
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut context = AgentContext::new(session_id)
            .with_project(request.project_id.clone())
            .with_working_directory(request.working_directory.clone())
            .with_token_budget(self.config.token_budget);
        let mut responses: Vec<AgentResponse> = Vec::new();

        info!(
            request_id = %request.request_id,
            workflow = %workflow.id,
            steps = workflow.steps.len(),
            "Executing workflow"
        );

        for step in workflow.ordered_steps() {
            if cancel.is_cancelled() {
                return self.failed(workflow, request, Error::Cancelled, responses, context);
            }
            if context.budget_exhausted() {
                let error = Error::BudgetExceeded {
                    used: context.tokens_used,
                    budget: self.config.token_budget,
                };
                return self.failed(workflow, request, error, responses, context);
            }

            let Some(agent) = self.get_agent_for_type(step.agent_type) else {
                if step.required && self.config.fail_on_missing_required_agent {
                    let error = Error::AgentUnavailable {
                        step: step.name.clone(),
                        agent_type: step.agent_type,
                    };
                    return self.failed(workflow, request, error, responses, context);
                }
                warn!(
                    step = %step.name,
                    agent_type = %step.agent_type,
                    "No agent for step, skipping"
                );
                continue;
            };

            let mut parameters = request.parameters.clone();
            parameters.extend(step.parameters.clone());
            let content = step
                .content
                .clone()
                .unwrap_or_else(|| request.content.clone());
            let agent_request = AgentRequest::new(step.command.clone(), content, context.clone())
                .with_parameters(parameters);

            let response = self.execute_step(&agent, step, agent_request, &cancel).await;
            debug!(
                step = %step.name,
                agent_id = %response.agent_id,
                success = response.success,
                duration_ms = response.duration_ms,
                "Step finished"
            );

            if !response.success && step.required {
                let message = response
                    .error
                    .clone()
                    .unwrap_or_else(|| "step reported failure".to_string());
                responses.push(response);
                let error = Error::StepFailed {
                    step: step.name.clone(),
                    message,
                };
                return self.failed(workflow, request, error, responses, context);
            }

            context = response.context.clone();
            if response.success {
                context.push_history(ContextMessage::assistant(
                    response.agent_id.clone(),
                    response.content.clone(),
                ));
            } else {
                warn!(
                    step = %step.name,
                    error = ?response.error,
                    "Optional step failed, continuing"
                );
            }
            responses.push(response);
        }

        let content = responses
            .iter()
            .filter(|r| r.success)
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        info!(
            request_id = %request.request_id,
            workflow = %workflow.id,
            steps_run = responses.len(),
            tokens_used = context.tokens_used,
            "Workflow completed"
        );

        OrchestratorResponse {
            request_id: request.request_id.clone(),
            success: true,
            content,
            workflow_id: Some(workflow.id.clone()),
            agent_responses: responses,
            context: Some(context),
            error: None,
            duration_ms: 0,
        }
    }

    /// Run one step with timeout and fault containment
    async fn execute_step(
        &self,
        agent: &SharedAgent,
        step: &WorkflowStep,
        request: AgentRequest,
        cancel: &CancellationToken,
    ) -> AgentResponse {
        let step_cancel = cancel.child_token();
        let fallback_context = request.context.clone();
        let agent_id = agent.id().to_string();
        let timeout_secs = step.timeout_secs.or(self.config.default_step_timeout_secs);
        let start = Instant::now();

        let call = AssertUnwindSafe(agent.execute(request, step_cancel.clone())).catch_unwind();
        let outcome = match timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    step_cancel.cancel();
                    warn!(step = %step.name, agent_id = %agent_id, timeout_secs = secs, "Step timed out");
                    return AgentResponse::failure(
                        agent_id,
                        format!("timed out after {}s", secs),
                        fallback_context,
                    )
                    .with_duration(start.elapsed().as_millis() as u64);
                }
            },
            None => call.await,
        };

        let elapsed = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(response)) if response.duration_ms == 0 => response.with_duration(elapsed),
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(step = %step.name, agent_id = %agent_id, error = %e, "Agent returned an error");
                AgentResponse::failure(agent_id, e.to_string(), fallback_context)
                    .with_duration(elapsed)
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(step = %step.name, agent_id = %agent_id, panic = %message, "Agent panicked");
                AgentResponse::failure(
                    agent_id,
                    format!("agent panicked: {}", message),
                    fallback_context,
                )
                .with_duration(elapsed)
            }
        }
    }

    fn failed(
        &self,
        workflow: &WorkflowDefinition,
        request: &OrchestratorRequest,
        error: Error,
        responses: Vec<AgentResponse>,
        context: AgentContext,
    ) -> OrchestratorResponse {
        warn!(
            request_id = %request.request_id,
            workflow = %workflow.id,
            error = %error,
            "Workflow failed"
        );
        OrchestratorResponse {
            request_id: request.request_id.clone(),
            success: false,
            content: String::new(),
            workflow_id: Some(workflow.id.clone()),
            agent_responses: responses,
            context: Some(context),
            error: Some(error.to_string()),
            duration_ms: 0,
        }
    }
}
