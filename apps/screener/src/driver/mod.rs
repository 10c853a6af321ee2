//! Execution Driver — polls a remote execution, classifies pauses, routes to
//! the correct local tool handler, resumes, and surfaces terminal results.
//!
//! The engine owns all execution state; the driver is a read-then-resume loop
//! with no mutable state of its own. One `Driver` may drive independent
//! executions concurrently — each call runs its own isolated poll loop.

pub mod decode;
pub mod routing;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::driver::routing::{classify_pause, PauseRoute};
use crate::engine::{EngineError, ExecutionState, ExecutionStatus, ExecutionsApi};

/// Tool names as declared on the remote rank task.
pub const COMPUTE_SCORES_TOOL: &str = "compute_scores";
pub const DEDUPE_QUESTIONS_TOOL: &str = "dedupe_questions";

#[derive(Debug, Error)]
pub enum DriverError {
    /// Transport failures that exhausted the engine client's retry budget.
    #[error("engine I/O error: {0}")]
    Io(#[from] EngineError),

    /// The pause-routing heuristic could not disambiguate the pending step.
    /// Fatal: invoking the wrong handler would corrupt downstream state.
    #[error("cannot route paused execution {execution_id}: unrecognized output keys {keys:?}")]
    Unroutable { execution_id: Uuid, keys: Vec<String> },

    /// The execution paused but the caller registered no handlers at all.
    #[error("execution {execution_id} is awaiting input but no tool handlers are registered")]
    UnexpectedPause { execution_id: Uuid },

    /// A local handler failed. The execution is left `awaiting_input` remotely
    /// so a retry can re-invoke the handler without resubmitting the task.
    #[error("tool handler '{tool}' failed: {source}")]
    ToolHandler {
        tool: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("execution {execution_id} did not reach a terminal status within {deadline:?}")]
    DeadlineExceeded {
        execution_id: Uuid,
        deadline: Duration,
    },
}

/// Local, deterministic handlers invoked to satisfy tool pauses.
///
/// Handlers are pure and synchronous, hence callable from any poll loop
/// without synchronization. Returning an error leaves the execution paused.
pub trait ToolHandlers: Send + Sync {
    fn compute_scores(&self, execution: &ExecutionState) -> anyhow::Result<Value>;

    fn dedupe_questions(&self, execution: &ExecutionState) -> anyhow::Result<Value>;
}

/// Poll cadence and overall deadline for one driven execution.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub poll_interval: Duration,
    /// `None` polls until terminal with no time bound.
    pub deadline: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            deadline: Some(Duration::from_secs(300)),
        }
    }
}

/// Drives remote executions to completion against an injected engine client.
pub struct Driver {
    engine: Arc<dyn ExecutionsApi>,
    config: DriverConfig,
}

impl Driver {
    pub fn new(engine: Arc<dyn ExecutionsApi>, config: DriverConfig) -> Self {
        Self { engine, config }
    }

    /// Submits `input` under `task_id` and polls until a terminal status.
    ///
    /// `awaiting_input` pauses are classified from the accumulated output and
    /// satisfied through `handlers`; pass `None` for prompt-only tasks, where
    /// any pause is an error. Returns the final `ExecutionState` whatever its
    /// terminal status — failed and cancelled states carry the engine's error
    /// detail for the caller to surface. Dropping the future cancels the loop.
    pub async fn drive_to_completion(
        &self,
        task_id: &str,
        input: Value,
        handlers: Option<&dyn ToolHandlers>,
    ) -> Result<ExecutionState, DriverError> {
        let started = Instant::now();
        let execution_id = self.engine.create_execution(task_id, &input).await?;
        info!(%execution_id, task_id, "execution started");

        loop {
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    return Err(DriverError::DeadlineExceeded {
                        execution_id,
                        deadline,
                    });
                }
            }

            let execution = self.engine.get_execution(execution_id).await?;
            debug!(%execution_id, status = ?execution.status, "polled");

            if execution.status.is_terminal() {
                return Ok(execution);
            }
            if execution.status == ExecutionStatus::AwaitingInput {
                self.handle_pause(&execution, handlers).await?;
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn handle_pause(
        &self,
        execution: &ExecutionState,
        handlers: Option<&dyn ToolHandlers>,
    ) -> Result<(), DriverError> {
        let handlers = handlers.ok_or(DriverError::UnexpectedPause {
            execution_id: execution.id,
        })?;

        let (tool, payload) = match classify_pause(execution.output.as_ref()) {
            PauseRoute::ComputeScores => (COMPUTE_SCORES_TOOL, handlers.compute_scores(execution)),
            PauseRoute::DedupeQuestions => {
                (DEDUPE_QUESTIONS_TOOL, handlers.dedupe_questions(execution))
            }
            PauseRoute::PromptInFlight => {
                debug!(execution_id = %execution.id, "paused on a prompt step; continuing to poll");
                return Ok(());
            }
            PauseRoute::Unroutable => {
                return Err(DriverError::Unroutable {
                    execution_id: execution.id,
                    keys: execution.output_keys(),
                });
            }
        };

        let payload = payload.map_err(|source| DriverError::ToolHandler { tool, source })?;
        self.engine.resume_execution(execution.id, &payload).await?;
        info!(execution_id = %execution.id, tool, "tool result supplied, execution resumed");
        Ok(())
    }
}
