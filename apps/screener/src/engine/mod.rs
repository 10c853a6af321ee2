//! Execution-engine client — the single point of entry for all remote calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the engine's HTTP API
//! directly. Submit, poll, and resume traffic MUST go through this module.
//!
//! The engine owns all execution state. This client only reads snapshots and
//! proposes transitions; a resume is accepted by the engine only while the
//! execution is `awaiting_input`, and a rejection is surfaced, never retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("engine unreachable after {retries} retries")]
    Exhausted { retries: u32 },
}

/// Remote execution status as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    AwaitingInput,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    /// `succeeded`, `failed` and `cancelled` end the poll loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Read-only snapshot of one remote execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub id: Uuid,
    pub status: ExecutionStatus,
    /// Accumulated step outputs, keyed by each step's save-as name.
    /// Insertion order is completion order.
    pub output: Option<Value>,
    /// Engine-reported failure detail for failed/cancelled executions.
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExecutionState {
    /// Names of the step outputs accumulated so far.
    pub fn output_keys(&self) -> Vec<String> {
        match &self.output {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Client contract for driving one execution: submit, poll, resume.
///
/// `get_execution` is a side-effect-free read, safe to call repeatedly.
/// `resume_execution` is at-most-once: valid only while the execution is
/// `awaiting_input`, enforced remotely.
#[async_trait]
pub trait ExecutionsApi: Send + Sync {
    async fn create_execution(&self, task_id: &str, input: &Value) -> Result<Uuid, EngineError>;

    async fn get_execution(&self, execution_id: Uuid) -> Result<ExecutionState, EngineError>;

    async fn resume_execution(&self, execution_id: Uuid, payload: &Value)
        -> Result<(), EngineError>;
}

#[derive(Debug, Deserialize)]
struct CreatedExecution {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct EngineApiError {
    error: EngineApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct EngineApiErrorBody {
    message: String,
}

/// reqwest-backed engine client with bounded retry and exponential backoff.
#[derive(Clone)]
pub struct EngineClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EngineClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Sends a request, retrying 429/5xx/transport failures with exponential
    /// backoff (1s, 2s, 4s). Any other non-success status surfaces immediately
    /// — in particular a rejected resume, which must never be replayed.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, EngineError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<EngineError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "engine call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().bearer_auth(&self.api_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EngineError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("engine API returned {}: {}", status, body);
                last_error = Some(EngineError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<EngineApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EngineError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(EngineError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ExecutionsApi for EngineClient {
    async fn create_execution(&self, task_id: &str, input: &Value) -> Result<Uuid, EngineError> {
        let url = format!("{}/tasks/{}/executions", self.base_url, task_id);
        let body = serde_json::json!({ "input": input });

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let created: CreatedExecution = response.json().await?;

        debug!(execution_id = %created.id, task_id, "execution created");
        Ok(created.id)
    }

    async fn get_execution(&self, execution_id: Uuid) -> Result<ExecutionState, EngineError> {
        let url = format!("{}/executions/{}", self.base_url, execution_id);

        let response = self.send_with_retry(|| self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    async fn resume_execution(
        &self,
        execution_id: Uuid,
        payload: &Value,
    ) -> Result<(), EngineError> {
        let url = format!("{}/executions/{}", self.base_url, execution_id);
        let body = serde_json::json!({ "status": "running", "input": payload });

        self.send_with_retry(|| self.client.put(&url).json(&body))
            .await?;
        Ok(())
    }
}
