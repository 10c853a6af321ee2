use std::time::Duration;

use anyhow::{Context, Result};

/// Pipeline configuration loaded from environment variables.
/// Task ids refer to tasks pre-registered on the engine — registering them is
/// not this client's job.
#[derive(Debug, Clone)]
pub struct Config {
    pub engine_base_url: String,
    pub engine_api_key: String,
    pub extract_task_id: String,
    pub rank_task_id: String,
    pub poll_interval: Duration,
    /// `None` disables the per-execution deadline.
    pub execution_deadline: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let poll_interval_ms = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .context("POLL_INTERVAL_MS must be an integer number of milliseconds")?;
        let deadline_secs = std::env::var("EXECUTION_DEADLINE_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .context("EXECUTION_DEADLINE_SECS must be an integer number of seconds (0 disables)")?;

        Ok(Config {
            engine_base_url: require_env("ENGINE_BASE_URL")?,
            engine_api_key: require_env("ENGINE_API_KEY")?,
            extract_task_id: require_env("EXTRACT_TASK_ID")?,
            rank_task_id: require_env("RANK_TASK_ID")?,
            poll_interval: Duration::from_millis(poll_interval_ms),
            execution_deadline: (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs)),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
