mod config;
mod driver;
mod engine;
mod errors;
mod pipeline;
mod screening;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::driver::{Driver, DriverConfig};
use crate::engine::EngineClient;
use crate::errors::PipelineError;
use crate::pipeline::run_screening;
use crate::screening::models::{Criteria, ResumeDoc, ScoringWeights, ScreeningRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the engine client and driver
    let engine = Arc::new(EngineClient::new(
        config.engine_base_url.clone(),
        config.engine_api_key.clone(),
    ));
    let driver = Driver::new(
        engine,
        DriverConfig {
            poll_interval: config.poll_interval,
            deadline: config.execution_deadline,
        },
    );

    let request = load_request()?;
    info!(
        role = %request.criteria.role,
        resumes = request.resumes.len(),
        n = request.n,
        "screening request loaded"
    );

    match run_screening(&driver, &config, request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(PipelineError::Decode(err)) => {
            error!("failed to decode terminal payload: {err}");
            // last-known output, verbatim, for forensic recovery
            if let Some(raw) = err.raw() {
                println!("{raw}");
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Loads the screening request from the JSON file named by `SCREENING_INPUT`,
/// falling back to the built-in sample run.
fn load_request() -> Result<ScreeningRequest> {
    match std::env::var("SCREENING_INPUT") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read screening input '{path}'"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Screening input '{path}' is not a valid request"))
        }
        Err(_) => Ok(sample_request()),
    }
}

fn sample_request() -> ScreeningRequest {
    ScreeningRequest {
        criteria: Criteria {
            role: "Senior Backend Engineer".to_string(),
            must_haves: vec![
                "Python".to_string(),
                "Distributed systems".to_string(),
                "PostgreSQL".to_string(),
            ],
            nice_to_haves: vec![
                "Kubernetes".to_string(),
                "AWS".to_string(),
                "gRPC".to_string(),
            ],
            weights: ScoringWeights::default(),
            disqualifiers: vec![],
        },
        resumes: vec![
            ResumeDoc {
                name: "Alice Smith".to_string(),
                text: "Python, FastAPI, PostgreSQL, 5y backend, AWS, K8s, microservices..."
                    .to_string(),
            },
            ResumeDoc {
                name: "Bob Lee".to_string(),
                text: "Java, Spring, MySQL, some Python, 3y backend, Kafka...".to_string(),
            },
            ResumeDoc {
                name: "Carmen Diaz".to_string(),
                text: "Python, Django, Postgres, 7y backend, distributed systems, gRPC, AWS..."
                    .to_string(),
            },
        ],
        n: 2,
    }
}
