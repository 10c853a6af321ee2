//! Screening pipeline — drives the two remote tasks in sequence.
//!
//! Flow: extract task (prompt-only, no handlers) → evidence_json →
//!       rank task (tool pauses satisfied by ScreeningHandlers) → decode.
//!
//! Each task is one isolated poll/resume loop; nothing is shared between
//! them except the evidence string handed from A to B.

use serde_json::json;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::driver::decode::decode_final_result;
use crate::driver::Driver;
use crate::engine::{ExecutionState, ExecutionStatus};
use crate::errors::PipelineError;
use crate::screening::handlers::ScreeningHandlers;
use crate::screening::models::{FinalResult, ScreeningRequest};

/// Runs the full screening pipeline and returns the typed final result.
pub async fn run_screening(
    driver: &Driver,
    config: &Config,
    request: ScreeningRequest,
) -> Result<FinalResult, PipelineError> {
    // Task A: evidence extraction. Prompt-only — it must never pause.
    info!(
        resumes = request.resumes.len(),
        role = %request.criteria.role,
        "extracting evidence"
    );
    let extraction = driver
        .drive_to_completion(
            &config.extract_task_id,
            json!({ "resumes": request.resumes }),
            None,
        )
        .await?;
    let extraction = require_succeeded(extraction)?;

    let evidence_json = extraction
        .output
        .as_ref()
        .and_then(|output| output.get("evidence_json"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if evidence_json.is_empty() {
        warn!("extraction produced no evidence_json; scoring will see an empty evidence set");
    }

    // Task B: score via tool, draft questions, dedupe via tool, merge.
    info!("ranking candidates and drafting questions");
    let handlers =
        ScreeningHandlers::new(request.criteria.clone(), evidence_json.clone(), request.n);
    let ranking = driver
        .drive_to_completion(
            &config.rank_task_id,
            json!({
                "criteria": request.criteria,
                "evidence_json": evidence_json,
                "n": request.n,
            }),
            Some(&handlers),
        )
        .await?;
    let ranking = require_succeeded(ranking)?;

    let result = decode_final_result(ranking.output.as_ref())?;
    info!(ranked = result.ranked.len(), "screening complete");
    Ok(result)
}

/// Surfaces a non-succeeded terminal state with full forensics: status, the
/// engine-reported error, and the raw accumulated output verbatim. The
/// last-known output is never discarded.
fn require_succeeded(execution: ExecutionState) -> Result<ExecutionState, PipelineError> {
    if execution.status == ExecutionStatus::Succeeded {
        return Ok(execution);
    }

    let raw_output = execution
        .output
        .as_ref()
        .map(|o| o.to_string())
        .unwrap_or_else(|| "<none>".to_string());
    error!(
        execution_id = %execution.id,
        status = ?execution.status,
        error = execution.error.as_deref().unwrap_or("<none>"),
        created_at = ?execution.created_at,
        %raw_output,
        "execution did not succeed"
    );

    Err(PipelineError::ExecutionFailed {
        execution_id: execution.id,
        status: execution.status,
        detail: execution
            .error
            .unwrap_or_else(|| "no error detail reported".to_string()),
    })
}
