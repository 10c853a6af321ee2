//! Wires the deterministic screening tools into the driver's pause handling.

use anyhow::Result;
use serde_json::Value;

use crate::driver::ToolHandlers;
use crate::engine::ExecutionState;
use crate::screening::models::Criteria;
use crate::screening::questions::dedupe_questions;
use crate::screening::scoring::compute_scores;

/// Tool handlers for the rank-and-questions task.
///
/// Criteria, evidence and N are fixed at construction, so a re-invoked
/// handler produces an identical payload — the driver may safely retry after
/// a handler failure without resubmitting the task.
pub struct ScreeningHandlers {
    criteria: Criteria,
    evidence_json: Value,
    top_n: i64,
}

impl ScreeningHandlers {
    pub fn new(criteria: Criteria, evidence_json: String, top_n: i64) -> Self {
        Self {
            criteria,
            evidence_json: Value::String(evidence_json),
            top_n,
        }
    }
}

impl ToolHandlers for ScreeningHandlers {
    fn compute_scores(&self, _execution: &ExecutionState) -> Result<Value> {
        let result = compute_scores(&self.criteria, &self.evidence_json, self.top_n);
        Ok(serde_json::to_value(result)?)
    }

    /// The raw questions live in the pause's own accumulated output, not in
    /// handler state: pull `questions_json` from the latest snapshot.
    fn dedupe_questions(&self, execution: &ExecutionState) -> Result<Value> {
        let raw = execution
            .output
            .as_ref()
            .and_then(|output| output.get("questions_json"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(serde_json::to_value(dedupe_questions(&raw))?)
    }
}
