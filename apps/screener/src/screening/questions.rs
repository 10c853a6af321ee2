//! Question Deduplicator — cleans and caps per-candidate interview questions.
//!
//! The raw lists are LLM-authored, so entries may be duplicated, padded with
//! whitespace, or not strings at all. Cleaning is idempotent: running it on
//! its own output changes nothing.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::screening::models::{unknown_name, QuestionPayload, QuestionSet};

/// Hard cap per candidate after cleaning.
pub const MAX_QUESTIONS_PER_CANDIDATE: usize = 5;

#[derive(Debug, Default, Deserialize)]
struct RawQuestionPayload {
    #[serde(default)]
    top_n_questions: Vec<RawQuestionSet>,
}

#[derive(Debug, Deserialize)]
struct RawQuestionSet {
    #[serde(default = "unknown_name")]
    name: String,
    /// Kept untyped: non-string entries are dropped per item, not per payload.
    #[serde(default)]
    questions: Vec<Value>,
}

/// Accepts the questions payload as structured JSON or a JSON-encoded string.
/// For each candidate: keep string entries, trim, drop empties, deduplicate
/// case-insensitively preserving first occurrence, truncate to 5. Unparsable
/// input yields an empty list, never an error.
pub fn dedupe_questions(raw: &Value) -> QuestionPayload {
    let parsed = match raw {
        Value::Null => Ok(RawQuestionPayload::default()),
        Value::String(s) => serde_json::from_str::<RawQuestionPayload>(s),
        other => serde_json::from_value::<RawQuestionPayload>(other.clone()),
    };
    let payload = match parsed {
        Ok(payload) => payload,
        Err(err) => {
            warn!("malformed questions payload, degrading to empty list: {err}");
            RawQuestionPayload::default()
        }
    };

    QuestionPayload {
        top_n_questions: payload.top_n_questions.into_iter().map(clean_set).collect(),
    }
}

fn clean_set(raw: RawQuestionSet) -> QuestionSet {
    let mut seen = HashSet::new();
    let mut questions = Vec::new();
    for value in raw.questions {
        let Value::String(q) = value else { continue };
        let q = q.trim();
        if q.is_empty() {
            continue;
        }
        if seen.insert(q.to_lowercase()) {
            questions.push(q.to_string());
        }
        if questions.len() == MAX_QUESTIONS_PER_CANDIDATE {
            break;
        }
    }
    QuestionSet {
        name: raw.name,
        questions,
    }
}
