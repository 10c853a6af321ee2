//! Data contracts for the screening pipeline.
//!
//! Every boundary payload (evidence, questions, final result) gets one typed
//! decoding function that accepts either the structured form or a
//! JSON-encoded string of it. Tolerance rules live here: lenient fields never
//! fail the whole contract, and a malformed payload degrades to an empty
//! default with a `warn!` rather than an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Requirement-category weights. Conceptually sum to 1.0, not enforced.
/// Missing keys fall back per-field, matching the scoring contract defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_must_weight")]
    pub must_haves: f64,
    #[serde(default = "default_nice_weight")]
    pub nice_to_haves: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            must_haves: default_must_weight(),
            nice_to_haves: default_nice_weight(),
            experience: default_experience_weight(),
        }
    }
}

fn default_must_weight() -> f64 {
    0.6
}

fn default_nice_weight() -> f64 {
    0.2
}

fn default_experience_weight() -> f64 {
    0.2
}

/// Role requirements supplied by the caller. Immutable input to scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    pub role: String,
    #[serde(default)]
    pub must_haves: Vec<String>,
    #[serde(default)]
    pub nice_to_haves: Vec<String>,
    #[serde(default)]
    pub weights: ScoringWeights,
    /// Part of the contract; carried through but not evaluated during scoring.
    #[serde(default)]
    pub disqualifiers: Vec<String>,
}

/// One (role, years) entry from a candidate's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub role: String,
    /// Tolerates a number, a numeric string, or garbage (counted as 0 years).
    #[serde(default, deserialize_with = "lenient_years")]
    pub years: f64,
}

/// Structured evidence for one candidate, produced by the extraction task and
/// read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default = "unknown_name", deserialize_with = "name_or_unknown")]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Wire shape of the extraction task's output: `{"evidence": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidencePayload {
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
}

impl EvidencePayload {
    /// Decodes the payload from a structured value or a JSON-encoded string.
    /// Malformed input degrades to an empty evidence set — scoring must never
    /// fail on a bad upstream payload.
    pub fn decode(raw: &Value) -> Self {
        let parsed = match raw {
            Value::Null => return Self::default(),
            Value::String(s) => serde_json::from_str::<Self>(s),
            other => serde_json::from_value::<Self>(other.clone()),
        };
        match parsed {
            Ok(payload) => payload,
            Err(err) => {
                warn!("malformed evidence payload, degrading to empty set: {err}");
                Self::default()
            }
        }
    }
}

/// Per-candidate score and rationale. Derived, recomputed each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub name: String,
    /// In [0, 1], rounded to 4 decimal places.
    pub score: f64,
    pub rationale: String,
}

/// Output contract of the `compute_scores` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Sorted non-increasing by score; ties keep the original evidence order.
    pub ranked: Vec<ScoredCandidate>,
    pub top_n_names: Vec<String>,
    pub evidence: Vec<EvidenceItem>,
}

/// Cleaned interview questions for one candidate: at most 5, unique
/// case-insensitively, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub name: String,
    pub questions: Vec<String>,
}

/// Wire shape around question sets: `{"top_n_questions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    #[serde(default)]
    pub top_n_questions: Vec<QuestionSet>,
}

/// Terminal contract of the rank-and-questions task after its merge step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResult {
    #[serde(default)]
    pub ranked: Vec<ScoredCandidate>,
    #[serde(default)]
    pub top_n_questions: Vec<QuestionSet>,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
}

/// One raw resume document, the evidence input contract: `{"name", "text"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDoc {
    pub name: String,
    pub text: String,
}

/// Caller-facing request for one full screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRequest {
    pub criteria: Criteria,
    pub resumes: Vec<ResumeDoc>,
    /// Top-N size; coerced to at least 1 by the scoring engine.
    pub n: i64,
}

pub(crate) fn unknown_name() -> String {
    "Unknown".to_string()
}

fn name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        _ => Ok(unknown_name()),
    }
}

fn lenient_years<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
