//! Pause routing — infers which suspended step caused an `awaiting_input`
//! pause from the shape of the accumulated output.
//!
//! The engine's pause notification does not name the awaited tool, so the
//! only signal is which step outputs already exist. The rule assumes the
//! known step order of the rank task: compute_scores → question prompt →
//! dedupe_questions → merge. Any combination outside that order is fatal:
//! invoking the wrong handler would corrupt downstream state, so the driver
//! must fail loudly rather than guess.

use serde_json::Value;

/// Which local action an `awaiting_input` pause calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseRoute {
    /// No tool output accumulated yet: the first tool step is pending.
    ComputeScores,
    /// `questions_json` exists but has not been cleaned: the dedupe tool is pending.
    DedupeQuestions,
    /// Scoring is done and the question prompt has produced nothing yet:
    /// the pause belongs to a prompt step. Invoke no handler, keep polling.
    PromptInFlight,
    /// No recognized combination of step outputs. Fatal.
    Unroutable,
}

/// Classifies a pause from the presence of the three step-output keys.
/// Pure and exhaustively unit-tested — the single place this heuristic lives.
pub fn classify_pause(output: Option<&Value>) -> PauseRoute {
    let has = |key: &str| matches!(output, Some(Value::Object(map)) if map.contains_key(key));
    let scored = has("scored");
    let questions_json = has("questions_json");
    let questions_clean = has("questions_clean");

    match (scored, questions_json, questions_clean) {
        (_, true, false) => PauseRoute::DedupeQuestions,
        (false, false, false) => PauseRoute::ComputeScores,
        (true, false, false) => PauseRoute::PromptInFlight,
        _ => PauseRoute::Unroutable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output_with(keys: &[&str]) -> Value {
        let mut map = serde_json::Map::new();
        for key in keys {
            map.insert(key.to_string(), json!("x"));
        }
        Value::Object(map)
    }

    fn classify(keys: &[&str]) -> PauseRoute {
        classify_pause(Some(&output_with(keys)))
    }

    // All 8 combinations of (scored, questions_json, questions_clean).

    #[test]
    fn test_no_outputs_routes_to_compute_scores() {
        assert_eq!(classify(&[]), PauseRoute::ComputeScores);
    }

    #[test]
    fn test_scored_only_is_a_prompt_pause() {
        assert_eq!(classify(&["scored"]), PauseRoute::PromptInFlight);
    }

    #[test]
    fn test_questions_json_routes_to_dedupe() {
        assert_eq!(classify(&["questions_json"]), PauseRoute::DedupeQuestions);
        assert_eq!(
            classify(&["scored", "questions_json"]),
            PauseRoute::DedupeQuestions
        );
    }

    #[test]
    fn test_clean_without_raw_questions_is_unroutable() {
        assert_eq!(classify(&["questions_clean"]), PauseRoute::Unroutable);
        assert_eq!(
            classify(&["scored", "questions_clean"]),
            PauseRoute::Unroutable
        );
    }

    #[test]
    fn test_fully_accumulated_output_is_unroutable() {
        assert_eq!(
            classify(&["questions_json", "questions_clean"]),
            PauseRoute::Unroutable
        );
        assert_eq!(
            classify(&["scored", "questions_json", "questions_clean"]),
            PauseRoute::Unroutable
        );
    }

    #[test]
    fn test_unrelated_keys_do_not_affect_routing() {
        assert_eq!(classify(&["evidence_json"]), PauseRoute::ComputeScores);
    }

    #[test]
    fn test_missing_or_non_object_output_routes_to_compute_scores() {
        assert_eq!(classify_pause(None), PauseRoute::ComputeScores);
        assert_eq!(
            classify_pause(Some(&json!("free-form"))),
            PauseRoute::ComputeScores
        );
    }
}
