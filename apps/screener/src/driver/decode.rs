//! Result Decoder — normalizes the terminal payload of a succeeded execution.
//!
//! Engines are inconsistent about the final shape: sometimes a mapping with a
//! `result_json` string, sometimes the output itself is a JSON-encoded
//! string, sometimes a mapping with no wrapper at all. Whatever arrives,
//! nothing is discarded — unparsable payloads ride along in the error for
//! forensic recovery.

use serde_json::Value;
use thiserror::Error;

use crate::screening::models::FinalResult;

#[derive(Debug, Error)]
pub enum ResultDecodeError {
    #[error("terminal output is not valid JSON (raw preserved)")]
    UnparsableJson { raw: String },

    #[error("terminal output has no recognized shape (raw preserved)")]
    UnrecognizedShape { raw: Value },

    #[error("terminal output does not match the final result contract: {source}")]
    Contract {
        raw: Value,
        #[source]
        source: serde_json::Error,
    },

    #[error("succeeded execution carried no output")]
    MissingOutput,
}

impl ResultDecodeError {
    /// The preserved raw payload, rendered for forensic logging.
    pub fn raw(&self) -> Option<String> {
        match self {
            Self::UnparsableJson { raw } => Some(raw.clone()),
            Self::UnrecognizedShape { raw } | Self::Contract { raw, .. } => Some(raw.to_string()),
            Self::MissingOutput => None,
        }
    }
}

/// Terminal payload after shape normalization, before contract typing.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalPayload {
    /// JSON recovered from the `result_json` wrapper or a raw JSON string.
    Json(Value),
    /// String output that did not parse as JSON, kept verbatim.
    OpaqueText(String),
    /// Mapping without a `result_json` wrapper, passed through untouched.
    Unwrapped(Value),
}

/// Normalizes the three accepted terminal shapes into one classification.
pub fn classify_terminal_payload(output: &Value) -> TerminalPayload {
    match output {
        Value::Object(map) => match map.get("result_json") {
            Some(Value::String(s)) => parse_json_text(s),
            Some(other) => TerminalPayload::Json(other.clone()),
            None => TerminalPayload::Unwrapped(output.clone()),
        },
        Value::String(s) => parse_json_text(s),
        other => TerminalPayload::Unwrapped(other.clone()),
    }
}

fn parse_json_text(text: &str) -> TerminalPayload {
    match serde_json::from_str(text) {
        Ok(parsed) => TerminalPayload::Json(parsed),
        Err(_) => TerminalPayload::OpaqueText(text.to_string()),
    }
}

/// Types the normalized payload against the final result contract. Returns a
/// typed error carrying the raw payload — never a silent best-effort fallback.
pub fn decode_final_result(output: Option<&Value>) -> Result<FinalResult, ResultDecodeError> {
    let output = output.ok_or(ResultDecodeError::MissingOutput)?;
    match classify_terminal_payload(output) {
        TerminalPayload::Json(value) => serde_json::from_value(value.clone())
            .map_err(|source| ResultDecodeError::Contract { raw: value, source }),
        TerminalPayload::OpaqueText(raw) => Err(ResultDecodeError::UnparsableJson { raw }),
        TerminalPayload::Unwrapped(raw) => Err(ResultDecodeError::UnrecognizedShape { raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_json_wrapper_string_decodes() {
        let output = json!({ "result_json": "{\"ranked\":[]}" });
        let result = decode_final_result(Some(&output)).unwrap();
        assert!(result.ranked.is_empty());
        assert!(result.top_n_questions.is_empty());
    }

    #[test]
    fn test_result_json_wrapper_object_decodes() {
        let output = json!({ "result_json": {
            "ranked": [{ "name": "Alice", "score": 0.9, "rationale": "Exp: 5y" }]
        }});
        let result = decode_final_result(Some(&output)).unwrap();
        assert_eq!(result.ranked[0].name, "Alice");
    }

    #[test]
    fn test_raw_json_string_output_decodes() {
        let output = Value::String("{\"ranked\":[],\"top_n_questions\":[]}".to_string());
        assert!(decode_final_result(Some(&output)).is_ok());
    }

    #[test]
    fn test_unparsable_string_is_preserved_verbatim() {
        let output = json!({ "result_json": "{broken" });
        let err = decode_final_result(Some(&output)).unwrap_err();
        match &err {
            ResultDecodeError::UnparsableJson { raw } => assert_eq!(raw, "{broken"),
            other => panic!("expected UnparsableJson, got {other:?}"),
        }
        assert_eq!(err.raw().as_deref(), Some("{broken"));
    }

    #[test]
    fn test_unwrapped_mapping_is_preserved() {
        let output = json!({ "something_else": 1 });
        let err = decode_final_result(Some(&output)).unwrap_err();
        match err {
            ResultDecodeError::UnrecognizedShape { raw } => {
                assert_eq!(raw, json!({ "something_else": 1 }));
            }
            other => panic!("expected UnrecognizedShape, got {other:?}"),
        }
    }

    #[test]
    fn test_contract_mismatch_keeps_raw() {
        // parses as JSON but `ranked` has the wrong shape
        let output = json!({ "result_json": "{\"ranked\": [42]}" });
        let err = decode_final_result(Some(&output)).unwrap_err();
        match err {
            ResultDecodeError::Contract { raw, .. } => assert_eq!(raw, json!({ "ranked": [42] })),
            other => panic!("expected Contract, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_output_is_its_own_error() {
        let err = decode_final_result(None).unwrap_err();
        assert!(matches!(err, ResultDecodeError::MissingOutput));
        assert!(err.raw().is_none());
    }
}
