//! Scoring Engine — weighted candidate scores and rationale strings from
//! criteria plus extracted evidence.
//!
//! Deterministic and total: identical inputs yield byte-identical rationale
//! and scores, and malformed evidence degrades to an empty set instead of
//! failing. Safe to re-invoke from a retried tool pause.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::screening::models::{Criteria, EvidencePayload, ScoredCandidate, ScoringResult};
use crate::screening::normalize::normalize_term;

/// Total experience is clamped here before normalizing to [0, 1].
const EXPERIENCE_CAP_YEARS: f64 = 8.0;

/// Scores every candidate in `evidence` against `criteria` and returns the
/// ranked list, the first `max(1, n)` names, and the decoded evidence.
///
/// Per candidate:
/// - coverage = fraction of (normalized, deduplicated) required terms with a
///   case-insensitive exact match among the candidate's normalized skills
/// - experience = Σ years, clamped to 8.0, divided by 8.0
/// - score = w_must·must + w_nice·nice + w_exp·experience, rounded to 4 places
pub fn compute_scores(criteria: &Criteria, evidence: &Value, n: i64) -> ScoringResult {
    let payload = EvidencePayload::decode(evidence);

    // Set semantics: aliases of the same canonical term count once.
    let must: BTreeSet<String> = criteria.must_haves.iter().map(|t| normalize_term(t)).collect();
    let nice: BTreeSet<String> = criteria
        .nice_to_haves
        .iter()
        .map(|t| normalize_term(t))
        .collect();
    let must_lower: Vec<String> = must.iter().map(|t| t.to_lowercase()).collect();
    let nice_lower: Vec<String> = nice.iter().map(|t| t.to_lowercase()).collect();
    let weights = &criteria.weights;

    let mut ranked = Vec::with_capacity(payload.evidence.len());
    for item in &payload.evidence {
        let skills: BTreeSet<String> = item
            .skills
            .iter()
            .map(|s| normalize_term(s).to_lowercase())
            .collect();
        let exp_years: f64 = item.experience.iter().map(|e| e.years).sum();

        let must_cov = must_lower.iter().filter(|t| skills.contains(*t)).count();
        let must_score = must_cov as f64 / must.len().max(1) as f64;
        let nice_cov = nice_lower.iter().filter(|t| skills.contains(*t)).count();
        let nice_score = nice_cov as f64 / nice.len().max(1) as f64;
        let exp_score = exp_years.min(EXPERIENCE_CAP_YEARS) / EXPERIENCE_CAP_YEARS;

        let score = weights.must_haves * must_score
            + weights.nice_to_haves * nice_score
            + weights.experience * exp_score;

        ranked.push(ScoredCandidate {
            name: item.name.clone(),
            score: round4(score),
            rationale: build_rationale(must_cov, must.len(), nice_cov, nice.len(), exp_years),
        });
    }

    // sort_by is stable: equal scores keep the original evidence order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let top_n = n.max(1) as usize;
    let top_n_names = ranked.iter().take(top_n).map(|c| c.name.clone()).collect();

    ScoringResult {
        ranked,
        top_n_names,
        evidence: payload.evidence,
    }
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Semicolon-joined summary. Coverage segments are omitted when their category
/// is empty; the experience segment is always present (years as an integer).
fn build_rationale(
    must_cov: usize,
    must_total: usize,
    nice_cov: usize,
    nice_total: usize,
    exp_years: f64,
) -> String {
    let mut bits = Vec::new();
    if must_total > 0 {
        bits.push(format!("Must-haves: {must_cov}/{must_total}"));
    }
    if nice_total > 0 {
        bits.push(format!("Nice: {nice_cov}/{nice_total}"));
    }
    // `+ 0.0` normalizes IEEE negative zero (an empty `sum::<f64>()` yields
    // -0.0) so zero experience renders as "0y" rather than "-0y".
    bits.push(format!("Exp: {:.0}y", exp_years + 0.0));
    bits.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::models::ScoringWeights;
    use serde_json::json;

    fn criteria(must: &[&str], nice: &[&str]) -> Criteria {
        Criteria {
            role: "Senior Backend Engineer".to_string(),
            must_haves: must.iter().map(|s| s.to_string()).collect(),
            nice_to_haves: nice.iter().map(|s| s.to_string()).collect(),
            weights: ScoringWeights::default(),
            disqualifiers: vec![],
        }
    }

    fn evidence_of(items: Value) -> Value {
        json!({ "evidence": items })
    }

    #[test]
    fn test_reference_scenario_scores_0_925() {
        // must 2/2, nice 1/1, 5y → 0.6 + 0.2 + 0.2·(5/8) = 0.925
        let c = criteria(&["Python", "PostgreSQL"], &["AWS"]);
        let evidence = evidence_of(json!([{
            "name": "Alice",
            "skills": ["Python", "PostgreSQL", "AWS"],
            "experience": [{ "role": "backend", "years": 5 }]
        }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].score, 0.925);
        assert_eq!(result.ranked[0].rationale, "Must-haves: 2/2; Nice: 1/1; Exp: 5y");
    }

    #[test]
    fn test_experience_clamps_at_eight_years() {
        let c = criteria(&[], &[]);
        let evidence = evidence_of(json!([{
            "name": "Veteran",
            "skills": [],
            "experience": [{ "role": "a", "years": 6 }, { "role": "b", "years": 4 }]
        }]));

        // only the experience term contributes: 0.2 · 1.0
        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].score, 0.2);
        assert_eq!(result.ranked[0].rationale, "Exp: 10y");
    }

    #[test]
    fn test_empty_requirement_lists_never_divide_by_zero() {
        let c = criteria(&[], &[]);
        let evidence = evidence_of(json!([{ "name": "Nobody", "skills": ["Rust"] }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].score, 0.0);
        assert_eq!(result.ranked[0].rationale, "Exp: 0y");
    }

    #[test]
    fn test_terms_match_through_normalization() {
        // criteria says "postgres", candidate says "PostgreSQL"; "k8s" ↔ "Kubernetes"
        let c = criteria(&["postgres"], &["Kubernetes"]);
        let evidence = evidence_of(json!([{
            "name": "Alice",
            "skills": ["PostgreSQL", "k8s"]
        }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].rationale, "Must-haves: 1/1; Nice: 1/1; Exp: 0y");
    }

    #[test]
    fn test_alias_duplicates_collapse_in_denominator() {
        // "postgres" and "PostgreSQL" normalize to the same required term
        let c = criteria(&["postgres", "PostgreSQL"], &[]);
        let evidence = evidence_of(json!([{ "name": "Alice", "skills": ["postgres"] }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].rationale, "Must-haves: 1/1; Exp: 0y");
    }

    #[test]
    fn test_ranked_is_sorted_descending_with_stable_ties() {
        let c = criteria(&["Python"], &[]);
        let evidence = evidence_of(json!([
            { "name": "First",  "skills": [] },
            { "name": "Second", "skills": [] },
            { "name": "Winner", "skills": ["Python"] }
        ]));

        let result = compute_scores(&c, &evidence, 2);
        let names: Vec<&str> = result.ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Winner", "First", "Second"]);
        assert_eq!(result.top_n_names, vec!["Winner", "First"]);
    }

    #[test]
    fn test_top_n_is_coerced_to_at_least_one() {
        let c = criteria(&[], &[]);
        let evidence = evidence_of(json!([
            { "name": "A" },
            { "name": "B" }
        ]));

        assert_eq!(compute_scores(&c, &evidence, 0).top_n_names.len(), 1);
        assert_eq!(compute_scores(&c, &evidence, -3).top_n_names.len(), 1);
        // capped by the ranked list length
        assert_eq!(compute_scores(&c, &evidence, 10).top_n_names.len(), 2);
    }

    #[test]
    fn test_malformed_evidence_yields_empty_result_not_error() {
        let c = criteria(&["Python"], &[]);
        let result = compute_scores(&c, &json!("{not json"), 3);
        assert!(result.ranked.is_empty());
        assert!(result.top_n_names.is_empty());
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn test_numeric_string_years_are_counted() {
        let c = criteria(&[], &[]);
        let evidence = evidence_of(json!([{
            "name": "Alice",
            "experience": [{ "role": "dev", "years": "4" }, { "role": "dev", "years": "junk" }]
        }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].rationale, "Exp: 4y");
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let c = criteria(&["Python", "PostgreSQL"], &["AWS", "gRPC"]);
        let evidence = evidence_of(json!([
            { "name": "Alice", "skills": ["Python", "AWS"], "experience": [{ "role": "x", "years": 3.7 }] },
            { "name": "Bob",   "skills": ["postgres"],      "experience": [{ "role": "y", "years": 1 }] }
        ]));

        let a = compute_scores(&c, &evidence, 2);
        let b = compute_scores(&c, &evidence, 2);
        assert_eq!(a.ranked, b.ranked);
        assert_eq!(a.top_n_names, b.top_n_names);
    }

    #[test]
    fn test_scores_are_rounded_to_four_decimals() {
        // 1/3 must coverage · 0.6 = 0.2 exactly after rounding
        let c = criteria(&["Python", "Go", "Rust"], &[]);
        let evidence = evidence_of(json!([{ "name": "Alice", "skills": ["Python"] }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.ranked[0].score, 0.2);
    }

    #[test]
    fn test_evidence_is_passed_through() {
        let c = criteria(&[], &[]);
        let evidence = evidence_of(json!([{ "name": "Alice", "education": ["BSc"] }]));

        let result = compute_scores(&c, &evidence, 1);
        assert_eq!(result.evidence.len(), 1);
        assert_eq!(result.evidence[0].education, vec!["BSc"]);
    }
}
