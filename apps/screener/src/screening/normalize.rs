//! Term Normalizer — canonicalizes skill/technology tokens via a fixed
//! synonym table so criteria and evidence compare on equal footing.

/// Returns the canonical spelling for a known alias (matched case-insensitively
/// after trimming), or the input unchanged. Total: empty input returns itself.
pub fn normalize_term(term: &str) -> String {
    match term.trim().to_lowercase().as_str() {
        "postgres" | "postgresql" | "postgre" => "PostgreSQL".to_string(),
        "k8s" => "Kubernetes".to_string(),
        "js" => "JavaScript".to_string(),
        "ts" => "TypeScript".to_string(),
        "node" => "Node.js".to_string(),
        _ => term.to_string(),
    }
}
