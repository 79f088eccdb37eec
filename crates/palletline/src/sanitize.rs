//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Operator identifiers are personnel numbers. Spans only carry a count and
//! a short deterministic hash so logs can be correlated without listing people.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Summarizes an operator list as `"<count>#<hash>"`.
///
/// Order-sensitive: the same crew scanned in the same order hashes the same.
pub fn redact_operators(operators: &[String]) -> String {
    if operators.is_empty() {
        return "0".to_string();
    }
    let mut hasher = DefaultHasher::new();
    operators.hash(&mut hasher);
    format!("{}#{:08x}", operators.len(), hasher.finish() as u32)
}

/// Trims each operator id and drops blanks.
pub fn normalize_operators(operators: &[String]) -> Vec<String> {
    operators
        .iter()
        .map(|op| op.trim())
        .filter(|op| !op.is_empty())
        .map(str::to_string)
        .collect()
}
