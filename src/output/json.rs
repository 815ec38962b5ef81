//! JSON output for variant listings and resolutions.

use crate::matrix::Variant;
use crate::resolve::Resolved;
use serde_json::{Value, json};

/// `[{"name": ..., "options": {...}}, ...]` in expansion order.
pub fn variants_json(variants: &[Variant]) -> Value {
    Value::Array(
        variants
            .iter()
            .map(|v| json!({ "name": v.identity(), "options": v }))
            .collect(),
    )
}

/// A single variant as `{"name", "options"}`, or the full listing when no
/// orchestrator is present.
pub fn resolved_json(resolved: &Resolved) -> Value {
    match resolved {
        Resolved::Single(options) => json!({ "name": options.name, "options": options.values_map() }),
        Resolved::All(variants) => variants_json(variants),
    }
}

pub fn print_json(value: &Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", json);
}
