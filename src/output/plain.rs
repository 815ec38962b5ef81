//! Plain text output (no colors), meant for scripts.

use crate::matrix::Variant;
use crate::payload::NAME_FIELD;
use crate::resolve::Resolved;
use std::fmt::Write;

/// One line per variant: the name, then tab-separated `axis=value` pairs.
pub fn format_variants(variants: &[Variant]) -> String {
    let mut out = String::new();
    for variant in variants {
        out.push_str(&variant.identity());
        for (axis, value) in variant.iter() {
            let _ = write!(out, "\t{}={}", axis, value);
        }
        out.push('\n');
    }
    out
}

/// `key=value` lines for a single variant, led by its name under the
/// reserved `__name` key. Without an orchestrator, the full listing.
pub fn format_resolved(resolved: &Resolved) -> String {
    match resolved {
        Resolved::Single(options) => {
            let mut out = format!("{}={}\n", NAME_FIELD, options.name);
            for (axis, value) in &options.values {
                let _ = writeln!(out, "{}={}", axis, value);
            }
            out
        }
        Resolved::All(variants) => format_variants(variants),
    }
}
