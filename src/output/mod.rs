//! Output formatting for `list` and `show`.

pub mod json;
pub mod plain;
pub mod table;

use crate::matrix::Variant;
use crate::resolve::Resolved;
use crate::settings::AxisSet;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored table output (default).
    #[default]
    Table,
    /// JSON output.
    Json,
    /// Plain text output (no colors).
    Plain,
}

/// Table display options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    /// Use ASCII borders instead of Unicode.
    pub ascii: bool,
}

/// Format and print the variants an axis set expands to.
pub fn print_variants(
    axes: &AxisSet,
    variants: &[Variant],
    format: OutputFormat,
    options: TableOptions,
) {
    match format {
        OutputFormat::Table => println!("{}", table::format_table(axes, variants, options)),
        OutputFormat::Json => json::print_json(&json::variants_json(variants)),
        OutputFormat::Plain => print!("{}", plain::format_variants(variants)),
    }
}

/// Format and print what a build would see in the current environment.
///
/// There is no table rendering for a single variant; `Table` falls back to plain.
pub fn print_resolved(resolved: &Resolved, format: OutputFormat) {
    match format {
        OutputFormat::Json => json::print_json(&json::resolved_json(resolved)),
        OutputFormat::Table | OutputFormat::Plain => print!("{}", plain::format_resolved(resolved)),
    }
}
