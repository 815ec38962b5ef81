//! Colored table output for variant listings.

use crate::matrix::Variant;
use crate::output::TableOptions;
use crate::settings::AxisSet;
use crate::theme::{Semantic, ThemedCell};
use comfy_table::{
    Cell, ContentArrangement, Table,
    presets::{ASCII_FULL, UTF8_FULL},
};

/// Render variants as a table with one column per axis.
pub fn format_table(axes: &AxisSet, variants: &[Variant], options: TableOptions) -> String {
    if variants.is_empty() {
        return "No variants.".to_string();
    }

    let mut table = Table::new();

    if options.ascii {
        table.load_preset(ASCII_FULL);
    } else {
        table.load_preset(UTF8_FULL);
    }

    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec!["#".to_string(), "Variant".to_string()];
    headers.extend(axes.iter().map(|a| a.name.clone()));
    table.set_header(headers);

    for (i, variant) in variants.iter().enumerate() {
        let mut row = vec![
            Cell::new(i + 1).themed(Semantic::Muted),
            Cell::new(variant.identity()).themed(Semantic::VariantName),
        ];
        row.extend(
            variant
                .iter()
                .map(|(_, value)| Cell::new(value.as_string()).themed(Semantic::Value)),
        );
        table.add_row(row);
    }

    table.to_string()
}
