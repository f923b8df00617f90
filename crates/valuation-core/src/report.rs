//! Plain-text comparison report

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{CellAlignment, Table};

use crate::compare::Comparison;

/// Placeholder for absent values
pub const MISSING: &str = "—";

/// Format a number with thousands separators and two decimals
pub fn fmt_number(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };

    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.00 renders as 0.00
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Render the metric table
pub fn render_table(comparison: &Comparison) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_header(vec!["Metric", "Company", "Industry", ""]);

    for row in &comparison.rows {
        table.add_row(vec![
            row.metric.label().to_string(),
            fmt_number(row.company),
            fmt_number(row.industry),
            row.classification.hint().to_string(),
        ]);
    }

    for index in [1, 2] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table.to_string()
}

/// Render the full message sent back to the user
pub fn render_report(comparison: &Comparison) -> String {
    let lines = [
        format!("Ticker: {}", comparison.ticker),
        format!(
            "Industry: {}",
            comparison.industry.as_deref().unwrap_or("N/A")
        ),
        String::new(),
        render_table(comparison),
        String::new(),
        format!("Last price:  {} USD", fmt_number(comparison.price)),
        format!("1-yr target: {} USD", fmt_number(comparison.target)),
    ];
    lines.join("\n")
}
