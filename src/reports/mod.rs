//! CSV, HTML and JSON exports of the computed records.
//!
//! Every HTML report is the same tera page: a title and one table. The
//! individual reports only decide the columns and rows.

pub mod cable_lengths;
pub mod cable_order;
pub mod computer_info;
pub mod inventory;

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

pub use cable_lengths::{render_cable_lengths_html, write_cable_lengths_csv};
pub use cable_order::{render_cable_order_html, write_cable_order_csv};
pub use computer_info::{render_computer_info_html, write_computer_info_csv, write_computer_info_json};
pub use inventory::write_devices_csv;

pub const CABLE_LENGTHS_CSV: &str = "cable_lengths.csv";
pub const CABLE_LENGTHS_HTML: &str = "cable_lengths.html";
pub const CABLE_ORDER_CSV: &str = "cable_order.csv";
pub const CABLE_ORDER_HTML: &str = "cable_order.html";
pub const DEVICES_CSV: &str = "devices.csv";
pub const COMPUTER_INFO_CSV: &str = "computer_info.csv";
pub const COMPUTER_INFO_HTML: &str = "computer_info.html";
pub const COMPUTER_INFO_JSON: &str = "computer_info.json";

// The `.html` template name turns on tera's autoescaping
const PAGE_TEMPLATE_NAME: &str = "report.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
    <style>
        body { font-family: 'Sinkin Sans', Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
        h1 { color: #333; }
        table { border-collapse: collapse; width: 100%; background-color: white; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        th { background-color: #5af282; color: white; padding: 12px; text-align: left; font-weight: bold; border-bottom: 2px solid #333; }
        td { padding: 10px 12px; border-bottom: 1px solid #ddd; }
        tr:hover { background-color: #f9f9f9; }
        .name { font-weight: bold; color: #333; }
        .metric { text-align: right; font-family: monospace; }
        .mono { font-family: monospace; font-size: 0.9em; }
        .total { background-color: #4297a1; font-weight: bold; }
        .subtotal { background-color: #eef6f7; font-weight: bold; }
    </style>
</head>
<body>
    <h1>{{ title }}</h1>
    <table>
        <thead>
            <tr>
{%- for column in columns %}
                <th{% if column.class %} class="{{ column.class }}"{% endif %}>{{ column.label }}</th>
{%- endfor %}
            </tr>
        </thead>
        <tbody>
{%- for row in rows %}
            <tr{% if row.class %} class="{{ row.class }}"{% endif %}>
{%- for cell in row.cells %}
                <td{% if cell.class %} class="{{ cell.class }}"{% endif %}>{{ cell.text }}</td>
{%- endfor %}
            </tr>
{%- endfor %}
        </tbody>
    </table>
</body>
</html>
"#;

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub label: String,
    pub class: String,
}

impl Column {
    pub fn new(label: &str) -> Self {
        Self { label: label.to_string(), class: String::new() }
    }

    pub fn metric(label: &str) -> Self {
        Self { label: label.to_string(), class: "metric".to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub text: String,
    pub class: String,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), class: String::new() }
    }

    pub fn with_class(text: impl Into<String>, class: &str) -> Self {
        Self { text: text.into(), class: class.to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub class: String,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, class: String::new() }
    }

    pub fn with_class(cells: Vec<Cell>, class: &str) -> Self {
        Self { cells, class: class.to_string() }
    }
}

/// Render one titled table as a standalone HTML page
pub fn render_table_page(title: &str, columns: &[Column], rows: &[Row]) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Invalid report template: {}", e))?;

    let mut context = Context::new();
    context.insert("title", title);
    context.insert("columns", columns);
    context.insert("rows", rows);

    tera.render(PAGE_TEMPLATE_NAME, &context)
        .map_err(|e| anyhow::anyhow!("Report rendering failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_page_escapes_cells() {
        let html = render_table_page(
            "Test <Report>",
            &[Column::new("Name"), Column::metric("Length (m)")],
            &[Row::new(vec![Cell::new("A&B"), Cell::with_class("1.50", "metric")])],
        )
        .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Test &lt;Report&gt;</h1>"));
        assert!(html.contains("<th class=\"metric\">Length (m)</th>"));
        assert!(html.contains("<th>Name</th>"));
        assert!(html.contains("<td>A&amp;B</td>"));
        assert!(html.contains("<td class=\"metric\">1.50</td>"));
    }

    #[test]
    fn test_render_table_page_row_class() {
        let html = render_table_page(
            "Totals",
            &[Column::new("Label")],
            &[Row::with_class(vec![Cell::new("TOTAL")], "total")],
        )
        .unwrap();
        assert!(html.contains("<tr class=\"total\">"));
    }
}
