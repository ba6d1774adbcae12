use std::io::Write;

use anyhow::Result;

use super::{render_table_page, Cell, Column, Row};
use crate::models::*;
use crate::utils::format_meters;

const HEADERS: [&str; 13] = [
    "Layer",
    "From",
    "To",
    "Cable Type",
    "From Rack",
    "To Rack",
    "U Distance",
    "U Length (m)",
    "Front-to-Back (m)",
    "Inter-rack (m)",
    "External (m)",
    "Slack (m)",
    "Total (m)",
];

/// Index of the first numeric column
const FIRST_METRIC: usize = 6;

fn row_values(run: &CableRun) -> [String; 13] {
    let b = &run.breakdown;
    [
        run.layer.clone(),
        run.connection.from.clone(),
        run.connection.to.clone(),
        run.connection.cable_type.clone().unwrap_or_default(),
        b.from_rack.clone(),
        b.to_rack.clone(),
        b.unit_distance.to_string(),
        format_meters(b.unit_length, 3),
        format_meters(b.front_to_back_length, 3),
        format_meters(b.inter_rack_length, 1),
        format_meters(b.external_length, 1),
        format_meters(b.slack_length, 3),
        format_meters(b.total_length, 2),
    ]
}

/// One CSV row per estimated connection
pub fn write_cable_lengths_csv<W: Write>(runs: &[CableRun], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for run in runs {
        wtr.write_record(row_values(run))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn render_cable_lengths_html(runs: &[CableRun]) -> Result<String> {
    let columns: Vec<Column> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| if i >= FIRST_METRIC { Column::metric(h) } else { Column::new(h) })
        .collect();

    let rows: Vec<Row> = runs
        .iter()
        .map(|run| {
            let cells = row_values(run)
                .into_iter()
                .enumerate()
                .map(|(i, text)| match i {
                    0 => Cell::with_class(text, "name"),
                    12 => Cell::with_class(text, "metric total"),
                    i if i >= FIRST_METRIC => Cell::with_class(text, "metric"),
                    _ => Cell::new(text),
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    render_table_page("Cable Length Calculations", &columns, &rows)
}
