use std::io::Write;

use anyhow::Result;

use super::{render_table_page, Cell, Column, Row};
use crate::models::*;
use crate::utils::format_meters;

const HEADERS: [&str; 5] = ["Cable Type", "Color", "Length (m)", "Quantity", "Subtotal (m)"];

/// Bill of materials: one row per (type, color, length), then the grand total
pub fn write_cable_order_csv<W: Write>(order: &CableOrder, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;

    for group in &order.groups {
        for line in &group.lines {
            wtr.write_record([
                group.cable_type.as_str(),
                group.color.as_str(),
                &format_meters(line.length, 1),
                &line.quantity.to_string(),
                &format_meters(line.subtotal, 1),
            ])?;
        }
    }
    wtr.write_record([
        "TOTAL",
        "",
        "",
        &order.total_quantity.to_string(),
        &format_meters(order.total_length, 1),
    ])?;

    wtr.flush()?;
    Ok(())
}

pub fn render_cable_order_html(order: &CableOrder) -> Result<String> {
    let columns = [
        Column::new(HEADERS[0]),
        Column::new(HEADERS[1]),
        Column::metric(HEADERS[2]),
        Column::metric(HEADERS[3]),
        Column::metric(HEADERS[4]),
    ];

    let mut rows = Vec::new();
    for group in &order.groups {
        for line in &group.lines {
            rows.push(Row::new(vec![
                Cell::with_class(group.cable_type.as_str(), "name"),
                Cell::new(group.color.as_str()),
                Cell::with_class(format_meters(line.length, 1), "metric"),
                Cell::with_class(line.quantity.to_string(), "metric"),
                Cell::with_class(format_meters(line.subtotal, 1), "metric"),
            ]));
        }
        rows.push(Row::with_class(
            vec![
                Cell::new(format!("{} subtotal", group.cable_type)),
                Cell::new(group.color.as_str()),
                Cell::new(""),
                Cell::with_class(group.quantity.to_string(), "metric"),
                Cell::with_class(format_meters(group.length, 1), "metric"),
            ],
            "subtotal",
        ));
    }
    rows.push(Row::with_class(
        vec![
            Cell::new("TOTAL"),
            Cell::new(""),
            Cell::new(""),
            Cell::with_class(order.total_quantity.to_string(), "metric"),
            Cell::with_class(format_meters(order.total_length, 1), "metric"),
        ],
        "total",
    ));

    render_table_page("Cable Order", &columns, &rows)
}
