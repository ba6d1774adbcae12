use std::io::Write;

use anyhow::Result;

use super::{render_table_page, Cell, Column, Row};
use crate::models::ComputerInfo;

const HEADERS: [&str; 6] = [
    "Device Name",
    "Part Number",
    "Port #",
    "Adapter/Network",
    "MAC Address",
    "IP Address",
];

/// Flatten hosts into one row per ethernet port; a host without ports still
/// gets a single row with empty port columns.
fn port_rows(hosts: &[ComputerInfo]) -> Vec<[String; 6]> {
    let mut rows = Vec::new();
    for host in hosts {
        if host.ethernet_ports.is_empty() {
            rows.push([
                host.device_name.clone(),
                host.arena_part_number.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
            continue;
        }
        for (idx, port) in host.ethernet_ports.iter().enumerate() {
            rows.push([
                host.device_name.clone(),
                host.arena_part_number.clone(),
                (idx + 1).to_string(),
                port.adapter.clone(),
                port.mac.clone(),
                port.ip.clone(),
            ]);
        }
    }
    rows
}

pub fn write_computer_info_csv<W: Write>(hosts: &[ComputerInfo], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for row in port_rows(hosts) {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_computer_info_json<W: Write>(hosts: &[ComputerInfo], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, hosts)?;
    writer.flush()?;
    Ok(())
}

pub fn render_computer_info_html(hosts: &[ComputerInfo]) -> Result<String> {
    let columns: Vec<Column> = HEADERS.iter().map(|h| Column::new(h)).collect();
    let rows: Vec<Row> = port_rows(hosts)
        .into_iter()
        .map(|[name, part, port, adapter, mac, ip]| {
            Row::new(vec![
                Cell::with_class(name, "name"),
                Cell::new(part),
                Cell::with_class(port, "metric"),
                Cell::new(adapter),
                Cell::with_class(mac, "mono"),
                Cell::with_class(ip, "mono"),
            ])
        })
        .collect();

    render_table_page("Computer Info", &columns, &rows)
}
