use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cable::{aggregate_cable_order, estimate_runs};
use crate::clusters::{expand_computer_info, expand_wiring_clusters};
use crate::layout::{generate_rack_layout_dot, RACK_LAYOUT_FILE};
use crate::models::*;
use crate::registry::{build_device_map, build_racks, external_count, ConfigError};
use crate::reports;
use crate::wiring::generate_wiring_diagram;

/// What one generation run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateSummary {
    /// Written file paths, in write order
    pub generated: Vec<String>,
    pub warnings: Vec<String>,
    pub device_count: usize,
    pub external_count: usize,
    pub connection_count: usize,
    pub host_count: usize,
}

/// Parse a system description. A document without `racks` is rejected.
pub fn parse_system(yaml: &str) -> Result<SystemConfig> {
    let system: SystemConfig =
        serde_yaml::from_str(yaml).context("Failed to parse system description")?;
    if system.racks.is_none() {
        return Err(ConfigError::MissingRacks.into());
    }
    Ok(system)
}

/// Read and parse the system description at `path`
pub fn load_system(path: &Path) -> Result<SystemConfig> {
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_system(&yaml).with_context(|| format!("Invalid system description {}", path.display()))
}

/// Generate every diagram and report for `system` into `output_dir`
pub fn run(system: &SystemConfig, output_dir: &Path) -> Result<GenerateSummary> {
    let rack_configs = system.racks.as_deref().ok_or(ConfigError::MissingRacks)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let racks = build_racks(rack_configs)?;
    let devices = build_device_map(rack_configs, &system.external_devices)?;

    let mut summary = GenerateSummary {
        device_count: devices.len(),
        external_count: external_count(&devices),
        ..Default::default()
    };
    tracing::info!(
        "Device map built with {} devices ({} external)",
        summary.device_count,
        summary.external_count
    );

    let layout = generate_rack_layout_dot(rack_configs, &racks, &system.type_colors)?;
    summary.warnings.extend(layout.warnings);
    write_text(output_dir, RACK_LAYOUT_FILE, &layout.dot, &mut summary)?;

    let mut layers: Vec<(String, Vec<Connection>)> = Vec::with_capacity(system.wiring_layers.len());
    for layer in &system.wiring_layers {
        let connections = expand_wiring_clusters(layer)?;
        let diagram =
            generate_wiring_diagram(layer, &connections, &devices, &racks, &system.type_colors);
        summary.warnings.extend(diagram.warnings);
        write_text(output_dir, &diagram.file_name, &diagram.dot, &mut summary)?;
        summary.connection_count += connections.len();
        layers.push((layer.name.clone(), connections));
    }

    let (runs, estimate_warnings) = estimate_runs(&layers, &devices, &racks, &system.cable);
    summary.warnings.extend(estimate_warnings);

    write_with(output_dir, reports::CABLE_LENGTHS_CSV, &mut summary, |w| {
        reports::write_cable_lengths_csv(&runs, w)
    })?;
    let html = reports::render_cable_lengths_html(&runs)?;
    write_text(output_dir, reports::CABLE_LENGTHS_HTML, &html, &mut summary)?;

    let order = aggregate_cable_order(&runs);
    write_with(output_dir, reports::CABLE_ORDER_CSV, &mut summary, |w| {
        reports::write_cable_order_csv(&order, w)
    })?;
    let html = reports::render_cable_order_html(&order)?;
    write_text(output_dir, reports::CABLE_ORDER_HTML, &html, &mut summary)?;

    write_with(output_dir, reports::DEVICES_CSV, &mut summary, |w| {
        reports::write_devices_csv(&devices, &racks, w)
    })?;

    if !system.computer_info.is_empty() {
        let hosts = expand_computer_info(&system.computer_info)?;
        tracing::info!(
            "Expanded computer_info from {} entries to {} devices",
            system.computer_info.len(),
            hosts.len()
        );
        summary.host_count = hosts.len();
        write_with(output_dir, reports::COMPUTER_INFO_CSV, &mut summary, |w| {
            reports::write_computer_info_csv(&hosts, w)
        })?;
        write_with(output_dir, reports::COMPUTER_INFO_JSON, &mut summary, |w| {
            reports::write_computer_info_json(&hosts, w)
        })?;
        let html = reports::render_computer_info_html(&hosts)?;
        write_text(output_dir, reports::COMPUTER_INFO_HTML, &html, &mut summary)?;
    }

    dedup_in_order(&mut summary.warnings);
    Ok(summary)
}

fn write_text(dir: &Path, name: &str, contents: &str, summary: &mut GenerateSummary) -> Result<()> {
    write_with(dir, name, summary, |mut w| {
        w.write_all(contents.as_bytes())?;
        w.flush()?;
        Ok(())
    })
}

fn write_with<F>(dir: &Path, name: &str, summary: &mut GenerateSummary, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Generated {}", path.display());
    summary.generated.push(path.display().to_string());
    Ok(())
}

/// The diagram writer and the estimator both report a missing device
fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_YAML: &str = r##"
cable_slack_length: 0.2
racks:
  - rack: { id: r1, name: "Rack 1", total_u: 42 }
    front:
      - { name: "Switch", start_u: 40, units: 1, type: switch }
      - { name: "Server {N}", start: 1, end: 2, start_u: 30, units: 2 }
  - rack: { id: r2, name: "Rack 2", total_u: 42 }
    rear:
      - { name: "PDU", start_u: 42, units: 2 }
external_devices:
  - name: Desk
    distance_from_racks: 10
    devices:
      - { name: "Laptop" }
wiring_layers:
  - name: "Network"
    cable_type: Cat6
    connections:
      - { from: Switch, to: "Server {N}", start: 1, end: 2, color: "#0000FF" }
      - { from: Switch, to: Laptop }
      - { from: Switch, to: Ghost }
  - name: "Power A/B"
    cable_type: C13
    connections:
      - { from: PDU, to: Switch }
computer_info:
  - device_name: "Server {N}"
    start: 1
    end: 2
    ethernet_ports:
      - { adapter: eno1, mac: "aa:bb:cc:00:00:0{N}", ip: "10.0.0.{N}" }
type_colors:
  switch: "#5af282"
"##;

    #[test]
    fn test_parse_system_requires_racks() {
        let err = parse_system("wiring_layers: []\n").unwrap_err();
        assert!(err.to_string().contains("'racks'"));
    }

    #[test]
    fn test_parse_system_reports_yaml_errors() {
        let err = parse_system("racks: [\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse system description"));
    }

    #[test]
    fn test_run_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let system = parse_system(SAMPLE_YAML).unwrap();

        let summary = run(&system, &out).unwrap();

        for name in [
            "rack_layout.dot",
            "network.dot",
            "power_a_b.dot",
            "cable_lengths.csv",
            "cable_lengths.html",
            "cable_order.csv",
            "cable_order.html",
            "devices.csv",
            "computer_info.csv",
            "computer_info.json",
            "computer_info.html",
        ] {
            assert!(out.join(name).is_file(), "missing {}", name);
        }
        assert_eq!(summary.generated.len(), 11);
        assert_eq!(summary.device_count, 5);
        assert_eq!(summary.external_count, 1);
        assert_eq!(summary.connection_count, 5);
        assert_eq!(summary.host_count, 2);
        assert_eq!(
            summary.warnings,
            vec!["Device 'Ghost' not found in device map (used in Network)"]
        );
    }

    #[test]
    fn test_run_cable_lengths_rows() {
        let dir = tempfile::tempdir().unwrap();
        let system = parse_system(SAMPLE_YAML).unwrap();
        run(&system, dir.path()).unwrap();

        let csv = fs::read_to_string(dir.path().join("cable_lengths.csv")).unwrap();
        // header plus four estimated connections; Ghost is skipped
        assert_eq!(csv.lines().count(), 5);
        assert!(csv.contains("Network,Switch,Server 1,Cat6,Rack 1,Rack 1,"));
        assert!(csv.contains("Power A/B,PDU,Switch,C13,Rack 2,Rack 1,"));
    }

    #[test]
    fn test_run_without_computer_info() {
        let dir = tempfile::tempdir().unwrap();
        let system = parse_system(
            "racks:\n  - rack: { id: r1, total_u: 10 }\n    front:\n      - { name: A, start_u: 10 }\n",
        )
        .unwrap();
        let summary = run(&system, dir.path()).unwrap();

        assert!(!dir.path().join("computer_info.csv").exists());
        assert_eq!(summary.generated.len(), 6);
        assert_eq!(summary.connection_count, 0);
    }

    #[test]
    fn test_run_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let system = parse_system(
            "racks:\n  - rack: { id: r1, total_u: 10 }\n    front:\n      - { name: A, start_u: 10 }\n    rear:\n      - { name: A, start_u: 5 }\n",
        )
        .unwrap();
        let err = run(&system, dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate device name 'A'"));
    }

    #[test]
    fn test_load_system_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_system(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
