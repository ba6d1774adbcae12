//! One undirected wiring diagram per layer, devices grouped by rack and by
//! external group.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::*;
use crate::utils::{device_color, escape_dot, layer_file_stem};

const FONT_FACE: &str = "Sinkin Sans 400 Regular";
const RACK_CLUSTER_COLOR: &str = "#F5F5F5";
const EXTERNAL_CLUSTER_COLOR: &str = "#E0E0E0";
const HUB_PENWIDTH: f64 = 2.5;

#[derive(Debug, Clone, Default)]
pub struct WiringDiagram {
    pub file_name: String,
    pub dot: String,
    pub warnings: Vec<String>,
}

/// `<layer name lower-cased>.dot`, spaces and slashes replaced by `_`
pub fn wiring_file_name(layer_name: &str) -> String {
    format!("{}.dot", layer_file_stem(layer_name))
}

/// Render a layer's expanded connections. Connections naming a device that
/// is not registered produce a warning and no edge.
pub fn generate_wiring_diagram(
    layer: &WiringLayer,
    connections: &[Connection],
    devices: &DeviceMap,
    racks: &[Rack],
    type_colors: &BTreeMap<String, String>,
) -> WiringDiagram {
    let mut warnings = Vec::new();
    let mut drawn: Vec<&Connection> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for conn in connections {
        let mut registered = true;
        for name in [&conn.from, &conn.to] {
            if !devices.contains_key(name) {
                let msg = format!(
                    "Device '{}' not found in device map (used in {})",
                    name, layer.name
                );
                tracing::warn!("{}", msg);
                warnings.push(msg);
                registered = false;
            }
        }
        if registered {
            *counts.entry(conn.from.as_str()).or_insert(0) += 1;
            *counts.entry(conn.to.as_str()).or_insert(0) += 1;
            drawn.push(conn);
        }
    }

    // rack id -> devices, external group -> devices
    let mut by_rack: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut by_group: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for name in counts.keys() {
        let Some(record) = devices.get(*name) else {
            continue;
        };
        match &record.placement {
            Placement::RackMounted { rack_id, .. } => {
                by_rack.entry(rack_id.as_str()).or_default().insert(*name);
            }
            Placement::External { group, .. } => {
                by_group.entry(group.as_str()).or_default().insert(*name);
            }
        }
    }

    let mut lines = header(layer);
    lines.push("  // Devices grouped by rack and external groups".into());
    lines.push(String::new());

    let mut rack_ids: Vec<&str> = by_rack.keys().copied().collect();
    rack_ids.sort_by_key(|id| {
        racks
            .iter()
            .find(|r| r.id == *id)
            .map(|r| r.position)
            .unwrap_or(u32::MAX)
    });

    let node_ctx = NodeContext {
        devices,
        counts: &counts,
        type_colors,
    };

    for rack_id in rack_ids {
        let label = racks
            .iter()
            .find(|r| r.id == rack_id)
            .map(|r| r.name.as_str())
            .unwrap_or(rack_id);
        lines.push(format!("  subgraph \"cluster_{}\" {{", escape_dot(rack_id)));
        lines.push(format!("    label=\"{}\";", escape_dot(label)));
        cluster_style(&mut lines, RACK_CLUSTER_COLOR);
        node_ctx.push_nodes(&mut lines, &by_rack[rack_id]);
        lines.push("  }".into());
        lines.push(String::new());
    }

    for (group, names) in &by_group {
        lines.push(format!("  subgraph \"cluster_external_{}\" {{", escape_dot(group)));
        lines.push(format!("    label=\"{}\";", escape_dot(group)));
        cluster_style(&mut lines, EXTERNAL_CLUSTER_COLOR);
        node_ctx.push_nodes(&mut lines, names);
        lines.push("  }".into());
        lines.push(String::new());
    }

    lines.push("  // Connections".into());
    for conn in drawn {
        lines.push(format!(
            "  \"{}\" -- \"{}\" [",
            escape_dot(&conn.from),
            escape_dot(&conn.to)
        ));
        lines.push(format!("    {}", edge_attributes(conn, layer.font_size).join(", ")));
        lines.push("  ];".into());
    }
    lines.push(String::new());
    lines.push("}".into());

    WiringDiagram {
        file_name: wiring_file_name(&layer.name),
        dot: lines.join("\n"),
        warnings,
    }
}

fn header(layer: &WiringLayer) -> Vec<String> {
    let name = escape_dot(&layer.name);
    vec![
        format!("graph \"{}\" {{", name),
        String::new(),
        "  graph [".into(),
        "    bgcolor=\"white\",".into(),
        format!("    label=\"{}\",", name),
        "    labelloc=t,".into(),
        format!("    fontsize={},", layer.font_size + 4),
        format!("    fontname=\"{}\",", FONT_FACE),
        "    overlap=false,".into(),
        "    sep=0.5".into(),
        "  ];".into(),
        String::new(),
        "  node [".into(),
        "    shape=box,".into(),
        "    style=\"rounded,filled\",".into(),
        format!("    fontsize={},", layer.font_size),
        format!("    fontname=\"{}\",", FONT_FACE),
        "    margin=0.2".into(),
        "  ];".into(),
        String::new(),
        "  edge [".into(),
        format!("    color=\"{}\",", escape_dot(&layer.edge_color)),
        format!("    style={},", layer.edge_style),
        format!("    penwidth={}", layer.edge_width),
        "  ];".into(),
        String::new(),
    ]
}

fn cluster_style(lines: &mut Vec<String>, color: &str) {
    lines.push("    style=filled;".into());
    lines.push(format!("    color=\"{}\";", color));
    lines.push(format!("    fontname=\"{}\";", FONT_FACE));
    lines.push(String::new());
}

struct NodeContext<'a> {
    devices: &'a DeviceMap,
    counts: &'a HashMap<&'a str, u32>,
    type_colors: &'a BTreeMap<String, String>,
}

impl NodeContext<'_> {
    /// Hubs first, then the rest, each sorted by name
    fn push_nodes(&self, lines: &mut Vec<String>, names: &BTreeSet<&str>) {
        let count = |name: &str| self.counts.get(name).copied().unwrap_or(0);
        let (hubs, leaves): (Vec<&str>, Vec<&str>) = names.iter().copied().partition(|n| count(*n) > 1);

        for name in hubs {
            lines.push(format!("    \"{}\" [", escape_dot(name)));
            lines.push(format!(
                "      label=\"{}\\n({} conn)\",",
                escape_dot(name),
                count(name)
            ));
            lines.push(format!("      fillcolor=\"{}\",", self.color(name)));
            lines.push(format!("      penwidth={}", HUB_PENWIDTH));
            lines.push("    ];".into());
        }
        for name in leaves {
            lines.push(format!("    \"{}\" [", escape_dot(name)));
            lines.push(format!("      label=\"{}\",", escape_dot(name)));
            lines.push(format!("      fillcolor=\"{}\"", self.color(name)));
            lines.push("    ];".into());
        }
    }

    fn color(&self, name: &str) -> String {
        let record = self.devices.get(name);
        let color = device_color(
            record.and_then(|r| r.color.as_deref()),
            record.and_then(|r| r.device_type.as_deref()),
            self.type_colors,
        );
        escape_dot(&color)
    }
}

fn edge_attributes(conn: &Connection, font_size: u32) -> Vec<String> {
    let mut attrs = vec![
        format!("color=\"{}\"", escape_dot(&conn.edge_color)),
        format!("style={}", conn.style),
        format!("penwidth={}", conn.width),
    ];

    let label = conn
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
        .or_else(|| conn.cable_type.as_deref().filter(|t| !t.is_empty()));
    if let Some(label) = label {
        attrs.push(format!("label=\"   {}\"", escape_dot(label)));
        attrs.push(format!("fontsize={}", font_size.saturating_sub(3)));
        attrs.push(format!("fontname=\"{}\"", FONT_FACE));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cable::tests::{device_map, external_device, rack_device, two_racks};
    use crate::clusters::expand_wiring_clusters;

    fn layer(yaml: &str) -> WiringLayer {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn fixture() -> (DeviceMap, Vec<Rack>) {
        let devices = device_map(vec![
            rack_device("Switch", "R1", Face::Front, Some(42), 1),
            rack_device("Server 1", "R1", Face::Front, Some(10), 2),
            rack_device("Server 2", "R2", Face::Rear, Some(20), 2),
            external_device("Laptop", "Desk", 5.0),
        ]);
        (devices, two_racks())
    }

    const NETWORK: &str = r##"
name: "Network A/B"
cable_type: Cat6
edge_color: "#0000FF"
connections:
  - from: Switch
    to: ["Server 1", "Server 2"]
  - from: Switch
    to: Laptop
    label: uplink
    style: dashed
    width: 3.5
"##;

    fn render(yaml: &str) -> WiringDiagram {
        let layer = layer(yaml);
        let connections = expand_wiring_clusters(&layer).unwrap();
        let (devices, racks) = fixture();
        generate_wiring_diagram(&layer, &connections, &devices, &racks, &BTreeMap::new())
    }

    #[test]
    fn test_wiring_file_name() {
        assert_eq!(wiring_file_name("Network A/B"), "network_a_b.dot");
        assert_eq!(wiring_file_name("Power"), "power.dot");
    }

    #[test]
    fn test_wiring_groups_devices() {
        let diagram = render(NETWORK);
        assert_eq!(diagram.file_name, "network_a_b.dot");
        assert!(diagram.dot.starts_with("graph \"Network A/B\" {"));
        assert!(diagram.dot.contains("subgraph \"cluster_R1\" {"));
        assert!(diagram.dot.contains("subgraph \"cluster_R2\" {"));
        assert!(diagram.dot.contains("subgraph \"cluster_external_Desk\" {"));
        assert!(diagram.warnings.is_empty());

        let r1 = diagram.dot.find("cluster_R1").unwrap();
        let r2 = diagram.dot.find("cluster_R2").unwrap();
        assert!(r1 < r2);
    }

    #[test]
    fn test_wiring_marks_hubs() {
        let diagram = render(NETWORK);
        assert!(diagram.dot.contains("label=\"Switch\\n(3 conn)\","));
        assert!(diagram.dot.contains("penwidth=2.5"));
        assert!(diagram.dot.contains("label=\"Server 1\","));
        assert!(!diagram.dot.contains("Server 1\\n("));
    }

    #[test]
    fn test_wiring_edge_attributes() {
        let diagram = render(NETWORK);
        assert!(diagram.dot.contains("\"Switch\" -- \"Server 1\" ["));
        assert!(diagram
            .dot
            .contains("color=\"#0000FF\", style=solid, penwidth=2, label=\"   Cat6\", fontsize=8"));
        assert!(diagram
            .dot
            .contains("color=\"#0000FF\", style=dashed, penwidth=3.5, label=\"   uplink\""));
    }

    #[test]
    fn test_wiring_warns_on_unregistered() {
        let diagram = render("name: Power\nconnections:\n  - { from: Switch, to: Ghost }\n");
        assert_eq!(
            diagram.warnings,
            vec!["Device 'Ghost' not found in device map (used in Power)"]
        );
        assert!(!diagram.dot.contains("Ghost"));
        assert!(!diagram.dot.contains("cluster_R1"));
    }

    #[test]
    fn test_wiring_keeps_similar_names_apart() {
        let layer = layer("name: Network\nconnections:\n  - { from: \"A B\", to: A_B }\n");
        let connections = expand_wiring_clusters(&layer).unwrap();
        let devices = device_map(vec![
            rack_device("A B", "R1", Face::Front, Some(10), 1),
            rack_device("A_B", "R1", Face::Front, Some(20), 1),
        ]);
        let diagram = generate_wiring_diagram(&layer, &connections, &devices, &two_racks(), &BTreeMap::new());

        assert!(diagram.dot.contains("\"A B\" -- \"A_B\" ["));
        assert!(diagram.dot.contains("    \"A B\" ["));
        assert!(diagram.dot.contains("    \"A_B\" ["));
    }
}
