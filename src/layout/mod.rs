//! Rack elevation diagram: every rack face as a Graphviz HTML table, laid
//! out left to right in rack-row order.

pub mod occupancy;

use std::collections::BTreeMap;

use crate::clusters::expand_rack_devices;
use crate::models::*;
use crate::registry::ConfigError;
use crate::utils::{device_color, escape_html};

pub use occupancy::build_occupancy;

const FONT_FACE: &str = "Sinkin Sans 400 Regular";
const TITLE_COLOR: &str = "#5af282";
const MAX_DEVICE_FONT: f64 = 20.0;

/// Output file name of the elevation diagram
pub const RACK_LAYOUT_FILE: &str = "rack_layout.dot";

/// Generated elevation source plus the placement warnings it produced
#[derive(Debug, Clone, Default)]
pub struct RackLayout {
    pub dot: String,
    pub warnings: Vec<String>,
}

/// Render all racks as one `digraph rack_layout`. `racks` are the resolved
/// rack records from the registry, in the same order as `rack_configs`.
pub fn generate_rack_layout_dot(
    rack_configs: &[RackConfig],
    racks: &[Rack],
    type_colors: &BTreeMap<String, String>,
) -> Result<RackLayout, ConfigError> {
    let mut ordered: Vec<(&RackConfig, u32)> = rack_configs
        .iter()
        .enumerate()
        .map(|(i, cfg)| {
            let position = racks
                .iter()
                .find(|r| r.id == cfg.rack.id)
                .map(|r| r.position)
                .unwrap_or(i as u32);
            (cfg, position)
        })
        .collect();
    ordered.sort_by_key(|(_, position)| *position);

    let mut lines: Vec<String> = vec![
        "digraph rack_layout {".into(),
        String::new(),
        "  graph [".into(),
        "    rankdir=TB,".into(),
        "    nodesep=0.3,".into(),
        "    ranksep=0,".into(),
        "    bgcolor=\"white\"".into(),
        "  ];".into(),
        String::new(),
        "  node [".into(),
        "    shape=plain,".into(),
        format!("    fontname=\"{}\"", FONT_FACE),
        "  ];".into(),
        String::new(),
    ];
    let mut warnings = Vec::new();

    for (cfg, _) in &ordered {
        for face in Face::ALL {
            let entries = match face {
                Face::Front => &cfg.front,
                Face::Rear => &cfg.rear,
            };
            let devices = expand_rack_devices(entries)?;
            let (slots, mut face_warnings) = build_occupancy(&devices, cfg.rack.total_u);
            warnings.append(&mut face_warnings);
            face_table(&mut lines, &cfg.rack, face, &slots, type_colors);
        }
    }

    let ids: Vec<&str> = ordered.iter().map(|(cfg, _)| cfg.rack.id.as_str()).collect();

    lines.push("  // Spacing between rack pairs".into());
    for i in 0..ids.len().saturating_sub(1) {
        lines.push(format!(
            "  spacer_{} [shape=point, style=invis, width=1.6, height=0, fixedsize=true];",
            i
        ));
    }
    lines.push(String::new());

    lines.push("  // Horizontal layout with spacing".into());
    let mut rank_nodes = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        rank_nodes.push(format!("\"{}_front\"", id));
        rank_nodes.push(format!("\"{}_rear\"", id));
        if i + 1 < ids.len() {
            rank_nodes.push(format!("spacer_{}", i));
        }
    }
    lines.push(format!("  {{ rank=same; {}; }}", rank_nodes.join("; ")));
    lines.push(String::new());

    lines.push("  // Invisible edges to enforce spacing".into());
    for (i, pair) in ids.windows(2).enumerate() {
        lines.push(format!("  \"{}_rear\" -> spacer_{} [style=invis, minlen=1];", pair[0], i));
        lines.push(format!("  spacer_{} -> \"{}_front\" [style=invis, minlen=1];", i, pair[1]));
    }
    lines.push(String::new());
    lines.push("}".into());

    Ok(RackLayout {
        dot: lines.join("\n"),
        warnings,
    })
}

fn face_table(
    lines: &mut Vec<String>,
    meta: &RackMeta,
    face: Face,
    slots: &occupancy::Slots<'_>,
    type_colors: &BTreeMap<String, String>,
) {
    let title = match face {
        Face::Front => "Front",
        Face::Rear => "Rear",
    };

    lines.push(format!("  \"{}_{}\" [", meta.id, face));
    lines.push("    label=<".into());
    lines.push(String::new());
    lines.push("<TABLE".into());
    lines.push("  BORDER=\"2\"".into());
    lines.push("  CELLBORDER=\"1\"".into());
    lines.push("  CELLSPACING=\"0\"".into());
    lines.push("  CELLPADDING=\"4\"".into());
    lines.push(format!("  WIDTH=\"{}\"", meta.table_width));
    lines.push(">".into());
    lines.push(String::new());

    lines.push("<TR>".into());
    lines.push(format!(
        "<TD COLSPAN=\"3\" BGCOLOR=\"{}\"><FONT POINT-SIZE=\"{}\" FACE=\"{}\"><B>{} {}</B></FONT></TD>",
        TITLE_COLOR,
        meta.title_font_size,
        FONT_FACE,
        escape_html(meta.display_name()),
        title
    ));
    lines.push("</TR>".into());

    let unit_cell = |u: u32| {
        format!(
            "<TD WIDTH=\"{}\"><FONT FACE=\"{}\">{}</FONT></TD>",
            meta.u_col_width, FONT_FACE, u
        )
    };

    let mut u = meta.total_u;
    while u >= 1 {
        let Some(dev) = slots.get(&u) else {
            lines.push("<TR>".into());
            lines.push(unit_cell(u));
            lines.push("<TD COLSPAN=\"2\"></TD>".into());
            lines.push("</TR>".into());
            u -= 1;
            continue;
        };

        let units = dev.units;
        let font = if meta.auto_scale_font {
            (meta.device_font_size + units as f64).min(MAX_DEVICE_FONT)
        } else {
            meta.device_font_size
        };
        let color = device_color(dev.color.as_deref(), dev.device_type.as_deref(), type_colors);

        let mut content = format!(
            "<FONT POINT-SIZE=\"{}\" FACE=\"{}\"><B>{}</B></FONT>",
            font,
            FONT_FACE,
            escape_html(&dev.name)
        );
        if units > 1 {
            content.push_str(&format!(
                "<BR/><FONT POINT-SIZE=\"{}\" FACE=\"{}\">{}U</FONT>",
                meta.unit_font_size, FONT_FACE, units
            ));
        }

        lines.push("<TR>".into());
        lines.push(unit_cell(u));
        lines.push(format!(
            "<TD COLSPAN=\"2\" ROWSPAN=\"{}\" BGCOLOR=\"{}\" WIDTH=\"{}\">{}</TD>",
            units,
            escape_html(&color),
            meta.device_width,
            content
        ));
        lines.push("</TR>".into());

        // occupancy guarantees the device spans u down to u - units + 1
        for below in 1..units {
            lines.push("<TR>".into());
            lines.push(unit_cell(u - below));
            lines.push("</TR>".into());
        }
        u = u.saturating_sub(units);
    }

    lines.push(String::new());
    lines.push("</TABLE>".into());
    lines.push(String::new());
    lines.push(">".into());
    lines.push("  ];".into());
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_racks;

    fn system(yaml: &str) -> SystemConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const TWO_RACKS: &str = r##"
racks:
  - rack: { id: r2, name: "Rack 2", total_u: 4, position: 1 }
    front:
      - { name: "Storage", start_u: 4, units: 2, type: storage }
  - rack: { id: r1, name: "Rack 1", total_u: 4, position: 0 }
    front:
      - { name: "Switch", start_u: 4, units: 1, color: "#112233" }
      - { name: "Clash", start_u: 4, units: 1 }
    rear:
      - { name: "PDU", start_u: 1, units: 1, type: power }
type_colors:
  storage: "#aabbcc"
"##;

    fn render(yaml: &str) -> RackLayout {
        let sys = system(yaml);
        let configs = sys.racks.unwrap_or_default();
        let racks = build_racks(&configs).unwrap();
        generate_rack_layout_dot(&configs, &racks, &sys.type_colors).unwrap()
    }

    #[test]
    fn test_layout_orders_faces_by_position() {
        let layout = render(TWO_RACKS);
        assert!(layout.dot.starts_with("digraph rack_layout {"));
        assert!(layout.dot.contains(
            "{ rank=same; \"r1_front\"; \"r1_rear\"; spacer_0; \"r2_front\"; \"r2_rear\"; }"
        ));
        assert!(layout.dot.contains("\"r1_rear\" -> spacer_0 [style=invis, minlen=1];"));
        assert!(layout.dot.contains("spacer_0 -> \"r2_front\" [style=invis, minlen=1];"));
        assert!(!layout.dot.contains("spacer_1"));
        assert!(layout.dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_layout_cells_and_colors() {
        let layout = render(TWO_RACKS);
        assert!(layout.dot.contains("<B>Rack 1 Front</B>"));
        assert!(layout.dot.contains("<B>Rack 2 Rear</B>"));
        assert!(layout.dot.contains("ROWSPAN=\"1\" BGCOLOR=\"#112233\""));
        assert!(layout.dot.contains("ROWSPAN=\"2\" BGCOLOR=\"#aabbcc\""));
        assert!(layout.dot.contains("ROWSPAN=\"1\" BGCOLOR=\"#FFFFFF\""));
        // 2U device: auto-scaled font and a units line
        assert!(layout.dot.contains("<FONT POINT-SIZE=\"15.5\""));
        assert!(layout.dot.contains(">2U</FONT>"));
    }

    #[test]
    fn test_layout_collects_conflict_warnings() {
        let layout = render(TWO_RACKS);
        assert_eq!(layout.warnings.len(), 1);
        assert!(layout.warnings[0].contains("U4 conflict between Switch and Clash"));
    }

    #[test]
    fn test_layout_one_row_per_unit() {
        let layout = render(
            "racks:\n  - rack: { id: solo, total_u: 3 }\n    front:\n      - { name: Big, start_u: 3, units: 2 }\n",
        );
        let unit_rows = layout.dot.matches("<TD WIDTH=\"28\">").count();
        // three units per face, two faces
        assert_eq!(unit_rows, 6);
        assert!(!layout.dot.contains("spacer_0"));
        assert!(layout.dot.contains("{ rank=same; \"solo_front\"; \"solo_rear\"; }"));
    }

    #[test]
    fn test_layout_font_cap() {
        let layout = render(
            "racks:\n  - rack: { id: r, total_u: 10 }\n    front:\n      - { name: Huge, start_u: 10, units: 8 }\n",
        );
        assert!(layout.dot.contains("<FONT POINT-SIZE=\"20\" FACE"));
    }
}
