use serde::{Deserialize, Serialize};

/// Physical constants for cable length estimation, all in meters.
/// Any key missing from the system description falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableConstants {
    /// Fixed margin added to every cable
    #[serde(default = "default_cable_slack_length")]
    pub cable_slack_length: f64,
    /// Height of one rack unit
    #[serde(default = "default_standard_u_height")]
    pub standard_u_height: f64,
    /// One front-to-back traversal inside a rack
    #[serde(default = "default_front_to_back_length")]
    pub front_to_back_length: f64,
    /// Distance between adjacent rack positions
    #[serde(default = "default_inter_rack_distance")]
    pub inter_rack_distance: f64,
}

fn default_cable_slack_length() -> f64 { 0.2 }
fn default_standard_u_height() -> f64 { 0.045 }
fn default_front_to_back_length() -> f64 { 0.5 }
fn default_inter_rack_distance() -> f64 { 2.5 }

impl Default for CableConstants {
    fn default() -> Self {
        Self {
            cable_slack_length: default_cable_slack_length(),
            standard_u_height: default_standard_u_height(),
            front_to_back_length: default_front_to_back_length(),
            inter_rack_distance: default_inter_rack_distance(),
        }
    }
}

/// A concrete connection between two registered device names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Physical cable color (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Diagram edge color, layer default applied
    pub edge_color: String,
    pub style: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cable_type: Option<String>,
}

/// CableBreakdown lists every contribution to one cable's length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableBreakdown {
    pub from_rack: String,
    pub to_rack: String,
    /// Vertical run in rack units
    pub unit_distance: u32,
    pub unit_length: f64,
    pub front_to_back_length: f64,
    pub inter_rack_length: f64,
    pub external_length: f64,
    pub slack_length: f64,
    /// Sum of the above, rounded up to the next half meter
    pub total_length: f64,
}

/// One estimated connection of one wiring layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableRun {
    pub layer: String,
    pub connection: Connection,
    pub breakdown: CableBreakdown,
}

/// Cable order, grouped by cable type and color
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CableOrder {
    pub groups: Vec<CableOrderGroup>,
    pub total_quantity: u32,
    pub total_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableOrderGroup {
    pub cable_type: String,
    pub color: String,
    /// Sorted by ascending length
    pub lines: Vec<CableOrderLine>,
    pub quantity: u32,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableOrderLine {
    pub length: f64,
    pub quantity: u32,
    pub subtotal: f64,
}
