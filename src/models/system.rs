use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CableConstants;

/// SystemConfig is the parsed system description: racks, external devices,
/// wiring layers and the cable estimation constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub racks: Option<Vec<RackConfig>>,
    #[serde(default)]
    pub external_devices: Vec<ExternalEntry>,
    #[serde(default)]
    pub wiring_layers: Vec<WiringLayer>,
    #[serde(default)]
    pub computer_info: Vec<ComputerInfoEntry>,
    /// Device type -> fill color used by the diagrams
    #[serde(default)]
    pub type_colors: BTreeMap<String, String>,
    #[serde(flatten)]
    pub cable: CableConstants,
}

/// A numeric cluster bound. YAML authors write both `start: 3` and `start: "3"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeBound::Int(n) => write!(f, "{}", n),
            RangeBound::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One rack with its front and rear device lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackConfig {
    pub rack: RackMeta,
    #[serde(default)]
    pub front: Vec<RackDeviceEntry>,
    #[serde(default)]
    pub rear: Vec<RackDeviceEntry>,
}

/// Rack metadata plus the elevation rendering knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackMeta {
    #[serde(default = "default_rack_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub total_u: u32,
    /// Ordinal in the rack row. Falls back to the index in the `racks` list.
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default = "default_table_width")]
    pub table_width: u32,
    #[serde(default = "default_device_width")]
    pub device_width: u32,
    #[serde(default = "default_u_col_width")]
    pub u_col_width: u32,
    #[serde(default = "default_device_font_size")]
    pub device_font_size: f64,
    #[serde(default = "default_unit_font_size")]
    pub unit_font_size: f64,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_true")]
    pub auto_scale_font: bool,
}

impl RackMeta {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

fn default_rack_id() -> String { "rack".to_string() }
fn default_table_width() -> u32 { 240 }
fn default_device_width() -> u32 { 200 }
fn default_u_col_width() -> u32 { 28 }
fn default_device_font_size() -> f64 { 13.5 }
fn default_unit_font_size() -> f64 { 15.0 }
fn default_title_font_size() -> f64 { 16.0 }
fn default_true() -> bool { true }
fn default_units() -> u32 { 1 }

/// A rack-mounted device, or a `{N}` cluster of them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackDeviceEntry {
    pub name: String,
    #[serde(default)]
    pub start_u: Option<i32>,
    #[serde(default = "default_units")]
    pub units: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub start: Option<RangeBound>,
    #[serde(default)]
    pub end: Option<RangeBound>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Entry of the `external_devices` list: either a named group with a shared
/// distance, or a flat device that lands in the default group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalEntry {
    Group(ExternalGroupConfig),
    Device(ExternalDeviceEntry),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalGroupConfig {
    #[serde(default = "default_external_group")]
    pub name: String,
    /// Meters between the group and the rack row
    #[serde(default)]
    pub distance_from_racks: Option<f64>,
    pub devices: Vec<ExternalDeviceEntry>,
}

pub fn default_external_group() -> String {
    "External Devices".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDeviceEntry {
    pub name: String,
    #[serde(default)]
    pub start: Option<RangeBound>,
    #[serde(default)]
    pub end: Option<RangeBound>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Only honored for ungrouped entries; grouped devices inherit the group value
    #[serde(default)]
    pub distance_from_racks: Option<f64>,
}

/// `to:` accepts a single device name or a list of names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

/// A named logical network drawn as one wiring diagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiringLayer {
    pub name: String,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
    #[serde(default = "default_edge_color")]
    pub edge_color: String,
    #[serde(default)]
    pub cable_type: Option<String>,
    #[serde(default = "default_edge_style")]
    pub edge_style: String,
    #[serde(default = "default_edge_width")]
    pub edge_width: f64,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_edge_color() -> String { "#323232".to_string() }
fn default_edge_style() -> String { "solid".to_string() }
fn default_edge_width() -> f64 { 2.0 }
fn default_font_size() -> u32 { 11 }

/// A connection as written in YAML, possibly a `{N}` cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionEntry {
    pub from: String,
    pub to: OneOrMany,
    #[serde(default)]
    pub start: Option<RangeBound>,
    #[serde(default)]
    pub end: Option<RangeBound>,
    #[serde(default)]
    pub label: Option<String>,
    /// Physical cable color (hex), used for ordering
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub edge_color: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub cable_type: Option<String>,
}

/// Host inventory entry, possibly a `{N}` cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerInfoEntry {
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default)]
    pub start: Option<RangeBound>,
    #[serde(default)]
    pub end: Option<RangeBound>,
    #[serde(default)]
    pub arena_part_number: String,
    #[serde(default)]
    pub ethernet_ports: Vec<EthernetPort>,
}

fn default_device_name() -> String { "Device {N}".to_string() }

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EthernetPort {
    #[serde(default)]
    pub adapter: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub ip: String,
}
