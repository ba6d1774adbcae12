use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rack id reported for devices that live outside every rack
pub const EXTERNAL_RACK_ID: &str = "external";

/// Display label for the rack column of an external endpoint
pub const EXTERNAL_RACK_LABEL: &str = "External";

/// Which side of the rack a device is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Rear,
}

impl Face {
    pub const ALL: [Face; 2] = [Face::Front, Face::Rear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Rear => "rear",
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rack represents one rack of the row, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rack {
    pub id: String,
    pub name: String,
    pub total_u: u32,
    /// Ordinal along the rack row, used for inter-rack distance
    pub position: u32,
}

/// Where a device physically lives
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    RackMounted {
        rack_id: String,
        face: Face,
        /// Top rack unit, 1-based from the bottom. `None` when not positioned.
        start_u: Option<i32>,
        units: u32,
    },
    External {
        group: String,
        distance_from_racks: f64,
    },
}

/// DeviceRecord is a fully resolved device in the registry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub name: String,
    pub placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DeviceRecord {
    pub fn is_external(&self) -> bool {
        matches!(self.placement, Placement::External { .. })
    }

    /// Rack id, or `"external"` for devices outside the racks
    pub fn rack_id(&self) -> &str {
        match &self.placement {
            Placement::RackMounted { rack_id, .. } => rack_id,
            Placement::External { .. } => EXTERNAL_RACK_ID,
        }
    }

    pub fn face_label(&self) -> &'static str {
        match &self.placement {
            Placement::RackMounted { face, .. } => face.as_str(),
            Placement::External { .. } => EXTERNAL_RACK_ID,
        }
    }

    pub fn start_u(&self) -> Option<i32> {
        match &self.placement {
            Placement::RackMounted { start_u, .. } => *start_u,
            Placement::External { .. } => None,
        }
    }

    pub fn units(&self) -> u32 {
        match &self.placement {
            Placement::RackMounted { units, .. } => *units,
            Placement::External { .. } => 1,
        }
    }

    pub fn group(&self) -> Option<&str> {
        match &self.placement {
            Placement::External { group, .. } => Some(group),
            Placement::RackMounted { .. } => None,
        }
    }

    /// Group distance for external devices, 0 for rack-mounted ones
    pub fn distance_from_racks(&self) -> f64 {
        match &self.placement {
            Placement::External { distance_from_racks, .. } => *distance_from_racks,
            Placement::RackMounted { .. } => 0.0,
        }
    }
}

/// Flat name -> record lookup shared by the estimator and the diagram writers
pub type DeviceMap = HashMap<String, DeviceRecord>;

/// A rack device after cluster expansion, before it is bound to a rack face
#[derive(Debug, Clone, PartialEq)]
pub struct RackDevice {
    pub name: String,
    pub start_u: Option<i32>,
    pub units: u32,
    pub device_type: Option<String>,
    pub color: Option<String>,
}

/// An external device after cluster and group expansion
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDevice {
    pub name: String,
    pub group: String,
    pub distance_from_racks: f64,
    pub device_type: Option<String>,
    pub color: Option<String>,
}

/// A host inventory record after expansion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputerInfo {
    pub device_name: String,
    pub arena_part_number: String,
    pub ethernet_ports: Vec<super::EthernetPort>,
}
