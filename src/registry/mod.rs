//! Device registry: turns the rack and external-device description into the
//! flat name -> record map every other stage reads from.

use std::collections::HashMap;

use crate::clusters::{expand_external_devices, expand_rack_devices};
use crate::models::*;

/// Structural problems in the system description. Every variant names the
/// offending entry so the author can fix the YAML without guessing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid cluster '{entry}': {reason}")]
    InvalidCluster { entry: String, reason: String },

    #[error("duplicate device name '{name}' (defined in {first} and {second})")]
    DuplicateDevice {
        name: String,
        first: String,
        second: String,
    },

    #[error("duplicate rack id '{0}'")]
    DuplicateRack(String),

    #[error("racks '{first}' and '{second}' share position {position}")]
    DuplicateRackPosition {
        position: u32,
        first: String,
        second: String,
    },

    #[error("rack '{0}' must have total_u of at least 1")]
    InvalidRackHeight(String),

    #[error("device '{0}' must occupy at least 1 unit")]
    InvalidDeviceHeight(String),

    #[error("configuration must have 'racks' with consolidated front/rear")]
    MissingRacks,
}

impl ConfigError {
    pub fn invalid_cluster(entry: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCluster {
            entry: entry.to_string(),
            reason: reason.into(),
        }
    }
}

/// Build the rack records, resolving each rack's position along the row.
/// An explicit `position` wins; otherwise the index in the list is used.
pub fn build_racks(rack_configs: &[RackConfig]) -> Result<Vec<Rack>, ConfigError> {
    let mut racks: Vec<Rack> = Vec::with_capacity(rack_configs.len());
    let mut by_position: HashMap<u32, String> = HashMap::new();

    for (index, cfg) in rack_configs.iter().enumerate() {
        let meta = &cfg.rack;
        if racks.iter().any(|r| r.id == meta.id) {
            return Err(ConfigError::DuplicateRack(meta.id.clone()));
        }
        if meta.total_u < 1 {
            return Err(ConfigError::InvalidRackHeight(meta.id.clone()));
        }

        let position = meta.position.unwrap_or(index as u32);
        if let Some(first) = by_position.get(&position) {
            return Err(ConfigError::DuplicateRackPosition {
                position,
                first: first.clone(),
                second: meta.id.clone(),
            });
        }
        by_position.insert(position, meta.id.clone());

        racks.push(Rack {
            id: meta.id.clone(),
            name: meta.display_name().to_string(),
            total_u: meta.total_u,
            position,
        });
    }

    Ok(racks)
}

/// Build the flat device map from every rack face and every external group.
/// A name defined twice is rejected instead of silently replaced.
pub fn build_device_map(
    rack_configs: &[RackConfig],
    external_devices: &[ExternalEntry],
) -> Result<DeviceMap, ConfigError> {
    let mut devices = DeviceMap::new();

    for cfg in rack_configs {
        for face in Face::ALL {
            let entries = match face {
                Face::Front => &cfg.front,
                Face::Rear => &cfg.rear,
            };
            for dev in expand_rack_devices(entries)? {
                if dev.units < 1 {
                    return Err(ConfigError::InvalidDeviceHeight(dev.name));
                }
                insert_unique(
                    &mut devices,
                    DeviceRecord {
                        name: dev.name,
                        placement: Placement::RackMounted {
                            rack_id: cfg.rack.id.clone(),
                            face,
                            start_u: dev.start_u,
                            units: dev.units,
                        },
                        device_type: dev.device_type,
                        color: dev.color,
                    },
                )?;
            }
        }
    }

    for dev in expand_external_devices(external_devices)? {
        insert_unique(
            &mut devices,
            DeviceRecord {
                name: dev.name,
                placement: Placement::External {
                    group: dev.group,
                    distance_from_racks: dev.distance_from_racks,
                },
                device_type: dev.device_type,
                color: dev.color,
            },
        )?;
    }

    Ok(devices)
}

fn insert_unique(devices: &mut DeviceMap, record: DeviceRecord) -> Result<(), ConfigError> {
    if let Some(existing) = devices.get(&record.name) {
        return Err(ConfigError::DuplicateDevice {
            name: record.name.clone(),
            first: describe_placement(existing),
            second: describe_placement(&record),
        });
    }
    devices.insert(record.name.clone(), record);
    Ok(())
}

fn describe_placement(record: &DeviceRecord) -> String {
    match &record.placement {
        Placement::RackMounted { rack_id, face, .. } => format!("rack '{}' {}", rack_id, face),
        Placement::External { group, .. } => format!("external group '{}'", group),
    }
}

/// Count of external devices in a map
pub fn external_count(devices: &DeviceMap) -> usize {
    devices.values().filter(|d| d.is_external()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rack(id: &str, position: Option<u32>) -> RackConfig {
        serde_yaml::from_str(&format!(
            "rack: {{ id: {}, name: 'Rack {}', total_u: 42{} }}",
            id,
            id,
            position.map(|p| format!(", position: {}", p)).unwrap_or_default()
        ))
        .unwrap()
    }

    #[test]
    fn test_build_racks_uses_list_index_by_default() {
        let racks = build_racks(&[rack("r1", None), rack("r2", None)]).unwrap();
        assert_eq!(racks[0].position, 0);
        assert_eq!(racks[1].position, 1);
        assert_eq!(racks[1].name, "Rack r2");
    }

    #[test]
    fn test_build_racks_explicit_position() {
        let racks = build_racks(&[rack("r1", Some(4)), rack("r2", Some(1))]).unwrap();
        assert_eq!(racks[0].position, 4);
        assert_eq!(racks[1].position, 1);
    }

    #[test]
    fn test_build_racks_rejects_shared_position() {
        let err = build_racks(&[rack("r1", None), rack("r2", Some(0))]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateRackPosition {
                position: 0,
                first: "r1".into(),
                second: "r2".into(),
            }
        );
    }

    #[test]
    fn test_build_racks_rejects_duplicate_id() {
        let err = build_racks(&[rack("r1", None), rack("r1", None)]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateRack("r1".into()));
    }

    #[test]
    fn test_build_device_map_rack_and_external() {
        let yaml = r#"
racks:
  - rack: { id: r1, name: Rack 1, total_u: 42 }
    front:
      - { name: Switch, start_u: 40, units: 1, type: switch }
      - { name: "RVD {N}", start_u: 20, units: 4, start: 1, end: 3 }
    rear:
      - { name: PDU, start_u: 42, units: 2 }
external_devices:
  - name: Operator Room
    distance_from_racks: 30
    devices:
      - { name: "Beltpack {N}", start: 1, end: 2, type: beltpack }
  - name: Loose Laptop
"#;
        let system: SystemConfig = serde_yaml::from_str(yaml).unwrap();
        let racks = system.racks.unwrap();
        let devices = build_device_map(&racks, &system.external_devices).unwrap();

        assert_eq!(devices.len(), 8);
        assert_eq!(external_count(&devices), 3);

        let rvd3 = &devices["RVD 3"];
        assert_eq!(rvd3.start_u(), Some(12));
        assert_eq!(rvd3.face_label(), "front");

        let pdu = &devices["PDU"];
        assert_eq!(pdu.rack_id(), "r1");
        assert_eq!(pdu.face_label(), "rear");
        assert_eq!(pdu.distance_from_racks(), 0.0);

        let bp = &devices["Beltpack 2"];
        assert_eq!(bp.rack_id(), EXTERNAL_RACK_ID);
        assert_eq!(bp.face_label(), "external");
        assert_eq!(bp.units(), 1);
        assert_eq!(bp.start_u(), None);
        assert_eq!(bp.distance_from_racks(), 30.0);
        assert_eq!(bp.group(), Some("Operator Room"));

        let laptop = &devices["Loose Laptop"];
        assert_eq!(laptop.group(), Some("External Devices"));
        assert_eq!(laptop.distance_from_racks(), 0.0);
    }

    #[test]
    fn test_build_device_map_rejects_duplicate_names() {
        let yaml = r#"
racks:
  - rack: { id: r1, total_u: 42 }
    front:
      - { name: Switch, start_u: 40 }
external_devices:
  - name: Desk
    devices:
      - { name: Switch }
"#;
        let system: SystemConfig = serde_yaml::from_str(yaml).unwrap();
        let err = build_device_map(&system.racks.unwrap(), &system.external_devices).unwrap_err();
        assert_eq!(
            err.to_string(),
            "duplicate device name 'Switch' (defined in rack 'r1' front and external group 'Desk')"
        );
    }

    #[test]
    fn test_build_device_map_rejects_zero_units() {
        let yaml = r#"
racks:
  - rack: { id: r1, total_u: 42 }
    front:
      - { name: Shelf, start_u: 10, units: 0 }
"#;
        let system: SystemConfig = serde_yaml::from_str(yaml).unwrap();
        let err = build_device_map(&system.racks.unwrap(), &[]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDeviceHeight("Shelf".into()));
    }

    #[test]
    fn test_build_device_map_rejects_malformed_cluster() {
        let yaml = r#"
racks:
  - rack: { id: r1, total_u: 42 }
    front:
      - { name: "Node {N}", start_u: 30, start: 1, end: many }
"#;
        let system: SystemConfig = serde_yaml::from_str(yaml).unwrap();
        let err = build_device_map(&system.racks.unwrap(), &[]).unwrap_err();
        assert!(err.to_string().contains("Node {N}"));
    }
}
