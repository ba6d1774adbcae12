use std::cmp::{Ordering, Reverse};
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::models::*;

/// One registered device as listed in `devices.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub rack: String,
    pub face: String,
    pub start_u: String,
    pub units: u32,
    pub group: String,
    pub distance: String,
}

/// Rack devices in rack-row order (front before rear, top unit first), then
/// external devices by group and name.
pub fn inventory_rows(devices: &DeviceMap, racks: &[Rack]) -> Vec<InventoryRow> {
    let position = |rack_id: &str| {
        racks
            .iter()
            .find(|r| r.id == rack_id)
            .map(|r| r.position)
            .unwrap_or(u32::MAX)
    };

    let mut records: Vec<&DeviceRecord> = devices.values().collect();
    records.sort_by(|a, b| match (&a.placement, &b.placement) {
        (
            Placement::RackMounted { rack_id: ra, face: fa, start_u: ua, .. },
            Placement::RackMounted { rack_id: rb, face: fb, start_u: ub, .. },
        ) => (position(ra), ra, fa, Reverse(*ua), &a.name)
            .cmp(&(position(rb), rb, fb, Reverse(*ub), &b.name)),
        (Placement::RackMounted { .. }, Placement::External { .. }) => Ordering::Less,
        (Placement::External { .. }, Placement::RackMounted { .. }) => Ordering::Greater,
        (Placement::External { group: ga, .. }, Placement::External { group: gb, .. }) => {
            (ga, &a.name).cmp(&(gb, &b.name))
        }
    });

    records
        .into_iter()
        .map(|record| {
            let rack = if record.is_external() {
                EXTERNAL_RACK_LABEL.to_string()
            } else {
                racks
                    .iter()
                    .find(|r| r.id == record.rack_id())
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| record.rack_id().to_string())
            };
            InventoryRow {
                name: record.name.clone(),
                device_type: record.device_type.clone().unwrap_or_default(),
                rack,
                face: record.face_label().to_string(),
                start_u: record.start_u().map(|u| u.to_string()).unwrap_or_default(),
                units: record.units(),
                group: record.group().unwrap_or_default().to_string(),
                distance: if record.is_external() {
                    format!("{:.1}", record.distance_from_racks())
                } else {
                    String::new()
                },
            }
        })
        .collect()
}

pub fn write_devices_csv<W: Write>(devices: &DeviceMap, racks: &[Rack], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in inventory_rows(devices, racks) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
