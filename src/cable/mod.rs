pub mod color;
pub mod order;

pub use order::aggregate_cable_order;

use crate::models::*;

/// Tolerance below the half-meter ceiling. A raw total that exceeds a half
/// meter multiple by less than 5e-10 m is treated as float noise (such as
/// 2.5000000000000004) and reports that multiple, not the next one up.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Estimate the minimum purchasable cable length between two named devices.
///
/// The length is the sum of independent contributions:
/// - vertical run: within one rack the difference between bottom units,
///   across racks (or to an external device) each rack-side device's drop
///   to unit 1 of its own rack
/// - one front-to-back traversal per front-mounted endpoint
/// - rack row distance when the endpoints sit in different racks
/// - the group distance of every external endpoint
/// - fixed slack
///
/// The total is rounded up to the next half meter. Returns None if either
/// device is not in the map.
pub fn calculate_cable_length(
    from_name: &str,
    to_name: &str,
    devices: &DeviceMap,
    racks: &[Rack],
    constants: &CableConstants,
) -> Option<CableBreakdown> {
    let from = devices.get(from_name)?;
    let to = devices.get(to_name)?;

    let unit_distance = unit_distance(from, to);
    let unit_length = unit_distance as f64 * constants.standard_u_height;

    let traversals = front_to_back_traversals(from) + front_to_back_traversals(to);
    let front_to_back_length = traversals as f64 * constants.front_to_back_length;

    let inter_rack_length = match (&from.placement, &to.placement) {
        (
            Placement::RackMounted { rack_id: a, .. },
            Placement::RackMounted { rack_id: b, .. },
        ) if a != b => {
            let delta = rack_position(racks, a).abs_diff(rack_position(racks, b));
            delta as f64 * constants.inter_rack_distance
        }
        _ => 0.0,
    };

    let external_length = from.distance_from_racks() + to.distance_from_racks();
    let slack_length = constants.cable_slack_length;

    let raw = unit_length + front_to_back_length + inter_rack_length + external_length + slack_length;

    Some(CableBreakdown {
        from_rack: rack_label(from, racks),
        to_rack: rack_label(to, racks),
        unit_distance,
        unit_length,
        front_to_back_length,
        inter_rack_length,
        external_length,
        slack_length,
        total_length: round_up_to_half_meter(raw),
    })
}

/// Smallest multiple of 0.5 that is >= `meters`
pub fn round_up_to_half_meter(meters: f64) -> f64 {
    (meters * 2.0 - ROUNDING_EPSILON).ceil() / 2.0
}

fn bottom_u(start_u: i32, units: u32) -> i64 {
    start_u as i64 - units as i64 + 1
}

/// Vertical run in rack units
fn unit_distance(from: &DeviceRecord, to: &DeviceRecord) -> u32 {
    match (&from.placement, &to.placement) {
        (
            Placement::RackMounted { rack_id: a, start_u: sa, units: ua, .. },
            Placement::RackMounted { rack_id: b, start_u: sb, units: ub, .. },
        ) if a == b => match (sa, sb) {
            (Some(sa), Some(sb)) => (bottom_u(*sa, *ua) - bottom_u(*sb, *ub)).unsigned_abs() as u32,
            _ => 0,
        },
        // Separate racks, or an external endpoint: each rack side runs down
        // to its own unit 1 independently.
        _ => drop_to_floor(from) + drop_to_floor(to),
    }
}

fn drop_to_floor(device: &DeviceRecord) -> u32 {
    match device.placement {
        Placement::RackMounted { start_u: Some(u), .. } => (u - 1).max(0) as u32,
        _ => 0,
    }
}

/// Front-mounted devices need one traversal to reach the rear cable exit
fn front_to_back_traversals(device: &DeviceRecord) -> u32 {
    match device.placement {
        Placement::RackMounted { face: Face::Front, .. } => 1,
        _ => 0,
    }
}

fn rack_position(racks: &[Rack], rack_id: &str) -> u32 {
    racks
        .iter()
        .find(|r| r.id == rack_id)
        .map(|r| r.position)
        .unwrap_or(0)
}

fn rack_label(device: &DeviceRecord, racks: &[Rack]) -> String {
    match &device.placement {
        Placement::RackMounted { rack_id, .. } => racks
            .iter()
            .find(|r| &r.id == rack_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| rack_id.clone()),
        Placement::External { .. } => EXTERNAL_RACK_LABEL.to_string(),
    }
}

/// Estimate every connection of every layer. Connections naming a device
/// that is not registered are skipped; their warnings are returned.
pub fn estimate_runs(
    layers: &[(String, Vec<Connection>)],
    devices: &DeviceMap,
    racks: &[Rack],
    constants: &CableConstants,
) -> (Vec<CableRun>, Vec<String>) {
    let mut runs = Vec::new();
    let mut warnings = Vec::new();

    for (layer, connections) in layers {
        for conn in connections {
            match calculate_cable_length(&conn.from, &conn.to, devices, racks, constants) {
                Some(breakdown) => runs.push(CableRun {
                    layer: layer.clone(),
                    connection: conn.clone(),
                    breakdown,
                }),
                None => {
                    for name in [&conn.from, &conn.to] {
                        if !devices.contains_key(name) {
                            let msg = format!(
                                "Device '{}' not found in device map (used in {})",
                                name, layer
                            );
                            tracing::warn!("{}", msg);
                            warnings.push(msg);
                        }
                    }
                }
            }
        }
    }

    (runs, warnings)
}
