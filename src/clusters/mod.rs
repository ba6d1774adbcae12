//! `{N}` cluster expansion for devices, connections and host inventory.
//!
//! A cluster entry carries a `start`/`end` range and a name template; it
//! expands into one concrete entry per integer in the inclusive range.
//! Templates may use `{N}`, `{N+k}` and `{N-k}`.

use regex_lite::{Captures, Regex};
use std::sync::OnceLock;

use crate::models::*;
use crate::registry::ConfigError;

const PLACEHOLDER_PATTERN: &str = r"\{N(?:([+-])(\d+))?\}";

/// Upper bound on the members one cluster entry may expand into
pub const MAX_CLUSTER_MEMBERS: u64 = 10_000;

fn placeholder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).ok()).as_ref()
}

/// True if the template contains any `{N}`-style placeholder
pub fn has_placeholder(template: &str) -> bool {
    match placeholder_regex() {
        Some(re) => re.is_match(template),
        None => template.contains("{N}"),
    }
}

/// Substitute every `{N}`, `{N+k}` and `{N-k}` in `template` for member `n`
pub fn substitute(template: &str, n: i64) -> String {
    let Some(re) = placeholder_regex() else {
        return template.replace("{N}", &n.to_string());
    };
    re.replace_all(template, |caps: &Captures| {
        let offset: i64 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let value = match caps.get(1).map(|m| m.as_str()) {
            Some("-") => n - offset,
            Some(_) => n + offset,
            None => n,
        };
        value.to_string()
    })
    .into_owned()
}

fn parse_bound(entry: &str, field: &str, bound: &RangeBound) -> Result<i64, ConfigError> {
    match bound {
        RangeBound::Int(n) => Ok(*n),
        RangeBound::Text(s) => s.trim().parse().map_err(|_| {
            ConfigError::invalid_cluster(entry, format!("`{}` is not an integer: '{}'", field, s))
        }),
    }
}

/// Resolve a cluster range. `Ok(None)` means the entry is not a cluster.
pub fn parse_range(
    entry: &str,
    start: Option<&RangeBound>,
    end: Option<&RangeBound>,
) -> Result<Option<(i64, i64)>, ConfigError> {
    let (start, end) = match (start, end) {
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(ConfigError::invalid_cluster(entry, "`start` given without `end`")),
        (None, Some(_)) => return Err(ConfigError::invalid_cluster(entry, "`end` given without `start`")),
        (Some(s), Some(e)) => (parse_bound(entry, "start", s)?, parse_bound(entry, "end", e)?),
    };
    if start > end {
        return Err(ConfigError::invalid_cluster(
            entry,
            format!("`start` ({}) is greater than `end` ({})", start, end),
        ));
    }
    if end.abs_diff(start) >= MAX_CLUSTER_MEMBERS {
        return Err(ConfigError::invalid_cluster(
            entry,
            format!(
                "range {}..={} expands to more than {} members",
                start, end, MAX_CLUSTER_MEMBERS
            ),
        ));
    }
    Ok(Some((start, end)))
}

/// Range for a named device entry: the name placeholder and the range must
/// appear together.
fn device_range(
    name: &str,
    start: Option<&RangeBound>,
    end: Option<&RangeBound>,
) -> Result<Option<(i64, i64)>, ConfigError> {
    let range = parse_range(name, start, end)?;
    match (range, has_placeholder(name)) {
        (Some(_), false) => Err(ConfigError::invalid_cluster(
            name,
            "declares `start`/`end` but the name has no {N} placeholder",
        )),
        (None, true) => Err(ConfigError::invalid_cluster(
            name,
            "name has a {N} placeholder but no `start`/`end` range",
        )),
        (range, _) => Ok(range),
    }
}

/// Expand rack device clusters. Members stack downward from the first
/// member's `start_u`, each step moving by `units + spacing`.
pub fn expand_rack_devices(entries: &[RackDeviceEntry]) -> Result<Vec<RackDevice>, ConfigError> {
    let mut expanded = Vec::new();

    for entry in entries {
        match device_range(&entry.name, entry.start.as_ref(), entry.end.as_ref())? {
            Some((start, end)) => {
                let step = (entry.units + entry.spacing) as i64;
                for n in start..=end {
                    let start_u = entry
                        .start_u
                        .map(|u| (u as i64 - step * (n - start)) as i32);
                    expanded.push(RackDevice {
                        name: substitute(&entry.name, n),
                        start_u,
                        units: entry.units,
                        device_type: entry.device_type.clone(),
                        color: entry.color.clone(),
                    });
                }
            }
            None => expanded.push(RackDevice {
                name: entry.name.clone(),
                start_u: entry.start_u,
                units: entry.units,
                device_type: entry.device_type.clone(),
                color: entry.color.clone(),
            }),
        }
    }

    Ok(expanded)
}

/// Expand external devices. Grouped devices inherit the group's distance;
/// flat entries land in the default group with their own distance.
pub fn expand_external_devices(entries: &[ExternalEntry]) -> Result<Vec<ExternalDevice>, ConfigError> {
    let mut expanded = Vec::new();

    for entry in entries {
        match entry {
            ExternalEntry::Group(group) => {
                let distance = group.distance_from_racks.unwrap_or(0.0);
                for dev in &group.devices {
                    expand_external_entry(dev, &group.name, distance, &mut expanded)?;
                }
            }
            ExternalEntry::Device(dev) => {
                let distance = dev.distance_from_racks.unwrap_or(0.0);
                expand_external_entry(dev, &default_external_group(), distance, &mut expanded)?;
            }
        }
    }

    Ok(expanded)
}

fn expand_external_entry(
    dev: &ExternalDeviceEntry,
    group: &str,
    distance: f64,
    out: &mut Vec<ExternalDevice>,
) -> Result<(), ConfigError> {
    let make = |name: String| ExternalDevice {
        name,
        group: group.to_string(),
        distance_from_racks: distance,
        device_type: dev.device_type.clone(),
        color: dev.color.clone(),
    };
    match device_range(&dev.name, dev.start.as_ref(), dev.end.as_ref())? {
        Some((start, end)) => out.extend((start..=end).map(|n| make(substitute(&dev.name, n)))),
        None => out.push(make(dev.name.clone())),
    }
    Ok(())
}

/// Expand one wiring layer into concrete connections. Connection-level
/// styling and cable type override the layer defaults.
pub fn expand_wiring_clusters(layer: &WiringLayer) -> Result<Vec<Connection>, ConfigError> {
    let mut expanded = Vec::new();

    for conn in &layer.connections {
        let make = |from: String, to: String| Connection {
            from,
            to,
            label: conn.label.clone().filter(|s| !s.is_empty()),
            color: conn.color.clone().filter(|s| !s.is_empty()),
            edge_color: conn
                .edge_color
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| layer.edge_color.clone()),
            style: conn.style.clone().unwrap_or_else(|| layer.edge_style.clone()),
            width: conn.width.unwrap_or(layer.edge_width),
            cable_type: conn
                .cable_type
                .clone()
                .or_else(|| layer.cable_type.clone())
                .filter(|s| !s.is_empty()),
        };

        let targets = conn.to.to_vec();
        let entry_name = format!("{} -> {}", conn.from, targets.join(", "));
        match parse_range(&entry_name, conn.start.as_ref(), conn.end.as_ref())? {
            Some((start, end)) => {
                for to in &targets {
                    for n in start..=end {
                        expanded.push(make(substitute(&conn.from, n), substitute(to, n)));
                    }
                }
            }
            None => {
                for to in targets {
                    expanded.push(make(conn.from.clone(), to));
                }
            }
        }
    }

    Ok(expanded)
}

/// Expand host inventory clusters, substituting into every port field
pub fn expand_computer_info(entries: &[ComputerInfoEntry]) -> Result<Vec<ComputerInfo>, ConfigError> {
    let mut expanded = Vec::new();

    for entry in entries {
        match parse_range(&entry.device_name, entry.start.as_ref(), entry.end.as_ref())? {
            Some((start, end)) => {
                for n in start..=end {
                    expanded.push(ComputerInfo {
                        device_name: substitute(&entry.device_name, n),
                        arena_part_number: entry.arena_part_number.clone(),
                        ethernet_ports: entry
                            .ethernet_ports
                            .iter()
                            .map(|p| EthernetPort {
                                adapter: substitute(&p.adapter, n),
                                mac: substitute(&p.mac, n),
                                ip: substitute(&p.ip, n),
                            })
                            .collect(),
                    });
                }
            }
            None => expanded.push(ComputerInfo {
                device_name: entry.device_name.clone(),
                arena_part_number: entry.arena_part_number.clone(),
                ethernet_ports: entry.ethernet_ports.clone(),
            }),
        }
    }

    Ok(expanded)
}
