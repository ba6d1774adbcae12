use std::collections::BTreeMap;

use crate::models::RackDevice;

/// Rack units of one rack face mapped to the device occupying them
pub type Slots<'a> = BTreeMap<u32, &'a RackDevice>;

/// Place devices on one rack face. A device that is too small, leaves the
/// rack, or overlaps an already placed device is skipped with a warning;
/// the rest are still placed. Devices without `start_u` are not drawn.
pub fn build_occupancy(devices: &[RackDevice], total_u: u32) -> (Slots<'_>, Vec<String>) {
    let mut slots: Slots = BTreeMap::new();
    let mut warnings = Vec::new();

    for dev in devices {
        let Some(start) = dev.start_u else {
            continue;
        };
        match check_placement(dev, start, total_u, &slots) {
            Ok(units) => {
                for u in units {
                    slots.insert(u, dev);
                }
            }
            Err(reason) => {
                let msg = format!("Skipping layout for device '{}'. {}", dev.name, reason);
                tracing::warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    (slots, warnings)
}

fn check_placement(
    dev: &RackDevice,
    start: i32,
    total_u: u32,
    slots: &Slots<'_>,
) -> Result<Vec<u32>, String> {
    if dev.units < 1 {
        return Err(format!("{} has invalid unit size", dev.name));
    }
    if start > total_u as i32 {
        return Err(format!("{} exceeds top of rack (U{} > U{})", dev.name, start, total_u));
    }

    let mut units = Vec::with_capacity(dev.units as usize);
    for offset in 0..dev.units as i32 {
        let u = start - offset;
        if u < 1 {
            return Err(format!("{} exceeds bottom of rack", dev.name));
        }
        let u = u as u32;
        if let Some(other) = slots.get(&u) {
            return Err(format!("U{} conflict between {} and {}", u, other.name, dev.name));
        }
        units.push(u);
    }
    Ok(units)
}
