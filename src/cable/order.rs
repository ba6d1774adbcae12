use std::collections::BTreeMap;

use super::color::{color_name, UNSPECIFIED};
use crate::models::*;

/// Cable type of pre-supplied cables that need no ordering
pub const INCLUDED_CABLE_TYPE: &str = "included";

/// Fold estimated runs into order quantities grouped by cable type, cable
/// color and rounded length.
pub fn aggregate_cable_order(runs: &[CableRun]) -> CableOrder {
    // (type, color) -> half-meter count -> quantity
    let mut tally: BTreeMap<(String, String), BTreeMap<u64, u32>> = BTreeMap::new();

    for run in runs {
        let cable_type = run
            .connection
            .cable_type
            .clone()
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        if cable_type.eq_ignore_ascii_case(INCLUDED_CABLE_TYPE) {
            continue;
        }
        let color = color_name(run.connection.color.as_deref().unwrap_or(""));
        let half_meters = (run.breakdown.total_length * 2.0).round().max(0.0) as u64;

        *tally
            .entry((cable_type, color))
            .or_default()
            .entry(half_meters)
            .or_insert(0) += 1;
    }

    let mut order = CableOrder::default();
    for ((cable_type, color), lengths) in tally {
        let lines: Vec<CableOrderLine> = lengths
            .into_iter()
            .map(|(half_meters, quantity)| {
                let length = half_meters as f64 / 2.0;
                CableOrderLine {
                    length,
                    quantity,
                    subtotal: length * quantity as f64,
                }
            })
            .collect();
        let quantity: u32 = lines.iter().map(|l| l.quantity).sum();
        let length: f64 = lines.iter().map(|l| l.subtotal).sum();

        order.total_quantity += quantity;
        order.total_length += length;
        order.groups.push(CableOrderGroup {
            cable_type,
            color,
            lines,
            quantity,
            length,
        });
    }

    order
}
