//! Per-movement flow accumulation for route-demand synthesis.
//!
//! Offline validation replays observed demand in a microsimulator, which
//! needs one flow series per movement.  Unlike the demand model, a shared
//! right/U-turn lane is split **in half** here so the synthesized routes
//! carry exactly the vehicles that were counted.

use std::collections::BTreeMap;

use crate::{LaneId, Movement, Turn};

/// Sum per-lane flow series into per-movement series.
///
/// Lanes missing from `lane_movements` are skipped.  Series of unequal length
/// are zero-padded to the longest one.
pub fn accumulate_movement_flow(
    lane_flows:     &BTreeMap<LaneId, Vec<f64>>,
    lane_movements: &BTreeMap<LaneId, Movement>,
) -> BTreeMap<Movement, Vec<f64>> {
    let mut movement_flow: BTreeMap<Movement, Vec<f64>> = BTreeMap::new();

    for (lane, series) in lane_flows {
        let Some(movement) = lane_movements.get(lane) else {
            continue;
        };
        if movement.turn == Turn::RightTurn {
            let half: Vec<f64> = series.iter().map(|f| f / 2.0).collect();
            add_series(&mut movement_flow, Movement::new(movement.direction, Turn::Right), &half);
            add_series(&mut movement_flow, Movement::new(movement.direction, Turn::UTurn), &half);
            continue;
        }
        add_series(&mut movement_flow, *movement, series);
    }

    movement_flow
}

fn add_series(acc: &mut BTreeMap<Movement, Vec<f64>>, movement: Movement, series: &[f64]) {
    let total = acc.entry(movement).or_default();
    if total.len() < series.len() {
        total.resize(series.len(), 0.0);
    }
    for (t, v) in total.iter_mut().zip(series) {
        *t += v;
    }
}
