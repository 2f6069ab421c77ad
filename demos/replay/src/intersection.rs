//! The pilot intersection.
//!
//! East approach: lanes 16–18 straight, 19 right-or-U-turn.  During the
//! evening peak lane 18 becomes a U-turn lane and 19 a plain right turn.
//! Its sign (over lane 18) trades a straight lane for right-turn capacity.
//!
//! West approach: lane 30 left, 31–33 straight.  Its sign (over lane 31)
//! trades a straight lane for a second left lane.

use anyhow::{Context, Result};

use vl_core::{
    Direction, GreenSplit, LaneId, Movement, SignId, Turn, TurnDemand, vehicle_mix_factor,
};
use vl_lane::{
    LaneAllocation, LaneTurnRenderer, TurnAllocation, VarianceLane, VarianceLaneBuilder, Vms,
};
use vl_schedule::LaneMapping;

pub const PEAK_HOURS: (f64, f64) = (17.0, 20.0);

const CYCLE_SECS:  f64 = 150.0;
const TRUCK_SHARE: f64 = 0.2;

// Movement codes shown on the signs.
const SHOW_LEFT:     u32 = 1;
const SHOW_STRAIGHT: u32 = 2;
const SHOW_RIGHT:    u32 = 3;

// ── Lane mappings ─────────────────────────────────────────────────────────────

fn mapping(entries: &[(u32, Direction, Turn)]) -> LaneMapping {
    entries
        .iter()
        .map(|&(lane, direction, turn)| (LaneId(lane), Movement::new(direction, turn)))
        .collect()
}

pub fn base_mapping() -> LaneMapping {
    use Direction::{East, West};
    mapping(&[
        (16, East, Turn::Straight),
        (17, East, Turn::Straight),
        (18, East, Turn::Straight),
        (19, East, Turn::RightTurn),
        (30, West, Turn::Left),
        (31, West, Turn::Straight),
        (32, West, Turn::Straight),
        (33, West, Turn::Straight),
    ])
}

pub fn peak_mapping() -> LaneMapping {
    let mut m = base_mapping();
    m.insert(LaneId(18), Movement::new(Direction::East, Turn::UTurn));
    m.insert(LaneId(19), Movement::new(Direction::East, Turn::Right));
    m
}

/// Mapping for a derived schedule interval: the peak mapping if the
/// interval's midpoint falls in the peak hours.
pub fn mapping_for(start: f64, end: f64) -> LaneMapping {
    let mid = (start + end) / 2.0;
    if mid >= PEAK_HOURS.0 && mid < PEAK_HOURS.1 { peak_mapping() } else { base_mapping() }
}

// ── Variance lanes ────────────────────────────────────────────────────────────

fn alloc(pairs: &[(Turn, f64)]) -> TurnAllocation {
    pairs.iter().copied().collect()
}

fn demand(turn: Turn) -> Result<TurnDemand> {
    TurnDemand::with_design_capacity(turn, vehicle_mix_factor(TRUCK_SHARE))
        .with_context(|| format!("no design capacity for {turn}"))
}

fn saturation_threshold(turn: Turn) -> f64 {
    match turn {
        Turn::Left => 0.8,
        Turn::Right => 0.9,
        _ => 0.75,
    }
}

fn builder(direction: Direction, allocation: LaneAllocation, turns: &[Turn]) -> Result<VarianceLaneBuilder> {
    let mut b = VarianceLaneBuilder::new(direction, allocation);
    for &turn in turns {
        b = b.demand(demand(turn)?).saturation_threshold(turn, saturation_threshold(turn));
    }
    Ok(b)
}

pub fn east_lane() -> Result<VarianceLane> {
    let allocation = LaneAllocation::new(
        alloc(&[(Turn::Straight, 2.0), (Turn::UTurn, 0.0), (Turn::Right, 0.0)]),
        vec![
            alloc(&[(Turn::Straight, 1.0), (Turn::UTurn, 0.5), (Turn::Right, 1.0)]),
            alloc(&[(Turn::Straight, 0.0), (Turn::UTurn, 1.0), (Turn::Right, 1.0)]),
        ],
    )?;
    let renderer = LaneTurnRenderer::new(Direction::East)
        .lane(Turn::Straight, LaneId(18), SHOW_STRAIGHT)
        .lane(Turn::Right, LaneId(18), SHOW_RIGHT);
    let sign = Vms::new(SignId(1), Turn::Straight, Turn::Straight, Turn::Right, renderer)?;

    Ok(builder(Direction::East, allocation, &[Turn::Straight, Turn::UTurn, Turn::Right])?
        .green_split(Turn::Straight, GreenSplit::from_timing(45.0, CYCLE_SECS))
        .green_split(Turn::UTurn, GreenSplit::from_timing(52.0, CYCLE_SECS))
        .green_split(Turn::Right, GreenSplit::range(1.0, 52.0 / CYCLE_SECS))
        .sign(sign)
        .build()?)
}

pub fn west_lane() -> Result<VarianceLane> {
    let allocation = LaneAllocation::new(
        alloc(&[(Turn::Straight, 2.0), (Turn::Left, 1.0)]),
        vec![
            alloc(&[(Turn::Straight, 1.0), (Turn::Left, 0.0)]),
            alloc(&[(Turn::Straight, 0.0), (Turn::Left, 1.0)]),
        ],
    )?;
    let renderer = LaneTurnRenderer::new(Direction::West)
        .lane(Turn::Straight, LaneId(31), SHOW_STRAIGHT)
        .lane(Turn::Left, LaneId(31), SHOW_LEFT);
    let sign = Vms::new(SignId(2), Turn::Straight, Turn::Straight, Turn::Left, renderer)?;

    Ok(builder(Direction::West, allocation, &[Turn::Straight, Turn::Left])?
        .green_split(Turn::Straight, GreenSplit::from_timing(45.0, CYCLE_SECS))
        .green_split(Turn::Left, GreenSplit::from_timing(52.0, CYCLE_SECS))
        .sign(sign)
        .build()?)
}
