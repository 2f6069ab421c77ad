//! Per-turn demand records and saturation arithmetic.
//!
//! # Saturation
//!
//! ```text
//! saturation = flow_hour_total / (capacity_per_lane_hour * lane_count * green_split)
//! ```
//!
//! `lane_count` is fractional: a shared lane contributes half a lane to each
//! of its maneuvers in the allocation tables.

use crate::{CoreError, CoreResult, Turn};

// ── Design saturation flows ───────────────────────────────────────────────────

/// Share of a heavy vehicle's capacity footprint relative to a passenger car.
const TRUCK_CAPACITY_WEIGHT: f64 = 0.5;

/// Default design saturation flow (veh/h per lane) for a basic turn.
///
/// Returns `None` for composite turns, whose capacity is sized per constituent.
pub fn design_saturation_flow(turn: Turn) -> Option<f64> {
    match turn {
        Turn::Straight => Some(1600.0),
        Turn::Left     => Some(1300.0),
        Turn::Right    => Some(1400.0),
        Turn::UTurn    => Some(900.0),
        _              => None,
    }
}

/// Capacity adjustment for a traffic mix with `truck_share` heavy vehicles.
///
/// `truck_share` is clamped to [0, 1].
pub fn vehicle_mix_factor(truck_share: f64) -> f64 {
    let truck_share = truck_share.clamp(0.0, 1.0);
    (1.0 - truck_share) + TRUCK_CAPACITY_WEIGHT * truck_share
}

// ── GreenSplit ────────────────────────────────────────────────────────────────

/// Fraction of the signal cycle a turn receives as green time.
///
/// A `Range` models a turn whose effective green depends on which maneuver
/// the variable lane currently serves; the decision engine reads the bound
/// that matches the question it is asking.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum GreenSplit {
    Fixed(f64),
    Range { min: f64, max: f64 },
}

impl GreenSplit {
    /// Build a range from two bounds given in either order.
    pub fn range(a: f64, b: f64) -> Self {
        GreenSplit::Range { min: a.min(b), max: a.max(b) }
    }

    /// Green split for a cycle: `green_secs / cycle_secs`.
    pub fn from_timing(green_secs: f64, cycle_secs: f64) -> Self {
        GreenSplit::Fixed(green_secs / cycle_secs)
    }

    #[inline]
    pub fn min(&self) -> f64 {
        match *self {
            GreenSplit::Fixed(v)          => v,
            GreenSplit::Range { min, .. } => min,
        }
    }

    #[inline]
    pub fn max(&self) -> f64 {
        match *self {
            GreenSplit::Fixed(v)          => v,
            GreenSplit::Range { max, .. } => max,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, GreenSplit::Range { .. })
    }
}

impl From<f64> for GreenSplit {
    fn from(v: f64) -> Self {
        GreenSplit::Fixed(v)
    }
}

// ── TurnDemand ────────────────────────────────────────────────────────────────

/// Observed demand for one basic turn of one approach.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnDemand {
    pub turn: Turn,
    /// Design saturation flow, veh/h per lane.
    pub capacity_per_lane_hour: f64,
    /// Current hourly flow across all lanes serving this turn.
    pub flow_hour_total: f64,
    pub avg_queue_length: f64,
    /// Priority rank, ascending (1 = highest).
    pub priority: Option<u8>,
}

impl TurnDemand {
    pub fn new(turn: Turn, capacity_per_lane_hour: f64) -> Self {
        Self {
            turn,
            capacity_per_lane_hour,
            flow_hour_total: 0.0,
            avg_queue_length: 0.0,
            priority: None,
        }
    }

    /// Demand sized from [`design_saturation_flow`] scaled by `mix_factor`.
    ///
    /// Returns `None` for composite turns.
    pub fn with_design_capacity(turn: Turn, mix_factor: f64) -> Option<Self> {
        design_saturation_flow(turn).map(|cap| Self::new(turn, cap * mix_factor))
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Ratio of observed flow to the capacity of `lane_count` lanes receiving
    /// `green_split` of the cycle.
    ///
    /// # Errors
    ///
    /// `ZeroLaneCount` when `lane_count <= 0`, `InvalidGreenSplit` when the
    /// split is outside (0, 1], `InvalidCapacity` for a non-positive design
    /// flow.
    pub fn saturation_rate(&self, green_split: f64, lane_count: f64) -> CoreResult<f64> {
        if lane_count <= 0.0 {
            return Err(CoreError::ZeroLaneCount { turn: self.turn });
        }
        if !(green_split > 0.0 && green_split <= 1.0) {
            return Err(CoreError::InvalidGreenSplit { turn: self.turn, split: green_split });
        }
        if self.capacity_per_lane_hour <= 0.0 {
            return Err(CoreError::InvalidCapacity {
                turn:     self.turn,
                capacity: self.capacity_per_lane_hour,
            });
        }
        Ok(self.flow_hour_total / (self.capacity_per_lane_hour * lane_count * green_split))
    }

    /// Replace the current flow and queue observations.
    pub fn update(&mut self, flow_hour: f64, queue_length: f64) {
        self.flow_hour_total = flow_hour;
        self.avg_queue_length = queue_length;
    }
}
