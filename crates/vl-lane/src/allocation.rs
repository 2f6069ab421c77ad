//! Lane allocation solver.
//!
//! An approach has a fixed number of physical lanes, a few of which can be
//! re-marked.  The traffic engineer enumerates the legal layouts as a
//! *basic* per-turn lane count plus a list of *flexible* deltas; each
//! `basic + delta` is one candidate layout.  The solver is an exhaustive
//! search over that short list.

use std::collections::BTreeMap;

use vl_core::Turn;

use crate::{LaneError, LaneResult};

/// Per-turn lane counts.  Counts are fractional: a shared lane adds `0.5`
/// to each maneuver it serves.
pub type TurnAllocation = BTreeMap<Turn, f64>;

/// Time-of-day window during which `turn` is the one to favor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityWindow {
    pub turn:       Turn,
    pub hour_start: f64,
    pub hour_end:   f64,
}

impl PriorityWindow {
    pub fn new(turn: Turn, hour_start: f64, hour_end: f64) -> Self {
        Self { turn, hour_start, hour_end }
    }

    #[inline]
    fn contains(&self, hour: f64) -> bool {
        self.hour_start <= hour && hour < self.hour_end
    }
}

// ── LaneAllocation ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct LaneAllocation {
    basic:          TurnAllocation,
    flexible:       Vec<TurnAllocation>,
    priority_table: Vec<PriorityWindow>,
}

impl LaneAllocation {
    /// # Errors
    ///
    /// `EmptyFlexibleTable` if `flexible` has no deltas.
    pub fn new(basic: TurnAllocation, flexible: Vec<TurnAllocation>) -> LaneResult<Self> {
        if flexible.is_empty() {
            return Err(LaneError::EmptyFlexibleTable);
        }
        Ok(Self { basic, flexible, priority_table: Vec::new() })
    }

    /// Attach the historical time-of-day priority table used by
    /// [`get_turn_sorted_lane_dynamic`](Self::get_turn_sorted_lane_dynamic).
    pub fn with_priority_table(mut self, windows: Vec<PriorityWindow>) -> Self {
        self.priority_table = windows;
        self
    }

    pub fn basic(&self) -> &TurnAllocation {
        &self.basic
    }

    pub fn flexible(&self) -> &[TurnAllocation] {
        &self.flexible
    }

    /// Every complete candidate layout, in table order.
    pub fn candidates(&self) -> impl Iterator<Item = TurnAllocation> + '_ {
        self.flexible.iter().map(|delta| {
            let mut candidate = self.basic.clone();
            for (&turn, &count) in delta {
                *candidate.entry(turn).or_insert(0.0) += count;
            }
            candidate
        })
    }

    /// The candidate giving `priority` the most lanes; among those, the one
    /// giving `minor` the most.  Ties keep table order.
    ///
    /// # Errors
    ///
    /// `EmptyFlexibleTable`, or `TurnNotAllocated` when `priority` (or
    /// `minor`) appears in no candidate.
    pub fn ensure_turn_allocation(
        &self,
        priority: Turn,
        minor:    Option<Turn>,
    ) -> LaneResult<TurnAllocation> {
        if self.flexible.is_empty() {
            return Err(LaneError::EmptyFlexibleTable);
        }

        let with_priority: Vec<(f64, TurnAllocation)> = self
            .candidates()
            .filter_map(|c| c.get(&priority).copied().map(|n| (n, c)))
            .collect();
        let best = with_priority
            .iter()
            .map(|(n, _)| *n)
            .reduce(f64::max)
            .ok_or(LaneError::TurnNotAllocated(priority))?;
        let mut group = with_priority.into_iter().filter(|(n, _)| *n == best).map(|(_, c)| c);

        let Some(minor) = minor else {
            return group.next().ok_or(LaneError::TurnNotAllocated(priority));
        };

        let mut chosen: Option<(f64, TurnAllocation)> = None;
        for candidate in group {
            let Some(&n) = candidate.get(&minor) else { continue };
            if chosen.as_ref().is_none_or(|(best_minor, _)| n > *best_minor) {
                chosen = Some((n, candidate));
            }
        }
        chosen.map(|(_, c)| c).ok_or(LaneError::TurnNotAllocated(minor))
    }

    /// Layout favoring whichever turn the priority table names for
    /// `current_hour` (taken modulo 24).
    ///
    /// # Errors
    ///
    /// `NoPriorityWindow` when no table entry covers the hour, plus anything
    /// [`ensure_turn_allocation`](Self::ensure_turn_allocation) returns.
    pub fn get_turn_sorted_lane_dynamic(&self, current_hour: f64) -> LaneResult<TurnAllocation> {
        let hour = current_hour.rem_euclid(24.0);
        let window = self
            .priority_table
            .iter()
            .find(|w| w.contains(hour))
            .ok_or(LaneError::NoPriorityWindow(hour))?;
        self.ensure_turn_allocation(window.turn, None)
    }
}
