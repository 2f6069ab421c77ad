//! Schedule types: `PlanDuration` and `DaySchedule`.
//!
//! # Lane mapping
//!
//! Detector lanes are fixed in the road; what changes through the day is
//! which movement each lane serves (a variable lane flips between, say,
//! straight and U-turn).  A [`LaneMapping`] records that assignment for one
//! time window.

use std::collections::{BTreeMap, BTreeSet};

use vl_core::{LaneId, Movement};

use crate::{ScheduleError, ScheduleResult};

const HOURS_PER_DAY: f64 = 24.0;

/// Lane → movement assignment in force during one time window.
pub type LaneMapping = BTreeMap<LaneId, Movement>;

/// Invert a lane mapping: every movement with the lanes that serve it.
pub fn movement_sorted_lanes(mapping: &LaneMapping) -> BTreeMap<Movement, Vec<LaneId>> {
    let mut sorted: BTreeMap<Movement, Vec<LaneId>> = BTreeMap::new();
    for (&lane, &movement) in mapping {
        sorted.entry(movement).or_default().push(lane);
    }
    sorted
}

// ── PlanDuration ──────────────────────────────────────────────────────────────

/// One lane mapping and the local-hour window `[hour_start, hour_end)` it
/// applies to.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanDuration {
    pub movement_allocation: LaneMapping,
    pub hour_start: f64,
    pub hour_end:   f64,
}

impl PlanDuration {
    pub fn new(movement_allocation: LaneMapping, hour_start: f64, hour_end: f64) -> Self {
        Self { movement_allocation, hour_start, hour_end }
    }

    /// `true` if `hour` falls inside `[hour_start, hour_end)`.
    #[inline]
    pub fn contains(&self, hour: f64) -> bool {
        self.hour_start <= hour && hour < self.hour_end
    }

    pub fn span_hours(&self) -> f64 {
        self.hour_end - self.hour_start
    }

    pub fn movement_sorted_lanes(&self) -> BTreeMap<Movement, Vec<LaneId>> {
        movement_sorted_lanes(&self.movement_allocation)
    }

    fn validate(&self) -> ScheduleResult<()> {
        let valid = self.hour_start >= 0.0
            && self.hour_end <= HOURS_PER_DAY
            && self.hour_start < self.hour_end;
        if valid {
            Ok(())
        } else {
            Err(ScheduleError::InvalidInterval { start: self.hour_start, end: self.hour_end })
        }
    }
}

// ── DaySchedule ───────────────────────────────────────────────────────────────

/// Non-overlapping time-of-day plans, sorted by start hour.
///
/// Lookups are O(log n) binary searches.
#[derive(Clone, Debug, PartialEq)]
pub struct DaySchedule {
    /// Sorted ascending by `hour_start`; pairwise disjoint.
    durations: Vec<PlanDuration>,
}

impl DaySchedule {
    /// Validate and sort `durations`.
    ///
    /// # Errors
    ///
    /// `Empty` for no intervals, `InvalidInterval` for bounds outside
    /// `0 <= start < end <= 24`, `Overlap` when two intervals intersect.
    pub fn new(mut durations: Vec<PlanDuration>) -> ScheduleResult<Self> {
        if durations.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for d in &durations {
            d.validate()?;
        }
        durations.sort_by(|a, b| a.hour_start.total_cmp(&b.hour_start));

        for pair in durations.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.hour_start < a.hour_end {
                return Err(ScheduleError::Overlap {
                    first_start:  a.hour_start,
                    first_end:    a.hour_end,
                    second_start: b.hour_start,
                    second_end:   b.hour_end,
                });
            }
        }
        Ok(Self { durations })
    }

    /// A single mapping in force all day.
    pub fn fixed(mapping: LaneMapping) -> Self {
        Self { durations: vec![PlanDuration::new(mapping, 0.0, HOURS_PER_DAY)] }
    }

    /// Two-bucket schedule: `peak` during `[peak_start, peak_end)`, `base`
    /// for the rest of the day.
    pub fn peak_split(
        base:      LaneMapping,
        peak:      LaneMapping,
        peak_hours: (f64, f64),
    ) -> ScheduleResult<Self> {
        let (start, end) = peak_hours;
        let mut durations = Vec::with_capacity(3);
        if start > 0.0 {
            durations.push(PlanDuration::new(base.clone(), 0.0, start));
        }
        durations.push(PlanDuration::new(peak, start, end));
        if end < HOURS_PER_DAY {
            durations.push(PlanDuration::new(base, end, HOURS_PER_DAY));
        }
        Self::new(durations)
    }

    /// Build a schedule from hour intervals, choosing each interval's mapping
    /// with `mapping_for(start, end)`.
    pub fn from_intervals<F>(intervals: &[(f64, f64)], mut mapping_for: F) -> ScheduleResult<Self>
    where
        F: FnMut(f64, f64) -> LaneMapping,
    {
        let durations = intervals
            .iter()
            .map(|&(start, end)| PlanDuration::new(mapping_for(start, end), start, end))
            .collect();
        Self::new(durations)
    }

    /// Read-only slice of all plans (sorted by start hour).
    pub fn durations(&self) -> &[PlanDuration] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// The plan covering `hour` (taken modulo 24).
    ///
    /// # Errors
    ///
    /// `HourNotCovered` if `hour` falls in a gap between intervals.
    pub fn search(&self, hour: f64) -> ScheduleResult<&PlanDuration> {
        let hour = hour.rem_euclid(HOURS_PER_DAY);
        // partition_point returns the first plan whose start is after `hour`.
        let idx = self.durations.partition_point(|d| d.hour_start <= hour);
        match idx.checked_sub(1).map(|i| &self.durations[i]) {
            Some(plan) if plan.contains(hour) => Ok(plan),
            _ => Err(ScheduleError::HourNotCovered(hour)),
        }
    }

    /// `true` if the intervals tile `[0, 24)` without gaps.
    pub fn covers_full_day(&self) -> bool {
        let Some(first) = self.durations.first() else {
            return false;
        };
        let contiguous = self
            .durations
            .windows(2)
            .all(|pair| pair[0].hour_end == pair[1].hour_start);
        let last_end = self.durations.last().map_or(0.0, |d| d.hour_end);
        first.hour_start == 0.0 && contiguous && last_end == HOURS_PER_DAY
    }

    /// Every lane referenced by any plan.
    pub fn lanes(&self) -> BTreeSet<LaneId> {
        self.durations
            .iter()
            .flat_map(|d| d.movement_allocation.keys().copied())
            .collect()
    }
}
