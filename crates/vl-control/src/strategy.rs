//! Schedule-and-correction strategies.
//!
//! A strategy answers two questions when a window closes: which
//! lane → movement mapping is in force, and what flow to attribute to each
//! lane given what was observed.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use vl_core::{LaneId, LocalClock};
use vl_forecast::{DEFAULT_RESTRICT_DIFF, DateCalendar, HistoryProfiles, HistoryRow};
use vl_schedule::{DaySchedule, LaneMapping};

use crate::{ControlResult, ControllerConfig};

/// The window being closed.
#[derive(Copy, Clone, Debug)]
pub struct WindowContext {
    /// Timestamp of the record that closed the window, Unix seconds.
    pub timestamp:     i64,
    /// Local hour of `timestamp`.
    pub hour:          f64,
    /// Seconds since the window opened.
    pub duration_secs: i64,
    pub clock:         LocalClock,
}

pub trait ScheduleStrategy {
    /// Every time-of-day mapping this strategy can return.
    fn schedule(&self) -> &DaySchedule;

    fn name(&self) -> &'static str;

    /// Adopt controller-wide tunables.  Called once while the controller is
    /// built.
    fn configure(&mut self, _config: &ControllerConfig) {}

    /// The mapping in force when `ctx` closes.
    fn mapping(&self, ctx: &WindowContext) -> ControlResult<&LaneMapping> {
        Ok(&self.schedule().search(ctx.hour)?.movement_allocation)
    }

    /// Flow to attribute to `lane` given the window mean `observed` and the
    /// previous window's mean.  Defaults to the observation.
    fn correct_flow(
        &self,
        _ctx:      &WindowContext,
        _lane:     LaneId,
        observed:  f64,
        _previous: Option<f64>,
    ) -> f64 {
        observed
    }

    /// Lanes that telemetry is accepted for.
    fn lanes(&self) -> BTreeSet<LaneId> {
        self.schedule().lanes()
    }
}

// ── StaticSchedule ────────────────────────────────────────────────────────────

/// A fixed mapping, or a peak / off-peak pair.  Observed flow is used as is.
#[derive(Clone, Debug)]
pub struct StaticSchedule {
    schedule: DaySchedule,
}

impl StaticSchedule {
    pub fn fixed(mapping: LaneMapping) -> Self {
        Self { schedule: DaySchedule::fixed(mapping) }
    }

    /// `peak` during `[start, end)` local hours, `base` otherwise.
    pub fn peak(base: LaneMapping, peak: LaneMapping, peak_hours: (f64, f64)) -> ControlResult<Self> {
        Ok(Self { schedule: DaySchedule::peak_split(base, peak, peak_hours)? })
    }
}

impl ScheduleStrategy for StaticSchedule {
    fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// ── DynamicSchedule ───────────────────────────────────────────────────────────

/// A full-day schedule whose lane flows are passed through the history
/// forecaster before they reach the decision engine.
///
/// When a lane has no usable profile the observation is used unchanged.
/// The guardrail starts at [`DEFAULT_RESTRICT_DIFF`] and is replaced by
/// `ControllerConfig::restrict_diff` when the controller is built.
#[derive(Clone, Debug)]
pub struct DynamicSchedule {
    schedule:      DaySchedule,
    profiles:      Arc<HistoryProfiles>,
    calendar:      DateCalendar,
    restrict_diff: f64,
}

impl DynamicSchedule {
    pub fn new(schedule: DaySchedule, profiles: Arc<HistoryProfiles>, calendar: DateCalendar) -> Self {
        Self { schedule, profiles, calendar, restrict_diff: DEFAULT_RESTRICT_DIFF }
    }

    /// Train profiles from `history` and wrap them.
    pub fn train(
        schedule:     DaySchedule,
        history:      &[HistoryRow],
        calendar:     DateCalendar,
        clock:        &LocalClock,
        bucket_hours: f64,
    ) -> ControlResult<Self> {
        let profiles = HistoryProfiles::train(history, &calendar, clock, bucket_hours)?;
        Ok(Self::new(schedule, Arc::new(profiles), calendar))
    }

    /// Forecast guardrail in force, veh/h.
    pub fn restrict_diff(&self) -> f64 {
        self.restrict_diff
    }

    pub fn profiles(&self) -> &Arc<HistoryProfiles> {
        &self.profiles
    }
}

impl ScheduleStrategy for DynamicSchedule {
    fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn configure(&mut self, config: &ControllerConfig) {
        self.restrict_diff = config.restrict_diff;
    }

    fn correct_flow(
        &self,
        ctx:      &WindowContext,
        lane:     LaneId,
        observed: f64,
        previous: Option<f64>,
    ) -> f64 {
        let predicted = self
            .calendar
            .date_type_at(&ctx.clock, ctx.timestamp)
            .and_then(|date_type| {
                self.profiles
                    .predict(lane, ctx.hour, observed, date_type, previous, self.restrict_diff)
            });
        match predicted {
            Ok(flow) => flow,
            Err(e) => {
                debug!(lane = %lane, error = %e, "forecast unavailable; using observed flow");
                observed
            }
        }
    }
}
