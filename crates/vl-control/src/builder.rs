//! Fluent builder for constructing a [`Controller`].

use std::collections::BTreeMap;

use vl_lane::VarianceLane;

use crate::{
    ControlError, ControlResult, Controller, ControllerConfig, LaneFlowStorage, ScheduleStrategy,
};

/// Fluent builder for [`Controller<S>`].
///
/// # Required inputs
///
/// - [`ControllerConfig`] — window length, UTC offset, hysteresis band
/// - `S: ScheduleStrategy` — which mapping applies when, and flow correction
/// - at least one [`VarianceLane`] via `.variance_lane(v)`
///
/// # Example
///
/// ```rust,ignore
/// let mut controller = ControllerBuilder::new(config, StaticSchedule::fixed(mapping))
///     .variance_lane(east)
///     .variance_lane(west)
///     .build()?;
/// controller.ingest(&record, &mut NoopSink)?;
/// ```
pub struct ControllerBuilder<S: ScheduleStrategy> {
    config:         ControllerConfig,
    strategy:       S,
    variance_lanes: Vec<VarianceLane>,
}

impl<S: ScheduleStrategy> ControllerBuilder<S> {
    pub fn new(config: ControllerConfig, strategy: S) -> Self {
        Self { config, strategy, variance_lanes: Vec::new() }
    }

    pub fn variance_lane(mut self, lane: VarianceLane) -> Self {
        self.variance_lanes.push(lane);
        self
    }

    /// Validate the configuration against the schedule and build.
    ///
    /// The config's thresholds replace each variance lane's own, and the
    /// strategy is handed the config through
    /// [`ScheduleStrategy::configure`].
    ///
    /// # Errors
    ///
    /// - `Config` for a non-positive window length.
    /// - `IncompleteSchedule` if some hour of the day has no interval.
    /// - `NoVarianceLanes` / `DuplicateDirection`.
    /// - `UnservedMovement` if some schedule interval maps a lane on a
    ///   controlled approach to a movement none of whose basic turns that
    ///   approach tracks.
    pub fn build(self) -> ControlResult<Controller<S>> {
        if self.config.update_interval_secs <= 0 {
            return Err(ControlError::Config(format!(
                "update_interval_secs must be positive, got {}",
                self.config.update_interval_secs
            )));
        }
        let clock = self.config.clock()?;
        if !self.strategy.schedule().covers_full_day() {
            return Err(ControlError::IncompleteSchedule);
        }
        let mut strategy = self.strategy;
        strategy.configure(&self.config);

        if self.variance_lanes.is_empty() {
            return Err(ControlError::NoVarianceLanes);
        }
        let mut variance_lanes = BTreeMap::new();
        for mut lane in self.variance_lanes {
            let direction = lane.direction();
            lane.set_thresholds(self.config.thresholds);
            if variance_lanes.insert(direction, lane).is_some() {
                return Err(ControlError::DuplicateDirection(direction));
            }
        }

        for plan in strategy.schedule().durations() {
            for movement in plan.movement_allocation.values() {
                let Some(lane) = variance_lanes.get(&movement.direction) else { continue };
                let tracked = movement
                    .turn
                    .decompose()
                    .turns
                    .iter()
                    .any(|&t| lane.demand(t).is_some());
                if !tracked {
                    return Err(ControlError::UnservedMovement(*movement));
                }
            }
        }

        Ok(Controller {
            known_lanes: strategy.lanes(),
            config: self.config,
            clock,
            strategy,
            variance_lanes,
            storage: LaneFlowStorage::new(),
            window_start: None,
            last_close: None,
        })
    }
}
