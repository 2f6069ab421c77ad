//! The `Controller` and its window loop.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use vl_core::{Direction, LaneId, LocalClock, Movement, Turn, hourly_rate};
use vl_lane::{DemandUpdate, VarianceLane};

use crate::{
    ControlResult, ControllerConfig, FlowSnapshot, LaneFlowData, LaneFlowStorage, PublishSink,
    QueueRecord, ScheduleStrategy, SignSnapshot, TrafficFlowRecord, WindowContext,
};

/// What happened when a window closed.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowReport {
    pub timestamp:     i64,
    pub hour:          f64,
    /// Flow fed to the decision engine, per movement, veh/h.
    pub movement_flow: BTreeMap<Movement, f64>,
    /// `true` if any sign flipped.
    pub changed:       bool,
}

/// Drives one intersection's variance lanes from a telemetry stream.
///
/// Records must arrive in timestamp order; timestamps come from the
/// telemetry, so replaying a log reproduces the same decisions.
///
/// Create via [`ControllerBuilder`][crate::ControllerBuilder].
pub struct Controller<S: ScheduleStrategy> {
    pub(crate) config:         ControllerConfig,
    pub(crate) clock:          LocalClock,
    pub(crate) strategy:       S,
    pub(crate) variance_lanes: BTreeMap<Direction, VarianceLane>,
    pub(crate) known_lanes:    BTreeSet<LaneId>,
    pub(crate) storage:        LaneFlowStorage,
    /// Timestamp that opened the current window.
    pub(crate) window_start:   Option<i64>,
    /// Timestamp that closed the last window.
    pub(crate) last_close:     Option<i64>,
}

impl<S: ScheduleStrategy> Controller<S> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Feed one detector cycle.  Returns a report when the record closes a
    /// window.
    ///
    /// # Errors
    ///
    /// Only configuration errors surface here, such as an hour no schedule
    /// interval covers.  The window then stays open and no approach
    /// changes.  Unknown lanes and publish failures are logged and skipped.
    pub fn ingest<P: PublishSink + ?Sized>(
        &mut self,
        record: &TrafficFlowRecord,
        sink:   &mut P,
    ) -> ControlResult<Option<WindowReport>> {
        let now = record.cycle_start_time;
        let anchor = *self.window_start.get_or_insert(now);
        self.cache_flow(record);

        if now - anchor < self.config.update_interval_secs {
            return Ok(None);
        }
        let report = self.close_window(now, now - anchor)?;
        self.window_start = Some(now);
        self.last_close = Some(now);
        self.publish(report.changed, sink);
        Ok(Some(report))
    }

    /// Buffer queue observations for the open window.
    pub fn ingest_queue(&mut self, record: &QueueRecord) {
        for q in &record.lanes {
            let lane = LaneId(q.lane_no);
            if self.known_lanes.contains(&lane) {
                self.storage.push_queue(lane, q.queue);
            } else {
                debug!(lane = %lane, "queue sample for unmapped lane ignored");
            }
        }
    }

    /// Lane flow and queue of the last closed window.
    pub fn current_allocation_snapshot(&self) -> FlowSnapshot {
        let lane_data = self
            .storage
            .last_window()
            .iter()
            .map(|(lane, w)| LaneFlowData {
                lane_id:      lane.get(),
                flow:         w.flow.round() as i64,
                queue_length: w.queue_length,
                queue_num:    w.queue_num.round() as u32,
            })
            .collect();
        FlowSnapshot {
            timestamp: self.snapshot_time(),
            duration:  self.config.update_interval_secs,
            lane_data,
        }
    }

    /// Rendered display of every sign.
    pub fn current_sign_snapshot(&self) -> SignSnapshot {
        let lane_allocations = self
            .variance_lanes
            .values()
            .flat_map(|v| v.signs().iter().flat_map(|s| s.render()))
            .collect();
        SignSnapshot {
            timestamp: self.snapshot_time(),
            duration:  self.config.update_interval_secs,
            lane_allocations,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn variance_lane(&self, direction: Direction) -> Option<&VarianceLane> {
        self.variance_lanes.get(&direction)
    }

    pub fn variance_lanes(&self) -> impl Iterator<Item = &VarianceLane> {
        self.variance_lanes.values()
    }

    pub fn window_start(&self) -> Option<i64> {
        self.window_start
    }

    pub fn storage(&self) -> &LaneFlowStorage {
        &self.storage
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn cache_flow(&mut self, record: &TrafficFlowRecord) {
        let Some(scale) = hourly_rate(1.0, record.cycle_time) else {
            debug!(timestamp = record.cycle_start_time, cycle_time = record.cycle_time, "record without a cycle length ignored");
            return;
        };
        for sample in &record.lanes {
            let lane = LaneId(sample.lane_no);
            if self.known_lanes.contains(&lane) {
                self.storage.push_flow(lane, f64::from(sample.volume) * scale);
            } else {
                debug!(lane = %lane, "flow sample for unmapped lane ignored");
            }
        }
    }

    fn close_window(&mut self, now: i64, duration_secs: i64) -> ControlResult<WindowReport> {
        let ctx = WindowContext {
            timestamp: now,
            hour: self.clock.hour_of_day(now),
            duration_secs,
            clock: self.clock,
        };
        let mapping = self.strategy.mapping(&ctx)?;
        let windows = self.storage.aggregate(mapping.keys());

        // Per movement: total flow and total queue over the lanes serving it.
        let mut movement_flow: BTreeMap<Movement, f64> = BTreeMap::new();
        let mut movement_queue: BTreeMap<Movement, f64> = BTreeMap::new();
        for (lane, &movement) in mapping {
            let Some(w) = windows.get(lane) else { continue };
            let flow = self.strategy.correct_flow(&ctx, *lane, w.flow, w.previous_flow);
            *movement_flow.entry(movement).or_default() += flow;
            *movement_queue.entry(movement).or_default() += w.queue_length;
        }

        // Per approach and basic turn.  Turns with no serving lane this
        // window are reset to zero.
        let mut turn_demand: BTreeMap<(Direction, Turn), (f64, f64)> = BTreeMap::new();
        for (movement, &flow) in &movement_flow {
            let queue = movement_queue.get(movement).copied().unwrap_or(0.0);
            let parts = movement.turn.decompose();
            for (i, &turn) in parts.turns.iter().enumerate() {
                let entry = turn_demand.entry((movement.direction, turn)).or_default();
                entry.0 += parts.share(i, flow);
                entry.1 += parts.share(i, queue);
            }
        }

        // Decide every approach before touching any of them, so an error
        // leaves buffers, demand and signs as they were.
        let mut plans = Vec::with_capacity(self.variance_lanes.len());
        for (&direction, lane) in &self.variance_lanes {
            let updates: Vec<DemandUpdate> = lane
                .turns()
                .map(|turn| {
                    let (flow, queue) = turn_demand.get(&(direction, turn)).copied().unwrap_or_default();
                    DemandUpdate::new(turn, flow, queue)
                })
                .collect();
            let decisions = lane.plan(&updates)?;
            plans.push((direction, updates, decisions));
        }

        self.storage.commit(windows);
        let mut changed = false;
        for (direction, updates, decisions) in plans {
            if let Some(lane) = self.variance_lanes.get_mut(&direction) {
                changed |= lane.commit(&updates, &decisions);
            }
        }

        info!(
            timestamp = now,
            hour = ctx.hour,
            strategy = self.strategy.name(),
            movements = movement_flow.len(),
            changed,
            "window closed"
        );
        Ok(WindowReport { timestamp: now, hour: ctx.hour, movement_flow, changed })
    }

    fn publish<P: PublishSink + ?Sized>(&self, changed: bool, sink: &mut P) {
        if let Err(e) = sink.publish_flow(&self.current_allocation_snapshot()) {
            warn!(error = %e, "lane flow snapshot not published");
        }
        if changed {
            if let Err(e) = sink.publish_signs(&self.current_sign_snapshot()) {
                warn!(error = %e, "sign snapshot not published");
            }
        }
    }

    fn snapshot_time(&self) -> i64 {
        self.last_close.or(self.window_start).unwrap_or(0)
    }
}
