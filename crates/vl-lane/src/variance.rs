//! The hysteretic lane-switch decision engine.
//!
//! # Green-split bounds
//!
//! A turn whose green split is a range is read at its *minimum* whenever the
//! engine asks "is this turn in trouble", and at its *maximum* when judging
//! a minor turn that currently holds the variable lane.  Every projection of
//! a post-switch state reads the bound that state itself would use.
//!
//! # Decision table
//!
//! | State | Trigger                                                  | Reject when                                      |
//! |-------|----------------------------------------------------------|--------------------------------------------------|
//! | major | minor over threshold, or `minor - major > abs_diff`      | `major' + guard > minor'` and `major' > major_th` |
//! | minor | major over extreme, or `major - minor > abs_diff`        | `minor' > major' + recover_diff`                 |
//! | minor | (untriggered) `minor' <= minor_clear`                    | never                                            |
//!
//! Primed values are projected under the layout the other state would use.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use vl_core::{CoreError, Direction, GreenSplit, Turn, TurnDemand};

use crate::{LaneAllocation, LaneError, LaneResult, SwitchThresholds, TurnAllocation, Vms};

/// Outcome of evaluating one sign.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwitchDecision {
    /// No pressure to switch.
    Hold,
    /// A switch was triggered but the post-switch projection failed.
    Rejected,
    /// Flip the sign.
    Switch,
}

/// One window's observation of a turn, possibly composite.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DemandUpdate {
    pub turn:         Turn,
    pub flow_hour:    f64,
    pub queue_length: f64,
}

impl DemandUpdate {
    pub fn new(turn: Turn, flow_hour: f64, queue_length: f64) -> Self {
        Self { turn, flow_hour, queue_length }
    }
}

type DemandTable = BTreeMap<Turn, TurnDemand>;

// ── VarianceLane ──────────────────────────────────────────────────────────────

/// Demand, thresholds, lane layouts and signs of one controlled approach.
///
/// A window is applied in two steps: [`plan`](Self::plan) computes every
/// sign's decision against the new demand without touching the approach,
/// and [`commit`](Self::commit) stores the demand and flips the signs.
/// Callers driving several approaches plan all of them before committing
/// any, so a failure leaves every approach as it was.
///
/// Constructed with [`VarianceLaneBuilder`].
#[derive(Debug)]
pub struct VarianceLane {
    direction:            Direction,
    signs:                Vec<Vms>,
    demand:               DemandTable,
    saturation_threshold: BTreeMap<Turn, f64>,
    allocation:           LaneAllocation,
    green_split:          BTreeMap<Turn, GreenSplit>,
    thresholds:           SwitchThresholds,
}

impl VarianceLane {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn signs(&self) -> &[Vms] {
        &self.signs
    }

    pub fn allocation(&self) -> &LaneAllocation {
        &self.allocation
    }

    pub fn thresholds(&self) -> &SwitchThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: SwitchThresholds) {
        self.thresholds = thresholds;
    }

    pub fn demand(&self, turn: Turn) -> Option<&TurnDemand> {
        self.demand.get(&turn)
    }

    /// Basic turns this approach tracks demand for.
    pub fn turns(&self) -> impl Iterator<Item = Turn> + '_ {
        self.demand.keys().copied()
    }

    /// Replace the observed flow and queue of `turn`.
    ///
    /// Composite turns are decomposed first, so a right-or-U-turn lane sets
    /// both constituents to its full flow.  Turns this approach does not
    /// track are skipped.
    pub fn update_demand(&mut self, turn: Turn, flow_hour: f64, queue_length: f64) {
        apply_update(self.direction, &mut self.demand, DemandUpdate::new(turn, flow_hour, queue_length));
    }

    /// Decide whether `sign` should flip under the current demand.
    ///
    /// # Errors
    ///
    /// Only on a misconfigured approach: a layout that leaves a sign turn
    /// without lanes, or an out-of-range green split.  The builder rejects
    /// both, so a built approach does not fail here.
    pub fn evaluate(&self, sign: &Vms) -> LaneResult<SwitchDecision> {
        self.evaluate_against(&self.demand, sign)
    }

    /// Decisions for every sign, in order, as if `updates` had been applied.
    ///
    /// The approach itself is left untouched.
    pub fn plan(&self, updates: &[DemandUpdate]) -> LaneResult<Vec<SwitchDecision>> {
        let mut demand = self.demand.clone();
        for &update in updates {
            apply_update(self.direction, &mut demand, update);
        }
        self.signs.iter().map(|sign| self.evaluate_against(&demand, sign)).collect()
    }

    /// Store `updates` and carry out `decisions` produced by
    /// [`plan`](Self::plan) for the same updates.
    ///
    /// Returns `true` if any sign changed state.
    pub fn commit(&mut self, updates: &[DemandUpdate], decisions: &[SwitchDecision]) -> bool {
        for &update in updates {
            apply_update(self.direction, &mut self.demand, update);
        }
        let mut changed = false;
        for (sign, decision) in self.signs.iter_mut().zip(decisions) {
            match decision {
                SwitchDecision::Switch => {
                    let from = sign.current_turn();
                    sign.change_state();
                    info!(
                        direction = %self.direction, sign = %sign.id(),
                        from = %from, to = %sign.current_turn(), "variable lane switched"
                    );
                    changed = true;
                }
                SwitchDecision::Rejected => warn!(
                    direction = %self.direction, sign = %sign.id(),
                    current = %sign.current_turn(), "switch rejected by post-switch projection"
                ),
                SwitchDecision::Hold => {}
            }
        }
        changed
    }

    /// Evaluate every sign on this approach and flip those that should.
    ///
    /// Returns `true` if any sign changed state.  On error no sign flips.
    pub fn adjust(&mut self) -> LaneResult<bool> {
        let decisions = self.plan(&[])?;
        Ok(self.commit(&[], &decisions))
    }

    fn evaluate_against(&self, demand: &DemandTable, sign: &Vms) -> LaneResult<SwitchDecision> {
        let (major, minor) = (sign.major_turn(), sign.minor_turn());
        let major_split = self.split(major)?;
        let minor_split = self.split(minor)?;
        let t = &self.thresholds;
        let sat = |turn, split, layout: &TurnAllocation| self.saturation(demand, turn, split, layout);

        if sign.is_major() {
            let layout = self.allocation.ensure_turn_allocation(major, Some(minor))?;
            let major_sat = sat(major, major_split.min(), &layout)?;
            let minor_sat = sat(minor, minor_split.min(), &layout)?;
            debug!(direction = %self.direction, sign = %sign.id(), major_sat, minor_sat, "major state");

            let triggered = minor_sat > self.threshold(minor)?
                || minor_sat - major_sat > t.absolute_saturation_diff;
            if !triggered {
                return Ok(SwitchDecision::Hold);
            }

            let after = self.allocation.ensure_turn_allocation(minor, Some(major))?;
            let major_adjust = sat(major, major_split.min(), &after)?;
            let minor_adjust = sat(minor, minor_split.max(), &after)?;
            debug!(direction = %self.direction, sign = %sign.id(), major_adjust, minor_adjust, "projected minor state");

            let overloads_major = major_adjust + t.switch_guard_margin > minor_adjust
                && major_adjust > self.threshold(major)?;
            Ok(if overloads_major { SwitchDecision::Rejected } else { SwitchDecision::Switch })
        } else {
            let layout = self.allocation.ensure_turn_allocation(minor, Some(major))?;
            let recovery = self.allocation.ensure_turn_allocation(major, Some(minor))?;
            let major_sat = sat(major, major_split.min(), &layout)?;
            let minor_sat = sat(minor, minor_split.max(), &layout)?;
            let major_adjust = sat(major, major_split.min(), &recovery)?;
            let minor_adjust = sat(minor, minor_split.min(), &recovery)?;
            debug!(
                direction = %self.direction, sign = %sign.id(),
                major_sat, minor_sat, major_adjust, minor_adjust, "minor state"
            );

            let triggered = major_sat > t.major_extreme_saturation
                || major_sat - minor_sat > t.absolute_saturation_diff;
            Ok(if triggered {
                if minor_adjust > major_adjust + t.recover_saturation_diff {
                    SwitchDecision::Rejected
                } else {
                    SwitchDecision::Switch
                }
            } else if minor_adjust <= t.minor_clear_saturation {
                SwitchDecision::Switch
            } else {
                SwitchDecision::Hold
            })
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    fn saturation(
        &self,
        demand: &DemandTable,
        turn:   Turn,
        split:  f64,
        layout: &TurnAllocation,
    ) -> LaneResult<f64> {
        let demand = demand
            .get(&turn)
            .ok_or(LaneError::MissingDemand { direction: self.direction, turn })?;
        let lanes = layout.get(&turn).copied().unwrap_or(0.0);
        Ok(demand.saturation_rate(split, lanes)?)
    }

    fn threshold(&self, turn: Turn) -> LaneResult<f64> {
        self.saturation_threshold
            .get(&turn)
            .copied()
            .ok_or(LaneError::MissingThreshold { direction: self.direction, turn })
    }

    fn split(&self, turn: Turn) -> LaneResult<GreenSplit> {
        self.green_split
            .get(&turn)
            .copied()
            .ok_or(LaneError::MissingGreenSplit { direction: self.direction, turn })
    }
}

fn apply_update(direction: Direction, demand: &mut DemandTable, update: DemandUpdate) {
    let parts = update.turn.decompose();
    for (i, &basic) in parts.turns.iter().enumerate() {
        match demand.get_mut(&basic) {
            Some(d) => d.update(parts.share(i, update.flow_hour), parts.share(i, update.queue_length)),
            None => debug!(direction = %direction, turn = %basic, "no demand record; update skipped"),
        }
    }
}

// ── VarianceLaneBuilder ───────────────────────────────────────────────────────

/// Fluent builder for [`VarianceLane`].
///
/// # Example
///
/// ```rust,ignore
/// let west = VarianceLaneBuilder::new(Direction::West, allocation)
///     .demand(TurnDemand::new(Turn::Straight, 1440.0))
///     .demand(TurnDemand::new(Turn::Left, 1170.0))
///     .saturation_threshold(Turn::Straight, 0.75)
///     .saturation_threshold(Turn::Left, 0.8)
///     .green_split(Turn::Straight, GreenSplit::from_timing(45.0, 150.0))
///     .green_split(Turn::Left, GreenSplit::from_timing(52.0, 150.0))
///     .sign(vms)
///     .build()?;
/// ```
pub struct VarianceLaneBuilder {
    direction:            Direction,
    allocation:           LaneAllocation,
    signs:                Vec<Vms>,
    demand:               BTreeMap<Turn, TurnDemand>,
    saturation_threshold: BTreeMap<Turn, f64>,
    green_split:          BTreeMap<Turn, GreenSplit>,
    thresholds:           SwitchThresholds,
}

impl VarianceLaneBuilder {
    pub fn new(direction: Direction, allocation: LaneAllocation) -> Self {
        Self {
            direction,
            allocation,
            signs:                Vec::new(),
            demand:               BTreeMap::new(),
            saturation_threshold: BTreeMap::new(),
            green_split:          BTreeMap::new(),
            thresholds:           SwitchThresholds::default(),
        }
    }

    /// Track demand for `demand.turn`.  A later call for the same turn
    /// replaces the earlier one.
    pub fn demand(mut self, demand: TurnDemand) -> Self {
        self.demand.insert(demand.turn, demand);
        self
    }

    pub fn saturation_threshold(mut self, turn: Turn, threshold: f64) -> Self {
        self.saturation_threshold.insert(turn, threshold);
        self
    }

    pub fn green_split(mut self, turn: Turn, split: impl Into<GreenSplit>) -> Self {
        self.green_split.insert(turn, split.into());
        self
    }

    pub fn sign(mut self, sign: Vms) -> Self {
        self.signs.push(sign);
        self
    }

    /// Override the default hysteresis band.
    pub fn thresholds(mut self, thresholds: SwitchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Check that every turn a sign can show has demand with a positive
    /// capacity, a saturation threshold, a green split in (0, 1], and at
    /// least some lanes under every candidate layout, then build.
    pub fn build(self) -> LaneResult<VarianceLane> {
        let direction = self.direction;
        for sign in &self.signs {
            for turn in [sign.major_turn(), sign.minor_turn()] {
                if !self.demand.contains_key(&turn) {
                    return Err(LaneError::MissingDemand { direction, turn });
                }
                if !self.saturation_threshold.contains_key(&turn) {
                    return Err(LaneError::MissingThreshold { direction, turn });
                }
                let Some(split) = self.green_split.get(&turn) else {
                    return Err(LaneError::MissingGreenSplit { direction, turn });
                };
                if !(split.min() > 0.0 && split.max() <= 1.0) {
                    let bad = if split.min() <= 0.0 { split.min() } else { split.max() };
                    return Err(CoreError::InvalidGreenSplit { turn, split: bad }.into());
                }
                if let Some(d) = self.demand.get(&turn).filter(|d| d.capacity_per_lane_hour <= 0.0) {
                    return Err(CoreError::InvalidCapacity { turn, capacity: d.capacity_per_lane_hour }.into());
                }
                let unserved = self
                    .allocation
                    .candidates()
                    .any(|layout| layout.get(&turn).copied().unwrap_or(0.0) <= 0.0);
                if unserved {
                    return Err(LaneError::UnservedSignTurn { direction, turn });
                }
            }
        }
        Ok(VarianceLane {
            direction,
            signs:                self.signs,
            demand:               self.demand,
            saturation_threshold: self.saturation_threshold,
            allocation:           self.allocation,
            green_split:          self.green_split,
            thresholds:           self.thresholds,
        })
    }
}
