//! Per-lane profiles trained from a history corpus.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, info};

use vl_core::{LaneId, LocalClock};

use crate::{DateCalendar, DateType, ForecastError, ForecastResult, HistoryLaneFlow, HistoryRow};

/// Trained profiles for every lane seen in the history.
#[derive(Clone, Debug)]
pub struct HistoryProfiles {
    bucket_hours: f64,
    lanes:        BTreeMap<LaneId, HistoryLaneFlow>,
}

impl HistoryProfiles {
    /// An empty set of profiles with `bucket_hours` wide buckets.
    pub fn new(bucket_hours: f64) -> ForecastResult<Self> {
        HistoryLaneFlow::new(LaneId(0), bucket_hours)?;
        Ok(Self { bucket_hours, lanes: BTreeMap::new() })
    }

    /// Bucket, classify and average `rows` in one pass.
    ///
    /// Each row is placed by its window start in local time.
    pub fn train(
        rows:         &[HistoryRow],
        calendar:     &DateCalendar,
        clock:        &LocalClock,
        bucket_hours: f64,
    ) -> ForecastResult<Self> {
        let mut profiles = Self::new(bucket_hours)?;
        for row in rows {
            profiles.append_row(row, calendar, clock)?;
        }
        profiles.finalize();
        info!(
            rows = rows.len(),
            lanes = profiles.lanes.len(),
            bucket_hours, "history profiles trained"
        );
        Ok(profiles)
    }

    /// Add one row's samples without re-averaging.
    pub fn append_row(
        &mut self,
        row:      &HistoryRow,
        calendar: &DateCalendar,
        clock:    &LocalClock,
    ) -> ForecastResult<()> {
        let date_type = calendar.date_type_at(clock, row.start)?;
        let hour = clock.hour_of_day(row.start);
        for (&lane, &flow) in &row.flows {
            let profile = match self.lanes.entry(lane) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    e.insert(HistoryLaneFlow::new(lane, self.bucket_hours)?)
                }
            };
            profile.append_flow(date_type, hour, flow);
        }
        Ok(())
    }

    /// Average every lane's buckets.
    pub fn finalize(&mut self) {
        #[cfg(not(feature = "parallel"))]
        self.lanes.values_mut().for_each(HistoryLaneFlow::calculate_avg_flow);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.lanes.par_iter_mut().for_each(|(_, p)| p.calculate_avg_flow());
        }
    }

    pub fn bucket_hours(&self) -> f64 {
        self.bucket_hours
    }

    pub fn lane(&self, lane: LaneId) -> Option<&HistoryLaneFlow> {
        self.lanes.get(&lane)
    }

    pub fn lanes(&self) -> impl Iterator<Item = LaneId> + '_ {
        self.lanes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// [`HistoryLaneFlow::predict_one_step`] for `lane`.
    ///
    /// # Errors
    ///
    /// `NoProfile` if the lane never appeared in the history.
    pub fn predict(
        &self,
        lane:           LaneId,
        hour:           f64,
        current_flow:   f64,
        date_type:      DateType,
        last_step_flow: Option<f64>,
        restrict_diff:  f64,
    ) -> ForecastResult<f64> {
        let profile = self.lanes.get(&lane).ok_or(ForecastError::NoProfile(lane))?;
        let predicted =
            profile.predict_one_step(hour, current_flow, date_type, last_step_flow, restrict_diff)?;
        debug!(lane = %lane, hour, current_flow, predicted, "one-step forecast");
        Ok(predicted)
    }

    /// The lane × bucket matrix of averages for `date_type`, rows in lane
    /// order.  Lanes without that date type are skipped.
    pub fn flow_matrix(&self, date_type: DateType) -> (Vec<LaneId>, Vec<Vec<f64>>) {
        self.lanes
            .iter()
            .filter_map(|(&lane, p)| p.averages(date_type).map(|avg| (lane, avg.to_vec())))
            .unzip()
    }
}
