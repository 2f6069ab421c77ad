//! One lane's time-of-day profile.
//!
//! # Buckets
//!
//! The day is cut into `24 / bucket_hours` buckets.  A sample taken at local
//! hour `h` lands in bucket `round(h / bucket_hours)` (wrapping at
//! midnight), so bucket `i` is centred on hour `i * bucket_hours`.
//! Between centres the profile is linearly interpolated.
//!
//! # Prediction
//!
//! `hour` passed to [`HistoryLaneFlow::predict_one_step`] is the moment the
//! observed window closed.  With a window of one bucket:
//!
//! ```text
//! history_next    = profile(hour)                    window about to start
//! history_current = profile(hour - bucket)           window just observed
//! history_prev    = profile(hour - 2 * bucket)       window before that
//! ```
//!
//! The live trend is blended with the historical one by a belief factor
//! `exp(-|real_diff - hist_diff| / |hist_diff|)`.  Low divergence weights the
//! prediction toward history; high divergence toward the live signal.

use std::collections::BTreeMap;

use vl_core::LaneId;

use crate::{DateType, ForecastError, ForecastResult};

/// Largest allowed gap between a prediction and `history_next` before the
/// prediction is pulled toward history.
pub const DEFAULT_RESTRICT_DIFF: f64 = 200.0;

/// Weight kept by the prediction when a guardrail fires.
const RESTRICT_WEIGHT: f64 = 0.7;

const HOURS_PER_DAY: f64 = 24.0;

#[derive(Clone, Debug)]
pub struct HistoryLaneFlow {
    lane:         LaneId,
    bucket_hours: f64,
    bucket_count: usize,
    samples:      BTreeMap<DateType, Vec<Vec<f64>>>,
    averages:     BTreeMap<DateType, Vec<f64>>,
}

impl HistoryLaneFlow {
    /// # Errors
    ///
    /// `InvalidBucketWidth` unless `bucket_hours` divides 24 h evenly.
    pub fn new(lane: LaneId, bucket_hours: f64) -> ForecastResult<Self> {
        let count = HOURS_PER_DAY / bucket_hours;
        if !(bucket_hours > 0.0) || (count - count.round()).abs() > 1e-9 {
            return Err(ForecastError::InvalidBucketWidth(bucket_hours));
        }
        Ok(Self {
            lane,
            bucket_hours,
            bucket_count: count.round() as usize,
            samples:      BTreeMap::new(),
            averages:     BTreeMap::new(),
        })
    }

    pub fn lane(&self) -> LaneId {
        self.lane
    }

    pub fn bucket_hours(&self) -> f64 {
        self.bucket_hours
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Bucket a sample taken at local `hour` belongs to.
    pub fn bucket_index(&self, hour: f64) -> usize {
        let idx = (hour.rem_euclid(HOURS_PER_DAY) / self.bucket_hours).round() as usize;
        idx % self.bucket_count
    }

    /// Record one training sample.
    pub fn append_flow(&mut self, date_type: DateType, hour: f64, flow: f64) {
        let idx = self.bucket_index(hour);
        let count = self.bucket_count;
        self.samples
            .entry(date_type)
            .or_insert_with(|| vec![Vec::new(); count])[idx]
            .push(flow);
    }

    /// Collapse samples to per-bucket means.  Buckets without samples
    /// average to zero.  Samples are kept, so more can be appended and the
    /// profile re-averaged.
    pub fn calculate_avg_flow(&mut self) {
        self.averages = self
            .samples
            .iter()
            .map(|(&date_type, buckets)| {
                let means = buckets
                    .iter()
                    .map(|b| if b.is_empty() { 0.0 } else { b.iter().sum::<f64>() / b.len() as f64 })
                    .collect();
                (date_type, means)
            })
            .collect();
    }

    pub fn is_averaged(&self) -> bool {
        !self.averages.is_empty()
    }

    /// Per-bucket averages for `date_type`, if trained.
    pub fn averages(&self, date_type: DateType) -> Option<&[f64]> {
        self.averages.get(&date_type).map(Vec::as_slice)
    }

    /// Interpolated historical flow at local `hour`.
    pub fn history_value(&self, date_type: DateType, hour: f64) -> ForecastResult<f64> {
        if !self.is_averaged() {
            return Err(ForecastError::NotAveraged(self.lane));
        }
        let avg = self
            .averages
            .get(&date_type)
            .ok_or(ForecastError::UnknownDateType(date_type))?;

        let pos = hour.rem_euclid(HOURS_PER_DAY) / self.bucket_hours;
        let lower = pos.floor();
        let frac = pos - lower;
        let i = lower as usize % self.bucket_count;
        let j = (i + 1) % self.bucket_count;
        Ok((1.0 - frac) * avg[i] + frac * avg[j])
    }

    /// Forecast the flow of the window starting at `hour`.
    ///
    /// `current_flow` is the window that just closed and `last_step_flow`
    /// the one before it, if known.
    pub fn predict_one_step(
        &self,
        hour:           f64,
        current_flow:   f64,
        date_type:      DateType,
        last_step_flow: Option<f64>,
        restrict_diff:  f64,
    ) -> ForecastResult<f64> {
        let step = self.bucket_hours;
        let history_next = self.history_value(date_type, hour)?;
        let history_current = self.history_value(date_type, hour - step)?;

        let step_change = match last_step_flow {
            Some(last) => {
                let history_prev = self.history_value(date_type, hour - 2.0 * step)?;
                let real_diff = current_flow - last;
                let hist_diff = history_current - history_prev;
                let b = belief(real_diff, hist_diff);
                b * (history_next - history_current) + (1.0 - b) * real_diff
            }
            None => history_next - history_current,
        };

        let mut predicted = current_flow + step_change;
        if predicted <= 0.0 {
            predicted = RESTRICT_WEIGHT * history_next;
        }
        if (predicted - history_next).abs() > restrict_diff {
            predicted = RESTRICT_WEIGHT * predicted + (1.0 - RESTRICT_WEIGHT) * history_next;
        }
        Ok(predicted)
    }
}

/// Trust placed in the historical trend given the observed one.
///
/// A flat history (`hist_diff == 0`) is trusted fully only when the live
/// signal is flat too.
pub(crate) fn belief(real_diff: f64, hist_diff: f64) -> f64 {
    if hist_diff == 0.0 {
        if real_diff == 0.0 { 1.0 } else { 0.0 }
    } else {
        (-(real_diff - hist_diff).abs() / hist_diff.abs()).exp()
    }
}
