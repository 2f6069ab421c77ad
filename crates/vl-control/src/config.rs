//! Controller configuration.
//!
//! Intersection geometry (lanes, layouts, signs) is built in code; only the
//! tunables live here.  Every field has a default, so `{}` is a valid
//! configuration file.
//!
//! ```json
//! {
//!   "update_interval_secs": 1800,
//!   "utc_offset_secs": 28800,
//!   "restrict_diff": 200,
//!   "thresholds": { "absolute_saturation_diff": 0.3, "major_extreme_saturation": 0.95 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use vl_core::LocalClock;
use vl_forecast::DEFAULT_RESTRICT_DIFF;
use vl_lane::SwitchThresholds;

use crate::ControlResult;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Length of one aggregation window.
    pub update_interval_secs: i64,
    /// Local time offset east of UTC.
    pub utc_offset_secs:      i32,
    /// Forecast guardrail, veh/h.
    pub restrict_diff:        f64,
    /// Hysteresis band applied to every approach.
    pub thresholds:           SwitchThresholds,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 1800,
            utc_offset_secs:      0,
            restrict_diff:        DEFAULT_RESTRICT_DIFF,
            thresholds:           SwitchThresholds::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(s: &str) -> ControlResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load_json(path: &Path) -> ControlResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn clock(&self) -> ControlResult<LocalClock> {
        Ok(LocalClock::new(self.utc_offset_secs)?)
    }
}
