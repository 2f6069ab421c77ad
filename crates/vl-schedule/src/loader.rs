//! CSV schedule loader.
//!
//! # CSV format
//!
//! One row per (interval, lane).  Rows sharing the same `hour_start` /
//! `hour_end` pair form one [`PlanDuration`].
//!
//! ```csv
//! hour_start,hour_end,lane_id,direction,turn
//! 0,17,16,east,straight
//! 0,17,19,east,right_turn
//! 17,20,18,east,u_turn
//! 17,20,19,east,right
//! ```
//!
//! `direction` accepts names or wire codes (`east`, `3`); `turn` accepts
//! names or lane-marking shorthand (`right_turn`, `rt`).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use vl_core::{Direction, LaneId, Movement, Turn};

use crate::plan::{DaySchedule, LaneMapping, PlanDuration};
use crate::{ScheduleError, ScheduleResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScheduleRecord {
    hour_start: f64,
    hour_end:   f64,
    lane_id:    u32,
    direction:  String,
    turn:       String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`DaySchedule`] from a CSV file.
pub fn load_schedule_csv(path: &Path) -> ScheduleResult<DaySchedule> {
    let file = std::fs::File::open(path)?;
    load_schedule_reader(file)
}

/// Like [`load_schedule_csv`] but accepts any `Read` source.
pub fn load_schedule_reader<R: Read>(reader: R) -> ScheduleResult<DaySchedule> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    // Interval order of first appearance; a day has a handful of intervals so
    // a linear scan beats hashing float keys.
    let mut intervals: Vec<((f64, f64), LaneMapping)> = Vec::new();

    for result in csv_reader.deserialize::<ScheduleRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let movement = Movement::new(
            parse_field::<Direction>(&row.direction)?,
            parse_field::<Turn>(&row.turn)?,
        );
        let key = (row.hour_start, row.hour_end);

        let idx = match intervals.iter().position(|(k, _)| *k == key) {
            Some(i) => i,
            None => {
                intervals.push((key, LaneMapping::new()));
                intervals.len() - 1
            }
        };
        if intervals[idx].1.insert(LaneId(row.lane_id), movement).is_some() {
            return Err(ScheduleError::Parse(format!(
                "lane {} listed twice for interval [{}, {})",
                row.lane_id, row.hour_start, row.hour_end
            )));
        }
    }

    let durations = intervals
        .into_iter()
        .map(|((start, end), mapping)| PlanDuration::new(mapping, start, end))
        .collect();
    DaySchedule::new(durations)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_field<T>(s: &str) -> ScheduleResult<T>
where
    T: std::str::FromStr<Err = vl_core::CoreError>,
{
    s.parse::<T>().map_err(|e| ScheduleError::Parse(e.to_string()))
}
