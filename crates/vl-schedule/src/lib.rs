//! `vl-schedule` — time-of-day lane-to-movement schedules.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`plan`]    | `LaneMapping`, `PlanDuration`, `DaySchedule`          |
//! | [`loader`]  | `load_schedule_csv`, `load_schedule_reader`           |
//! | [`error`]   | `ScheduleError`, `ScheduleResult<T>`                  |
//!
//! # Day model (summary)
//!
//! A `DaySchedule` is a list of half-open hour intervals `[start, end)`
//! sorted by start.  Intervals never overlap; construction fails otherwise.
//! Looking up an hour that no interval covers is an error, so a schedule
//! used at runtime should tile the whole `[0, 24)` day.
//!
//! ```text
//! idx  = first interval whose start > hour
//! plan = intervals[idx - 1]   if hour < intervals[idx - 1].end
//! ```

pub mod error;
pub mod loader;
pub mod plan;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_schedule_csv, load_schedule_reader};
pub use plan::{DaySchedule, LaneMapping, PlanDuration, movement_sorted_lanes};
