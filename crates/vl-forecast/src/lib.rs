//! `vl-forecast` — historical time-of-day flow profiles.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`calendar`] | `DateType`, `DateCalendar` (weekday/weekend + overrides)   |
//! | [`profile`]  | `HistoryLaneFlow` — one lane's buckets and predictor       |
//! | [`profiles`] | `HistoryProfiles` — all lanes, trained from `HistoryRow`s  |
//! | [`loader`]   | History CSV reader (`start,end,lane16,lane17,…`)           |
//! | [`error`]    | `ForecastError`, `ForecastResult<T>`                       |
//!
//! # Lifecycle
//!
//! Profiles are trained once from a historical corpus, averaged, and then
//! only read.  `HistoryProfiles` is `Sync`; wrap it in an `Arc` to share it
//! between predictors.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Averages lane profiles in parallel with Rayon.           |

pub mod calendar;
pub mod error;
pub mod loader;
pub mod profile;
pub mod profiles;


pub use calendar::{DateCalendar, DateType};
pub use error::{ForecastError, ForecastResult};
pub use loader::{HistoryRow, load_history_csv, load_history_reader};
pub use profile::{DEFAULT_RESTRICT_DIFF, HistoryLaneFlow};
pub use profiles::HistoryProfiles;
