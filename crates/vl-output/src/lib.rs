//! `vl-output` — file output for the variable-lane controller.
//!
//! | Type               | Files created                                     |
//! |--------------------|---------------------------------------------------|
//! | [`CsvSink`]        | `lane_flows.csv`, `sign_changes.csv`              |
//! | [`HistoryRecorder`]| a `start,end,lane<id>…` history file (see [`write_history_csv`]) |
//!
//! `CsvSink` is a [`vl_control::PublishSink`], so it plugs straight into
//! `Controller::ingest`.  `HistoryRecorder` turns the same telemetry stream
//! into the training corpus `vl-forecast` reads back.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vl_output::{CsvSink, HistoryRecorder, write_history_csv};
//!
//! let mut sink = CsvSink::new(Path::new("./output"))?;
//! let mut recorder = HistoryRecorder::new(1800)?;
//! for record in telemetry {
//!     recorder.record(&record);
//!     controller.ingest(&record, &mut sink)?;
//! }
//! sink.finish()?;
//! write_history_csv(&recorder.finish(), Path::new("./output/history.csv"))?;
//! ```

pub mod csv;
pub mod error;
pub mod recorder;


pub use csv::CsvSink;
pub use error::{OutputError, OutputResult};
pub use recorder::{HistoryRecorder, write_history_csv, write_history_writer};
