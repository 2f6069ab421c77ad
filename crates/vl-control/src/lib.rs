//! `vl-control` — the control loop.
//!
//! # Window cycle
//!
//! ```text
//! on every TrafficFlowRecord:
//!   ① Cache   — convert each known lane's count to veh/h and buffer it
//!               (the first record only anchors the window).
//!   ② Close   — once `update_interval_secs` have passed since the anchor:
//!                 mapping  ← strategy.mapping(hour)
//!                 lane     ← mean of buffered samples (0 if none),
//!                            then strategy.correct_flow
//!                 movement ← Σ lanes serving it
//!                 VarianceLane::plan for every approach, then
//!                 clear buffers and VarianceLane::commit each plan
//!                 (any error leaves the window open and unchanged)
//!   ③ Publish — flow snapshot every window, sign snapshot on change.
//!               Publish errors are logged and dropped.
//! ```
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`telemetry`]  | Inbound records and outbound snapshots (serde)           |
//! | [`storage`]    | `LaneFlowStorage` — per-window buffers and last window   |
//! | [`strategy`]   | `ScheduleStrategy`, `StaticSchedule`, `DynamicSchedule`  |
//! | [`sink`]       | `PublishSink`, `NoopSink`, `RecordingSink`, `JsonLinesSink` |
//! | [`config`]     | `ControllerConfig`                                       |
//! | [`controller`] | `Controller`, `WindowReport`                             |
//! | [`builder`]    | `ControllerBuilder`                                      |
//! | [`error`]      | `ControlError`, `PublishError`                           |

pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod sink;
pub mod storage;
pub mod strategy;
pub mod telemetry;


pub use builder::ControllerBuilder;
pub use config::ControllerConfig;
pub use controller::{Controller, WindowReport};
pub use error::{ControlError, ControlResult, PublishError};
pub use sink::{JsonLinesSink, NoopSink, PublishSink, RecordingSink};
pub use storage::{LaneFlowStorage, LaneWindow};
pub use strategy::{DynamicSchedule, ScheduleStrategy, StaticSchedule, WindowContext};
pub use telemetry::{
    FlowSnapshot, LaneFlowData, LaneQueue, LaneVolume, QueueRecord, QueueSample, SignSnapshot,
    TrafficFlowRecord,
};
