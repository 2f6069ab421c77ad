use thiserror::Error;

use vl_core::{CoreError, Direction, Movement};
use vl_forecast::ForecastError;
use vl_lane::LaneError;
use vl_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("controller configuration error: {0}")]
    Config(String),

    #[error("no variance lanes configured")]
    NoVarianceLanes,

    #[error("two variance lanes control the {0} approach")]
    DuplicateDirection(Direction),

    #[error("schedule leaves hours of the day without a lane mapping")]
    IncompleteSchedule,

    #[error("schedule maps a lane to {0}, which its approach tracks no demand for")]
    UnservedMovement(Movement),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Lane(#[from] LaneError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ControlResult<T> = Result<T, ControlError>;

/// Failure to hand a snapshot to the outbound transport.
///
/// The controller logs these and carries on.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("transport error: {0}")]
    Transport(String),
}
