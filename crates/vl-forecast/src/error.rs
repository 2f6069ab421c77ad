use thiserror::Error;

use vl_core::{CoreError, LaneId};

use crate::DateType;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("bucket width {0} h does not divide the day evenly")]
    InvalidBucketWidth(f64),

    #[error("no history for date type {0}")]
    UnknownDateType(DateType),

    #[error("profile for {0} has not been averaged")]
    NotAveraged(LaneId),

    #[error("no history profile for {0}")]
    NoProfile(LaneId),

    #[error("history parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ForecastResult<T> = Result<T, ForecastError>;
