//! Core error type.
//!
//! Downstream crates wrap `CoreError` as one variant of their own enums via
//! `#[from]`, so saturation and parsing failures propagate with `?`.

use thiserror::Error;

use crate::Turn;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("turn {turn} has no lanes allocated; saturation is undefined")]
    ZeroLaneCount { turn: Turn },

    #[error("green split {split} for turn {turn} must lie in (0, 1]")]
    InvalidGreenSplit { turn: Turn, split: f64 },

    #[error("turn {turn} has non-positive design capacity {capacity}")]
    InvalidCapacity { turn: Turn, capacity: f64 },

    #[error("unknown turn {0:?}")]
    UnknownTurn(String),

    #[error("unknown direction {0:?}")]
    UnknownDirection(String),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("UTC offset {0}s is out of range")]
    InvalidUtcOffset(i32),
}

/// Shorthand result type for `vl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
