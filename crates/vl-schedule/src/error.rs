use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule intervals [{first_start}, {first_end}) and [{second_start}, {second_end}) overlap")]
    Overlap {
        first_start:  f64,
        first_end:    f64,
        second_start: f64,
        second_end:   f64,
    },

    #[error("invalid schedule interval [{start}, {end}): bounds must satisfy 0 <= start < end <= 24")]
    InvalidInterval { start: f64, end: f64 },

    #[error("no schedule interval covers hour {0}")]
    HourNotCovered(f64),

    #[error("schedule has no intervals")]
    Empty,

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
