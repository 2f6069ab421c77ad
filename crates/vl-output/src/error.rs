//! Error types for vl-output.

use thiserror::Error;

/// Errors that can occur when writing controller output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("history interval must be positive, got {0} s")]
    InvalidInterval(i64),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
