use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("flow matrix has no lanes or no time columns")]
    EmptyMatrix,

    #[error("lane row {row} has {found} columns, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("cannot cut {columns} columns into {k} segments")]
    PartitionCount { k: usize, columns: usize },
}

pub type SegmentResult<T> = Result<T, SegmentError>;
