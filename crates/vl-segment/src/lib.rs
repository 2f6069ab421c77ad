//! `vl-segment` — offline time-series segmentation.
//!
//! Given a lane × time matrix of historical flow, find the `k` contiguous
//! time segments that minimise within-segment dispersion, and pick `k`
//! automatically at the point of diminishing returns.  The resulting
//! breakpoints become day-schedule boundaries.
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`matrix`]    | `FlowMatrix` — prefix sums and `segment_cost`             |
//! | [`partition`] | `TimeSeriesPartitioner`, `Partition`, `partition_acceleration`, `breakpoints_to_hours` |
//! | [`error`]     | `SegmentError`, `SegmentResult<T>`                        |

pub mod error;
pub mod matrix;
pub mod partition;

#[cfg(test)]
mod tests;

pub use error::{SegmentError, SegmentResult};
pub use matrix::FlowMatrix;
pub use partition::{Partition, TimeSeriesPartitioner, breakpoints_to_hours, partition_acceleration};
