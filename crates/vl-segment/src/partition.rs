//! Optimal `k`-way partition of the time axis.
//!
//! # Recurrence
//!
//! ```text
//! cost(1, end) = segment_cost(0, end)
//! cost(k, end) = min_{k-1 <= j < end}  cost(k-1, j) + segment_cost(j, end)
//! ```
//!
//! Layers are filled bottom-up and kept, so asking for a larger `k` later
//! only computes the missing layers.  The earliest `j` wins ties.  A split
//! at `j` is reported as breakpoint `j - 1`: the last column of the earlier
//! segment.

use tracing::debug;

use crate::{FlowMatrix, SegmentError, SegmentResult};

/// Total cost and breakpoints of one partition.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub cost:        f64,
    /// Last column index of every segment but the final one, ascending.
    pub breakpoints: Vec<usize>,
}

impl Partition {
    pub fn segments(&self) -> usize {
        self.breakpoints.len() + 1
    }
}

/// One layer of the memo: best cost and split for every prefix length.
struct Layer {
    cost:  Vec<f64>,
    split: Vec<usize>,
}

pub struct TimeSeriesPartitioner<'m> {
    matrix: &'m FlowMatrix,
    /// `layers[k - 1]` holds `cost(k, ·)`.
    layers: Vec<Layer>,
}

impl<'m> TimeSeriesPartitioner<'m> {
    pub fn new(matrix: &'m FlowMatrix) -> Self {
        let n = matrix.columns();
        let base = Layer {
            cost:  (0..=n).map(|end| matrix.segment_cost(0, end)).collect(),
            split: vec![0; n + 1],
        };
        Self { matrix, layers: vec![base] }
    }

    /// Minimum-cost partition of all columns into `k` segments.
    ///
    /// # Errors
    ///
    /// `PartitionCount` unless `1 <= k <= columns`.
    pub fn time_series_partition(&mut self, k: usize) -> SegmentResult<Partition> {
        let n = self.matrix.columns();
        if k == 0 || k > n {
            return Err(SegmentError::PartitionCount { k, columns: n });
        }
        while self.layers.len() < k {
            self.push_layer();
        }

        let cost = self.layers[k - 1].cost[n];
        let mut breakpoints = Vec::with_capacity(k - 1);
        let mut end = n;
        for layer in self.layers[1..k].iter().rev() {
            let j = layer.split[end];
            breakpoints.push(j - 1);
            end = j;
        }
        breakpoints.reverse();
        Ok(Partition { cost, breakpoints })
    }

    fn push_layer(&mut self) {
        let k = self.layers.len() + 1;
        let n = self.matrix.columns();
        let prev = &self.layers[k - 2];
        let mut cost = vec![f64::INFINITY; n + 1];
        let mut split = vec![0; n + 1];

        for end in k..=n {
            for j in (k - 1)..end {
                let c = prev.cost[j] + self.matrix.segment_cost(j, end);
                if c < cost[end] {
                    cost[end] = c;
                    split[end] = j;
                }
            }
        }
        self.layers.push(Layer { cost, split });
    }
}

/// Choose the segment count by the elbow of the cost curve.
///
/// Sweeps `k = 2, 3, …` computing the second difference
/// `cost(k+1) - 2 cost(k) + cost(k-1)` and stops once it drops below the
/// previous one, returning `k - 1` and its partition.  `k` never exceeds
/// `max_partition` or `columns - 1`.
pub fn partition_acceleration(
    matrix:        &FlowMatrix,
    max_partition: usize,
) -> SegmentResult<(usize, Partition)> {
    let cap = max_partition.min(matrix.columns().saturating_sub(1));
    let mut solver = TimeSeriesPartitioner::new(matrix);
    let mut last = solver.time_series_partition(1)?;
    if cap < 2 {
        return Ok((1, last));
    }

    let mut this = solver.time_series_partition(2)?;
    let mut last_acceleration: Option<f64> = None;
    let mut k = 2;
    loop {
        if k == cap + 1 {
            return Ok((k - 1, last));
        }
        let next = solver.time_series_partition(k + 1)?;
        let acceleration = next.cost - 2.0 * this.cost + last.cost;
        debug!(k, acceleration, cost = this.cost, "partition sweep");
        if last_acceleration.is_some_and(|prev| acceleration < prev) {
            return Ok((k - 1, last));
        }
        last_acceleration = Some(acceleration);
        last = this;
        this = next;
        k += 1;
    }
}

/// Convert breakpoints over `columns` equal-width columns of
/// `column_hours` each (the first starting at midnight) into contiguous
/// hour intervals.
pub fn breakpoints_to_hours(breakpoints: &[usize], columns: usize, column_hours: f64) -> Vec<(f64, f64)> {
    let mut bounds = Vec::with_capacity(breakpoints.len() + 2);
    bounds.push(0.0);
    bounds.extend(breakpoints.iter().map(|&b| (b + 1) as f64 * column_hours));
    bounds.push(columns as f64 * column_hours);
    bounds.windows(2).map(|w| (w[0], w[1])).collect()
}
