//! Lane × time flow matrix with O(lanes) segment costs.
//!
//! # Segment cost
//!
//! For the half-open column range `[a, b)`:
//!
//! ```text
//! sse_l = Σ x² - (Σ x)² / (b - a)        per lane: variance × length
//! cost  = sqrt(Σ_l sse_l²)               L2 norm across lanes
//! ```
//!
//! Both sums come from per-lane prefix arrays.

use crate::{SegmentError, SegmentResult};

#[derive(Clone, Debug)]
pub struct FlowMatrix {
    lanes:   usize,
    columns: usize,
    /// `lanes` rows of `columns + 1` running sums.
    sum:     Vec<f64>,
    sum_sq:  Vec<f64>,
}

impl FlowMatrix {
    /// Build from one row per lane.  All rows must have the same length.
    pub fn new(rows: &[Vec<f64>]) -> SegmentResult<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(SegmentError::EmptyMatrix);
        }

        let stride = columns + 1;
        let mut sum = vec![0.0; rows.len() * stride];
        let mut sum_sq = vec![0.0; rows.len() * stride];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(SegmentError::Ragged { row: r, expected: columns, found: row.len() });
            }
            let base = r * stride;
            for (c, &x) in row.iter().enumerate() {
                sum[base + c + 1] = sum[base + c] + x;
                sum_sq[base + c + 1] = sum_sq[base + c] + x * x;
            }
        }
        Ok(Self { lanes: rows.len(), columns, sum, sum_sq })
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Dispersion of columns `[start, end)`.  Empty ranges cost nothing.
    pub fn segment_cost(&self, start: usize, end: usize) -> f64 {
        if end <= start {
            return 0.0;
        }
        let n = (end - start) as f64;
        let stride = self.columns + 1;
        let squared: f64 = (0..self.lanes)
            .map(|r| {
                let base = r * stride;
                let s = self.sum[base + end] - self.sum[base + start];
                let sq = self.sum_sq[base + end] - self.sum_sq[base + start];
                let sse = (sq - s * s / n).max(0.0);
                sse * sse
            })
            .sum();
        squared.sqrt()
    }
}
