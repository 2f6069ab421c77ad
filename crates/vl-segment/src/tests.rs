//! Unit tests for vl-segment.

use crate::FlowMatrix;

fn repeated(row: &[f64], lanes: usize) -> FlowMatrix {
    FlowMatrix::new(&vec![row.to_vec(); lanes]).unwrap()
}

/// Evening peak with a midday plateau: the sample series from the field.
const FIELD: [f64; 13] = [1.0, 1.0, 1.0, 600.0, 700.0, 800.0, 1400.0, 1700.0, 2.0, 2.0, 2.0, 2000.0, 2.0];

/// Four flat-ish regimes.
const REGIMES: [f64; 12] = [10.0, 12.0, 11.0, 300.0, 310.0, 305.0, 90.0, 95.0, 92.0, 600.0, 610.0, 605.0];

#[cfg(test)]
mod matrix {
    use super::*;
    use crate::SegmentError;

    #[test]
    fn flat_segments_cost_nothing() {
        let m = repeated(&[5.0, 5.0, 5.0, 9.0], 2);
        assert_eq!(m.segment_cost(0, 3), 0.0);
        assert_eq!(m.segment_cost(2, 2), 0.0);
    }

    #[test]
    fn cost_is_norm_of_lane_sse() {
        // Lane sse over [1, 3]: 2; over [2, 6]: 8.  Norm = sqrt(4 + 64).
        let m = FlowMatrix::new(&[vec![1.0, 3.0], vec![2.0, 6.0]]).unwrap();
        assert!((m.segment_cost(0, 2) - 68f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(FlowMatrix::new(&[]), Err(SegmentError::EmptyMatrix)));
        assert!(matches!(FlowMatrix::new(&[vec![]]), Err(SegmentError::EmptyMatrix)));
        assert!(matches!(
            FlowMatrix::new(&[vec![1.0, 2.0], vec![1.0]]),
            Err(SegmentError::Ragged { row: 1, expected: 2, found: 1 })
        ));
    }
}

#[cfg(test)]
mod partition {
    use super::*;
    use crate::{SegmentError, TimeSeriesPartitioner, breakpoints_to_hours, partition_acceleration};

    #[test]
    fn two_regimes_split_before_jump() {
        let mut row = vec![10.0; 5];
        row.extend([500.0; 7]);
        let m = repeated(&row, 3);
        let p = TimeSeriesPartitioner::new(&m).time_series_partition(2).unwrap();
        assert_eq!(p.breakpoints, vec![4]);
        assert!(p.cost.abs() < 1e-6);
    }

    #[test]
    fn single_segment_has_no_breakpoints() {
        let m = repeated(&FIELD, 3);
        let p = TimeSeriesPartitioner::new(&m).time_series_partition(1).unwrap();
        assert!(p.breakpoints.is_empty());
        assert_eq!(p.segments(), 1);
        assert!((p.cost - m.segment_cost(0, 13)).abs() < 1e-6);
    }

    #[test]
    fn four_way_field_partition() {
        let m = repeated(&FIELD, 3);
        let mut solver = TimeSeriesPartitioner::new(&m);
        assert_eq!(solver.time_series_partition(4).unwrap().breakpoints, vec![5, 7, 10]);
        // Lower layers stay memoised and consistent.
        let p3 = solver.time_series_partition(3).unwrap();
        assert_eq!(p3.breakpoints, vec![10, 11]);
    }

    #[test]
    fn cost_never_increases_with_k() {
        let m = FlowMatrix::new(&[REGIMES.to_vec(), REGIMES.iter().map(|x| x * 0.5).collect()]).unwrap();
        let mut solver = TimeSeriesPartitioner::new(&m);
        let costs: Vec<f64> = (1..=6).map(|k| solver.time_series_partition(k).unwrap().cost).collect();
        assert!(costs.windows(2).all(|w| w[1] <= w[0] + 1e-9), "{costs:?}");
    }

    #[test]
    fn k_out_of_range() {
        let m = repeated(&[1.0, 2.0, 3.0], 1);
        let mut solver = TimeSeriesPartitioner::new(&m);
        assert!(matches!(solver.time_series_partition(0), Err(SegmentError::PartitionCount { k: 0, .. })));
        assert!(solver.time_series_partition(4).is_err());
        assert_eq!(solver.time_series_partition(3).unwrap().breakpoints, vec![0, 1]);
    }

    #[test]
    fn elbow_on_field_series() {
        let m = repeated(&FIELD, 3);
        let (k, p) = partition_acceleration(&m, 10).unwrap();
        assert_eq!(k, 3);
        assert_eq!(p.breakpoints, vec![10, 11]);
    }

    #[test]
    fn elbow_on_regimes() {
        let m = FlowMatrix::new(&[REGIMES.to_vec(), REGIMES.iter().map(|x| x * 0.5).collect()]).unwrap();
        let (k, p) = partition_acceleration(&m, 10).unwrap();
        assert_eq!(k, 2);
        assert_eq!(p.breakpoints, vec![8]);
    }

    #[test]
    fn elbow_respects_caps() {
        let m = repeated(&FIELD, 3);
        assert_eq!(partition_acceleration(&m, 1).unwrap().0, 1);
        let short = repeated(&[1.0, 9.0], 1);
        let (k, p) = partition_acceleration(&short, 10).unwrap();
        assert_eq!((k, p.breakpoints.len()), (1, 0));
    }

    #[test]
    fn hours_from_breakpoints() {
        let hours = breakpoints_to_hours(&[7, 9, 15], 24, 1.0);
        assert_eq!(hours, vec![(0.0, 8.0), (8.0, 10.0), (10.0, 16.0), (16.0, 24.0)]);
        let half = breakpoints_to_hours(&[], 48, 0.5);
        assert_eq!(half, vec![(0.0, 24.0)]);
    }
}
