//! Unit tests for vl-schedule.

use vl_core::{Direction, LaneId, Movement, Turn};

use crate::{DaySchedule, LaneMapping, PlanDuration};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn mapping(turn: Turn) -> LaneMapping {
    LaneMapping::from([
        (LaneId(16), Movement::new(Direction::East, Turn::Straight)),
        (LaneId(18), Movement::new(Direction::East, turn)),
    ])
}

fn plan(start: f64, end: f64) -> PlanDuration {
    PlanDuration::new(mapping(Turn::Straight), start, end)
}

/// The seven-interval weekday schedule used at the pilot intersection.
fn weekday() -> DaySchedule {
    let bounds = [(0.0, 8.0), (8.0, 10.0), (10.0, 16.0), (16.0, 16.5), (16.5, 19.0), (19.0, 20.0), (20.0, 24.0)];
    DaySchedule::new(bounds.iter().map(|&(s, e)| plan(s, e)).collect()).unwrap()
}

// ── DaySchedule ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod day_schedule {
    use super::*;
    use crate::ScheduleError;

    #[test]
    fn search_finds_enclosing_interval() {
        let s = weekday();
        let hit = s.search(17.25).unwrap();
        assert_eq!((hit.hour_start, hit.hour_end), (16.5, 19.0));
    }

    #[test]
    fn search_at_boundaries_is_half_open() {
        let s = weekday();
        assert_eq!(s.search(0.0).unwrap().hour_start, 0.0);
        assert_eq!(s.search(16.5).unwrap().hour_start, 16.5);
        assert_eq!(s.search(19.0).unwrap().hour_start, 19.0);
        assert_eq!(s.search(23.99).unwrap().hour_start, 20.0);
    }

    #[test]
    fn search_wraps_past_midnight() {
        let s = weekday();
        assert_eq!(s.search(24.5).unwrap().hour_start, 0.0);
        assert_eq!(s.search(-1.0).unwrap().hour_start, 20.0);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let s = DaySchedule::new(vec![plan(12.0, 24.0), plan(0.0, 12.0)]).unwrap();
        assert_eq!(s.durations()[0].hour_start, 0.0);
        assert!(s.covers_full_day());
    }

    #[test]
    fn overlap_is_rejected() {
        let err = DaySchedule::new(vec![plan(0.0, 8.0), plan(8.0, 10.0), plan(9.0, 12.0)]).unwrap_err();
        assert!(matches!(err, ScheduleError::Overlap { first_start, second_start, .. }
            if first_start == 8.0 && second_start == 9.0));
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(DaySchedule::new(vec![plan(5.0, 5.0)]).is_err());
        assert!(DaySchedule::new(vec![plan(20.0, 25.0)]).is_err());
        assert!(matches!(DaySchedule::new(vec![]), Err(ScheduleError::Empty)));
    }

    #[test]
    fn gap_lookup_fails() {
        let s = DaySchedule::new(vec![plan(0.0, 8.0), plan(10.0, 24.0)]).unwrap();
        assert!(!s.covers_full_day());
        assert!(matches!(s.search(9.0), Err(ScheduleError::HourNotCovered(h)) if h == 9.0));
    }

    #[test]
    fn peak_split_builds_three_intervals() {
        let s = DaySchedule::peak_split(mapping(Turn::Straight), mapping(Turn::UTurn), (17.0, 20.0)).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.covers_full_day());
        let peak = s.search(18.0).unwrap();
        assert_eq!(peak.movement_allocation[&LaneId(18)].turn, Turn::UTurn);
        assert_eq!(s.search(21.0).unwrap().movement_allocation[&LaneId(18)].turn, Turn::Straight);
    }

    #[test]
    fn fixed_covers_day_and_lists_lanes() {
        let s = DaySchedule::fixed(mapping(Turn::Straight));
        assert!(s.covers_full_day());
        assert_eq!(s.lanes().into_iter().collect::<Vec<_>>(), vec![LaneId(16), LaneId(18)]);
    }

    #[test]
    fn from_intervals_uses_callback() {
        let s = DaySchedule::from_intervals(&[(0.0, 7.0), (7.0, 24.0)], |start, _| {
            if start < 7.0 { mapping(Turn::Straight) } else { mapping(Turn::UTurn) }
        })
        .unwrap();
        assert_eq!(s.search(8.0).unwrap().movement_allocation[&LaneId(18)].turn, Turn::UTurn);
    }

    #[test]
    fn movement_sorted_lanes_groups() {
        let m = LaneMapping::from([
            (LaneId(16), Movement::new(Direction::East, Turn::Straight)),
            (LaneId(17), Movement::new(Direction::East, Turn::Straight)),
            (LaneId(19), Movement::new(Direction::East, Turn::RightTurn)),
        ]);
        let sorted = crate::movement_sorted_lanes(&m);
        assert_eq!(sorted[&Movement::new(Direction::East, Turn::Straight)], vec![LaneId(16), LaneId(17)]);
        assert_eq!(sorted.len(), 2);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::load_schedule_reader;

    const CSV: &str = "\
hour_start,hour_end,lane_id,direction,turn\n\
0,17,16,east,straight\n\
0,17,19,east,rt\n\
17,20,16,east,straight\n\
17,20,19,3,right\n\
20,24,16,east,straight\n\
20,24,19,east,right_turn\n\
";

    #[test]
    fn loads_grouped_intervals() {
        let s = load_schedule_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.covers_full_day());
        let peak = s.search(18.0).unwrap();
        assert_eq!(peak.movement_allocation[&LaneId(19)], Movement::new(Direction::East, Turn::Right));
        assert_eq!(s.search(3.0).unwrap().movement_allocation[&LaneId(19)].turn, Turn::RightTurn);
    }

    #[test]
    fn bad_turn_is_parse_error() {
        let csv = "hour_start,hour_end,lane_id,direction,turn\n0,24,16,east,sideways\n";
        assert!(matches!(load_schedule_reader(Cursor::new(csv)), Err(crate::ScheduleError::Parse(_))));
    }

    #[test]
    fn duplicate_lane_in_interval_rejected() {
        let csv = "hour_start,hour_end,lane_id,direction,turn\n0,24,16,east,s\n0,24,16,east,l\n";
        assert!(load_schedule_reader(Cursor::new(csv)).is_err());
    }

    #[test]
    fn overlapping_rows_rejected() {
        let csv = "hour_start,hour_end,lane_id,direction,turn\n8,10,16,east,s\n9,12,16,east,s\n";
        assert!(matches!(load_schedule_reader(Cursor::new(csv)), Err(crate::ScheduleError::Overlap { .. })));
    }
}
