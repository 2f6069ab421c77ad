//! Unit tests for vl-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LaneId, SignId};

    #[test]
    fn ordering_and_raw_value() {
        assert!(LaneId(16) < LaneId(17));
        assert_eq!(SignId::from(3).get(), 3);
    }

    #[test]
    fn display() {
        assert_eq!(LaneId(19).to_string(), "LaneId(19)");
    }
}

#[cfg(test)]
mod movement {
    use crate::{Direction, Movement, Turn};

    #[test]
    fn opposite_directions() {
        assert_eq!(Direction::West.opposite(), Direction::East);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::South.opposite(), Direction::North);
        assert_eq!(Direction::North.opposite(), Direction::South);
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn right_turn_attributes_full_flow_to_both() {
        let parts: Vec<_> = Turn::RightTurn.decompose().split(600.0).collect();
        assert_eq!(parts, vec![(Turn::Right, 600.0), (Turn::UTurn, 600.0)]);
    }

    #[test]
    fn straight_composites_split_evenly() {
        let ls: Vec<_> = Turn::LeftStraight.decompose().split(500.0).collect();
        assert_eq!(ls, vec![(Turn::Left, 250.0), (Turn::Straight, 250.0)]);

        let rs: Vec<_> = Turn::RightStraight.decompose().split(500.0).collect();
        assert_eq!(rs, vec![(Turn::Right, 250.0), (Turn::Straight, 250.0)]);
    }

    #[test]
    fn basic_turns_decompose_to_themselves() {
        for turn in Turn::BASIC {
            let d = turn.decompose();
            assert_eq!(d.count(), 1);
            assert_eq!(d.turns, &[turn]);
            assert_eq!(d.share(0, 42.0), 42.0);
            assert!(!turn.is_composite());
        }
    }

    #[test]
    fn composite_counts() {
        assert_eq!(Turn::RightTurn.decompose().count(), 2);
        assert!(Turn::RightTurn.decompose().fractions.is_some());
        assert!(Turn::LeftStraight.decompose().fractions.is_none());
    }

    #[test]
    fn conflict_relation() {
        assert_eq!(Turn::Left.possible_conflict(), Some(Turn::Straight));
        assert_eq!(Turn::LeftStraight.possible_conflict(), Some(Turn::Straight));
        assert_eq!(Turn::Straight.possible_conflict(), Some(Turn::Left));
        assert_eq!(Turn::Right.possible_conflict(), None);
    }

    #[test]
    fn parse_turns_and_directions() {
        assert_eq!("rt".parse::<Turn>().unwrap(), Turn::RightTurn);
        assert_eq!("Straight".parse::<Turn>().unwrap(), Turn::Straight);
        assert_eq!("east".parse::<Direction>().unwrap(), Direction::East);
        assert!("sideways".parse::<Turn>().is_err());
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn movement_is_value_keyed() {
        use std::collections::HashMap;
        let mut m = HashMap::new();
        m.insert(Movement::new(Direction::East, Turn::Straight), 1);
        assert_eq!(m.get(&Movement::new(Direction::East, Turn::Straight)), Some(&1));
        assert_eq!(m.get(&Movement::new(Direction::West, Turn::Straight)), None);
    }
}

#[cfg(test)]
mod demand {
    use crate::{CoreError, GreenSplit, Turn, TurnDemand, design_saturation_flow, vehicle_mix_factor};

    fn demand(flow: f64) -> TurnDemand {
        let mut d = TurnDemand::new(Turn::Straight, 1600.0);
        d.update(flow, 0.0);
        d
    }

    #[test]
    fn saturation_formula() {
        let sat = demand(480.0).saturation_rate(0.3, 2.0).unwrap();
        assert!((sat - 0.5).abs() < 1e-12, "got {sat}");
    }

    #[test]
    fn zero_lanes_is_an_error() {
        let err = demand(100.0).saturation_rate(0.3, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::ZeroLaneCount { turn: Turn::Straight }));
    }

    #[test]
    fn out_of_range_split_is_an_error() {
        assert!(demand(100.0).saturation_rate(0.0, 1.0).is_err());
        assert!(demand(100.0).saturation_rate(1.5, 1.0).is_err());
    }

    #[test]
    fn monotone_in_flow_lanes_and_split() {
        let flows = [0.0, 100.0, 400.0, 900.0, 1600.0];
        for w in flows.windows(2) {
            let a = demand(w[0]).saturation_rate(0.4, 2.0).unwrap();
            let b = demand(w[1]).saturation_rate(0.4, 2.0).unwrap();
            assert!(a <= b);
        }
        let d = demand(700.0);
        let lanes = [0.5, 1.0, 1.5, 2.0, 3.0];
        for w in lanes.windows(2) {
            assert!(d.saturation_rate(0.4, w[0]).unwrap() >= d.saturation_rate(0.4, w[1]).unwrap());
        }
        let splits = [0.1, 0.3, 0.35, 0.8, 1.0];
        for w in splits.windows(2) {
            assert!(d.saturation_rate(w[0], 2.0).unwrap() >= d.saturation_rate(w[1], 2.0).unwrap());
        }
    }

    #[test]
    fn green_split_range_orders_bounds() {
        let g = GreenSplit::range(1.0, 52.0 / 150.0);
        assert_eq!(g.min(), 52.0 / 150.0);
        assert_eq!(g.max(), 1.0);
        assert!(g.is_range());
        let f = GreenSplit::from_timing(45.0, 150.0);
        assert_eq!(f.min(), f.max());
    }

    #[test]
    fn design_flows_and_mix() {
        assert_eq!(design_saturation_flow(Turn::Straight), Some(1600.0));
        assert_eq!(design_saturation_flow(Turn::UTurn), Some(900.0));
        assert_eq!(design_saturation_flow(Turn::RightTurn), None);
        assert!((vehicle_mix_factor(0.2) - 0.9).abs() < 1e-12);
        assert_eq!(vehicle_mix_factor(0.0), 1.0);
        let d = TurnDemand::with_design_capacity(Turn::Left, 0.9).unwrap().with_priority(1);
        assert!((d.capacity_per_lane_hour - 1170.0).abs() < 1e-9);
        assert_eq!(d.priority, Some(1));
    }
}

#[cfg(test)]
mod time {
    use chrono::NaiveDate;

    use crate::{CoreError, LocalClock, hourly_rate};

    #[test]
    fn hour_of_day_utc() {
        let clock = LocalClock::utc();
        assert_eq!(clock.hour_of_day(0), 0.0);
        assert_eq!(clock.hour_of_day(17 * 3600 + 900), 17.25);
        assert_eq!(clock.minute_of_day(86_400 + 61), 1);
    }

    #[test]
    fn offset_shifts_day() {
        let clock = LocalClock::new(8 * 3600).unwrap();
        // 20:00 UTC is 04:00 next day at UTC+8.
        assert_eq!(clock.hour_of_day(20 * 3600), 4.0);
        assert_eq!(clock.local_date(20 * 3600).unwrap(), NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
        assert_eq!(clock.to_string(), "UTC+08:00");
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let east = LocalClock::new(8 * 3600).unwrap();
        assert_eq!(east.secs_of_day(i64::MAX), 84_607);
        assert!(east.hour_of_day(i64::MAX) < 24.0);
        assert!(matches!(east.local_date(i64::MAX), Err(CoreError::InvalidTimestamp(i64::MAX))));

        let west = LocalClock::new(-8 * 3600).unwrap();
        assert_eq!(west.secs_of_day(i64::MIN), 1_792);
        assert!(matches!(west.local_date(i64::MIN), Err(CoreError::InvalidTimestamp(i64::MIN))));
    }

    #[test]
    fn invalid_offset_rejected() {
        assert!(LocalClock::new(90_000).is_err());
    }

    #[test]
    fn rate_conversion() {
        assert_eq!(hourly_rate(10.0, 60.0), Some(600.0));
        assert_eq!(hourly_rate(10.0, 0.0), None);
    }
}

#[cfg(test)]
mod route {
    use std::collections::BTreeMap;

    use crate::{Direction, LaneId, Movement, Turn, accumulate_movement_flow};

    #[test]
    fn right_turn_lane_is_halved_for_routes() {
        let flows = BTreeMap::from([
            (LaneId(16), vec![100.0, 200.0]),
            (LaneId(17), vec![50.0, 50.0]),
            (LaneId(19), vec![80.0, 40.0]),
            (LaneId(99), vec![1.0, 1.0]),
        ]);
        let lanes = BTreeMap::from([
            (LaneId(16), Movement::new(Direction::East, Turn::Straight)),
            (LaneId(17), Movement::new(Direction::East, Turn::Straight)),
            (LaneId(19), Movement::new(Direction::East, Turn::RightTurn)),
        ]);
        let out = accumulate_movement_flow(&flows, &lanes);
        assert_eq!(out[&Movement::new(Direction::East, Turn::Straight)], vec![150.0, 250.0]);
        assert_eq!(out[&Movement::new(Direction::East, Turn::Right)], vec![40.0, 20.0]);
        assert_eq!(out[&Movement::new(Direction::East, Turn::UTurn)], vec![40.0, 20.0]);
        assert_eq!(out.len(), 3);
    }
}
