//! Unit tests for vl-lane.

use vl_core::{Direction, GreenSplit, LaneId, SignId, Turn, TurnDemand};

use crate::{
    DemandUpdate, LaneAllocation, LaneTurnRenderer, SignRecord, SwitchDecision, TurnAllocation,
    VarianceLane, VarianceLaneBuilder, Vms,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn alloc(pairs: &[(Turn, f64)]) -> TurnAllocation {
    pairs.iter().copied().collect()
}

/// East approach: three straight lanes, one of them shareable with U-turns,
/// plus a right-or-U-turn lane.
fn east_allocation() -> LaneAllocation {
    LaneAllocation::new(
        alloc(&[(Turn::Straight, 2.0), (Turn::UTurn, 0.0), (Turn::Right, 0.0)]),
        vec![
            alloc(&[(Turn::Straight, 1.0), (Turn::UTurn, 0.5), (Turn::Right, 1.0)]),
            alloc(&[(Turn::Straight, 0.0), (Turn::UTurn, 1.0), (Turn::Right, 1.0)]),
        ],
    )
    .unwrap()
}

/// West approach: a left lane plus three straight lanes, one reversible.
/// Straight-favoring layout is {S:3, L:1}; left-favoring is {S:2, L:2}.
fn west_allocation() -> LaneAllocation {
    LaneAllocation::new(
        alloc(&[(Turn::Straight, 2.0), (Turn::Left, 1.0)]),
        vec![
            alloc(&[(Turn::Straight, 1.0), (Turn::Left, 0.0)]),
            alloc(&[(Turn::Straight, 0.0), (Turn::Left, 1.0)]),
        ],
    )
    .unwrap()
}

fn west_sign(initial: Turn) -> Vms {
    let renderer = LaneTurnRenderer::new(Direction::West)
        .lane(Turn::Straight, LaneId(31), 2)
        .lane(Turn::Left, LaneId(31), 1);
    Vms::new(SignId(2), initial, Turn::Straight, Turn::Left, renderer).unwrap()
}

/// Straight capacity 1440 veh/h/lane at 45/150 green, left 1170 at 52/150.
fn west(initial: Turn) -> VarianceLane {
    VarianceLaneBuilder::new(Direction::West, west_allocation())
        .demand(TurnDemand::new(Turn::Straight, 1440.0))
        .demand(TurnDemand::new(Turn::Left, 1170.0))
        .saturation_threshold(Turn::Straight, 0.75)
        .saturation_threshold(Turn::Left, 0.8)
        .green_split(Turn::Straight, GreenSplit::from_timing(45.0, 150.0))
        .green_split(Turn::Left, GreenSplit::from_timing(52.0, 150.0))
        .sign(west_sign(initial))
        .build()
        .unwrap()
}

fn feed(lane: &mut VarianceLane, straight: f64, left: f64) {
    lane.update_demand(Turn::Straight, straight, 0.0);
    lane.update_demand(Turn::Left, left, 0.0);
}

// ── LaneAllocation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod allocation {
    use super::*;
    use crate::{LaneError, PriorityWindow};

    #[test]
    fn uturn_priority_with_right_tiebreak() {
        let got = east_allocation().ensure_turn_allocation(Turn::UTurn, Some(Turn::Right)).unwrap();
        assert_eq!(got, alloc(&[(Turn::Straight, 2.0), (Turn::UTurn, 1.0), (Turn::Right, 1.0)]));
    }

    #[test]
    fn straight_priority_picks_first_delta() {
        let got = east_allocation().ensure_turn_allocation(Turn::Straight, None).unwrap();
        assert_eq!(got[&Turn::Straight], 3.0);
        assert_eq!(got[&Turn::UTurn], 0.5);
    }

    #[test]
    fn minor_tiebreak_within_priority_group() {
        let a = LaneAllocation::new(
            alloc(&[(Turn::Straight, 2.0)]),
            vec![
                alloc(&[(Turn::Left, 1.0)]),
                alloc(&[(Turn::Left, 1.0), (Turn::Right, 1.0)]),
                alloc(&[(Turn::Left, 1.0), (Turn::Right, 0.5)]),
            ],
        )
        .unwrap();
        let got = a.ensure_turn_allocation(Turn::Straight, Some(Turn::Right)).unwrap();
        assert_eq!(got[&Turn::Right], 1.0);
    }

    #[test]
    fn empty_table_rejected() {
        let err = LaneAllocation::new(alloc(&[(Turn::Straight, 2.0)]), vec![]).unwrap_err();
        assert!(matches!(err, LaneError::EmptyFlexibleTable));
    }

    #[test]
    fn absent_turns_rejected() {
        let a = west_allocation();
        assert!(matches!(
            a.ensure_turn_allocation(Turn::UTurn, None),
            Err(LaneError::TurnNotAllocated(Turn::UTurn))
        ));
        assert!(matches!(
            a.ensure_turn_allocation(Turn::Straight, Some(Turn::Right)),
            Err(LaneError::TurnNotAllocated(Turn::Right))
        ));
    }

    #[test]
    fn priority_table_lookup() {
        let a = east_allocation().with_priority_table(vec![
            PriorityWindow::new(Turn::Straight, 0.0, 17.0),
            PriorityWindow::new(Turn::UTurn, 17.0, 20.0),
        ]);
        assert_eq!(a.get_turn_sorted_lane_dynamic(18.0).unwrap()[&Turn::UTurn], 1.0);
        assert_eq!(a.get_turn_sorted_lane_dynamic(9.0).unwrap()[&Turn::Straight], 3.0);
        assert!(matches!(a.get_turn_sorted_lane_dynamic(21.0), Err(LaneError::NoPriorityWindow(h)) if h == 21.0));
    }
}

// ── Vms ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sign {
    use serde_json::json;

    use super::*;
    use crate::LaneError;

    #[test]
    fn toggles_between_major_and_minor() {
        let mut s = west_sign(Turn::Straight);
        assert!(s.is_major() && !s.is_minor());
        s.change_state();
        assert_eq!(s.current_turn(), Turn::Left);
        assert!(s.is_minor());
        s.change_state();
        assert!(s.is_major());
    }

    #[test]
    fn initial_state_must_be_major_or_minor() {
        let r = |_: SignId, _: Turn| -> Vec<SignRecord> { Vec::new() };
        let err = Vms::new(SignId(1), Turn::Right, Turn::Straight, Turn::Left, r).unwrap_err();
        assert!(matches!(err, LaneError::InvalidSignState { turn: Turn::Right, .. }));
        assert!(Vms::new(SignId(1), Turn::Left, Turn::Left, Turn::Left, r).is_err());
    }

    #[test]
    fn table_renderer_records() {
        let mut s = west_sign(Turn::Straight);
        assert_eq!(
            s.render(),
            vec![json!({"vmsId": 2, "laneId": 31, "direction": 1, "movement": 2})]
        );
        s.change_state();
        assert_eq!(s.render()[0]["movement"], 1);
    }

    #[test]
    fn closure_renderer() {
        let r = |sign: SignId, turn: Turn| vec![json!({ "sign": sign.get(), "shows": turn.as_str() })];
        let s = Vms::new(SignId(7), Turn::Right, Turn::Straight, Turn::Right, r).unwrap();
        assert_eq!(s.render(), vec![json!({"sign": 7, "shows": "right"})]);
    }
}

// ── VarianceLane ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod variance {
    use super::*;
    use crate::{LaneError, SwitchThresholds};
    use vl_core::CoreError;

    #[test]
    fn light_demand_holds_major() {
        let mut w = west(Turn::Straight);
        feed(&mut w, 400.0, 150.0);
        assert_eq!(w.evaluate(&w.signs()[0]).unwrap(), SwitchDecision::Hold);
        assert!(!w.adjust().unwrap());
    }

    #[test]
    fn minor_overload_switches_to_minor() {
        let mut w = west(Turn::Straight);
        // Left saturation 330 / (1170 * 1 * 52/150) ≈ 0.81 > 0.8.
        feed(&mut w, 400.0, 330.0);
        assert!(w.adjust().unwrap());
        assert_eq!(w.signs()[0].current_turn(), Turn::Left);
    }

    #[test]
    fn switch_rejected_when_it_would_overload_major() {
        let mut w = west(Turn::Straight);
        // Straight after switching: 700 / (1440 * 2 * 0.3) ≈ 0.81 > 0.75.
        feed(&mut w, 700.0, 400.0);
        assert_eq!(w.evaluate(&w.signs()[0]).unwrap(), SwitchDecision::Rejected);
        assert!(!w.adjust().unwrap());
        assert!(w.signs()[0].is_major());
    }

    #[test]
    fn no_thrash_around_threshold() {
        let mut w = west(Turn::Straight);
        let mut flips = 0;
        for (i, left) in [330.0, 320.0, 330.0, 320.0, 330.0, 320.0].into_iter().enumerate() {
            feed(&mut w, 400.0, left);
            if w.adjust().unwrap() {
                flips += 1;
            }
            assert!(w.signs()[0].is_minor(), "window {i}");
        }
        assert_eq!(flips, 1);
    }

    #[test]
    fn settled_state_is_idempotent() {
        let mut w = west(Turn::Straight);
        feed(&mut w, 400.0, 330.0);
        assert!(w.adjust().unwrap());
        assert!(!w.adjust().unwrap());
        assert!(!w.adjust().unwrap());
        assert!(w.signs()[0].is_minor());
    }

    #[test]
    fn cleared_minor_returns_to_major() {
        let mut w = west(Turn::Left);
        feed(&mut w, 400.0, 100.0);
        assert!(w.adjust().unwrap());
        assert!(w.signs()[0].is_major());
    }

    #[test]
    fn opportunistic_recovery_without_major_pressure() {
        let mut w = west(Turn::Left);
        // Straight 200 / 864 ≈ 0.23, left 100 / 811 ≈ 0.12: no trigger, but
        // left under the straight layout is 100 / 405.6 ≈ 0.25 <= 0.3.
        feed(&mut w, 200.0, 100.0);
        assert_eq!(w.evaluate(&w.signs()[0]).unwrap(), SwitchDecision::Switch);
    }

    #[test]
    fn return_rejected_when_minor_would_overload() {
        let mut w = west(Turn::Left);
        // Straight 900 / 864 > 0.95 triggers, but left under the straight
        // layout (450 / 405.6 ≈ 1.11) exceeds straight (0.69) by over 0.3.
        feed(&mut w, 900.0, 450.0);
        assert_eq!(w.evaluate(&w.signs()[0]).unwrap(), SwitchDecision::Rejected);
        feed(&mut w, 900.0, 400.0);
        assert_eq!(w.evaluate(&w.signs()[0]).unwrap(), SwitchDecision::Switch);
    }

    #[test]
    fn major_minor_major_cycle() {
        let mut w = west(Turn::Straight);
        let mut trace = Vec::new();
        for left in [150.0, 330.0, 320.0, 100.0, 150.0] {
            feed(&mut w, 400.0, left);
            w.adjust().unwrap();
            trace.push(w.signs()[0].current_turn());
        }
        assert_eq!(trace, vec![Turn::Straight, Turn::Left, Turn::Left, Turn::Straight, Turn::Straight]);
    }

    #[test]
    fn right_turn_sets_both_constituents_in_full() {
        let mut e = VarianceLaneBuilder::new(Direction::East, east_allocation())
            .demand(TurnDemand::new(Turn::Right, 1260.0))
            .demand(TurnDemand::new(Turn::UTurn, 810.0))
            .build()
            .unwrap();
        e.update_demand(Turn::RightTurn, 300.0, 4.0);
        assert_eq!(e.demand(Turn::Right).unwrap().flow_hour_total, 300.0);
        assert_eq!(e.demand(Turn::UTurn).unwrap().flow_hour_total, 300.0);
        assert_eq!(e.demand(Turn::UTurn).unwrap().avg_queue_length, 4.0);
        // Untracked turns are ignored.
        e.update_demand(Turn::Left, 50.0, 0.0);
        assert!(e.demand(Turn::Left).is_none());
    }

    #[test]
    fn minor_reads_max_green_only_while_holding_the_lane() {
        let sign = Vms::new(SignId(1), Turn::Right, Turn::Straight, Turn::Right, |_: SignId, _: Turn| {
            Vec::<SignRecord>::new()
        })
        .unwrap();
        let mut e = VarianceLaneBuilder::new(Direction::East, east_allocation())
            .demand(TurnDemand::new(Turn::Straight, 1440.0))
            .demand(TurnDemand::new(Turn::Right, 1260.0))
            .saturation_threshold(Turn::Straight, 0.75)
            .saturation_threshold(Turn::Right, 0.9)
            .green_split(Turn::Straight, GreenSplit::from_timing(45.0, 150.0))
            .green_split(Turn::Right, GreenSplit::range(1.0, 52.0 / 150.0))
            .sign(sign)
            .build()
            .unwrap();
        // Right at full green: 400 / 1260 ≈ 0.32; straight 1000 / (1440 * 3 * 0.3) ≈ 0.77.
        // The 0.45 gap exceeds 0.3, and the projection back (right at min
        // green, ≈ 0.92) does not exceed straight by more than 0.3.
        e.update_demand(Turn::Straight, 1000.0, 0.0);
        e.update_demand(Turn::Right, 400.0, 0.0);
        assert_eq!(e.evaluate(&e.signs()[0]).unwrap(), SwitchDecision::Switch);
    }

    #[test]
    fn builder_requires_sign_turn_configuration() {
        let err = VarianceLaneBuilder::new(Direction::West, west_allocation())
            .demand(TurnDemand::new(Turn::Straight, 1440.0))
            .saturation_threshold(Turn::Straight, 0.75)
            .green_split(Turn::Straight, 0.3)
            .sign(west_sign(Turn::Straight))
            .build()
            .unwrap_err();
        assert!(matches!(err, LaneError::MissingDemand { turn: Turn::Left, .. }));

        let err = VarianceLaneBuilder::new(Direction::West, west_allocation())
            .demand(TurnDemand::new(Turn::Straight, 1440.0))
            .demand(TurnDemand::new(Turn::Left, 1170.0))
            .saturation_threshold(Turn::Straight, 0.75)
            .saturation_threshold(Turn::Left, 0.8)
            .green_split(Turn::Straight, 0.3)
            .sign(west_sign(Turn::Straight))
            .build()
            .unwrap_err();
        assert!(matches!(err, LaneError::MissingGreenSplit { turn: Turn::Left, .. }));
    }

    #[test]
    fn builder_rejects_layout_leaving_sign_turn_without_lanes() {
        // The straight-favoring layout {S:3, U:0} leaves the U-turn side of
        // the sign with nothing to saturate.
        let layouts = LaneAllocation::new(
            alloc(&[(Turn::Straight, 2.0), (Turn::UTurn, 0.0)]),
            vec![
                alloc(&[(Turn::Straight, 1.0), (Turn::UTurn, 0.0)]),
                alloc(&[(Turn::Straight, 0.0), (Turn::UTurn, 1.0)]),
            ],
        )
        .unwrap();
        let sign = Vms::new(SignId(7), Turn::Straight, Turn::Straight, Turn::UTurn, |_: SignId, _: Turn| {
            Vec::<SignRecord>::new()
        })
        .unwrap();
        let err = VarianceLaneBuilder::new(Direction::North, layouts)
            .demand(TurnDemand::new(Turn::Straight, 1440.0))
            .demand(TurnDemand::new(Turn::UTurn, 810.0))
            .saturation_threshold(Turn::Straight, 0.75)
            .saturation_threshold(Turn::UTurn, 0.8)
            .green_split(Turn::Straight, 0.3)
            .green_split(Turn::UTurn, 0.3)
            .sign(sign)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LaneError::UnservedSignTurn { direction: Direction::North, turn: Turn::UTurn }
        ));
    }

    #[test]
    fn builder_rejects_unusable_split_and_capacity() {
        let base = || {
            VarianceLaneBuilder::new(Direction::West, west_allocation())
                .demand(TurnDemand::new(Turn::Straight, 1440.0))
                .demand(TurnDemand::new(Turn::Left, 1170.0))
                .saturation_threshold(Turn::Straight, 0.75)
                .saturation_threshold(Turn::Left, 0.8)
                .green_split(Turn::Straight, 0.3)
                .green_split(Turn::Left, 0.35)
                .sign(west_sign(Turn::Straight))
        };
        let err = base().green_split(Turn::Left, 0.0).build().unwrap_err();
        assert!(matches!(err, LaneError::Core(CoreError::InvalidGreenSplit { turn: Turn::Left, .. })));

        let err = base().demand(TurnDemand::new(Turn::Straight, 0.0)).build().unwrap_err();
        assert!(matches!(err, LaneError::Core(CoreError::InvalidCapacity { turn: Turn::Straight, .. })));

        assert!(base().build().is_ok());
    }

    #[test]
    fn plan_leaves_the_approach_untouched_until_commit() {
        let mut w = west(Turn::Straight);
        let updates = [
            DemandUpdate::new(Turn::Straight, 400.0, 2.0),
            DemandUpdate::new(Turn::Left, 330.0, 5.0),
        ];

        let decisions = w.plan(&updates).unwrap();
        assert_eq!(decisions, vec![SwitchDecision::Switch]);
        assert!(w.signs()[0].is_major());
        assert_eq!(w.demand(Turn::Left).unwrap().flow_hour_total, 0.0);

        assert!(w.commit(&updates, &decisions));
        assert!(w.signs()[0].is_minor());
        assert_eq!(w.demand(Turn::Left).unwrap().flow_hour_total, 330.0);
        assert_eq!(w.demand(Turn::Left).unwrap().avg_queue_length, 5.0);
    }

    #[test]
    fn thresholds_are_per_instance() {
        // Left 200 / 405.6 ≈ 0.49 is under threshold and only 0.18 above
        // straight: the default band holds, a tight one switches.
        let mut loose = west(Turn::Straight);
        feed(&mut loose, 400.0, 200.0);
        assert!(!loose.adjust().unwrap());

        let mut tight = west(Turn::Straight);
        tight.set_thresholds(SwitchThresholds { absolute_saturation_diff: 0.05, ..Default::default() });
        feed(&mut tight, 400.0, 200.0);
        assert!(tight.adjust().unwrap());
    }
}
