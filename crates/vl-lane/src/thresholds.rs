//! The hysteresis band that keeps variable lanes from chattering.

/// Saturation margins used by the switch decision.
///
/// Leaving a state is always judged against the *projected* saturations of
/// the state being entered, and the margins below are chosen so that the
/// condition to leave is stricter than the condition to come back.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwitchThresholds {
    /// Demand imbalance (saturation difference) that triggers a switch
    /// attempt in either direction.
    pub absolute_saturation_diff: f64,
    /// While minor: how much worse than major the minor turn may end up
    /// after returning to major before the return is refused.
    pub recover_saturation_diff: f64,
    /// While minor: minor saturation under the major layout at or below
    /// which minor demand counts as cleared.
    pub minor_clear_saturation: f64,
    /// While minor: major saturation that forces a return attempt
    /// regardless of minor demand.
    pub major_extreme_saturation: f64,
    /// While major: margin by which post-switch major saturation must stay
    /// below post-switch minor saturation for an overloaded major to be
    /// given up.
    pub switch_guard_margin: f64,
}

impl Default for SwitchThresholds {
    fn default() -> Self {
        Self {
            absolute_saturation_diff: 0.3,
            recover_saturation_diff:  0.3,
            minor_clear_saturation:   0.3,
            major_extreme_saturation: 0.95,
            switch_guard_margin:      0.2,
        }
    }
}
