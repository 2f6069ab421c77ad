//! Variable message signs.
//!
//! A [`Vms`] only knows which of its two turns it is showing.  What that
//! means on the wire (which lane ids, which display codes) is specific to
//! the intersection and comes from a [`SignRenderer`] supplied at
//! construction.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::json;

use vl_core::{Direction, LaneId, SignId, Turn};

use crate::{LaneError, LaneResult};

/// One opaque outbound record describing a sign's display.
pub type SignRecord = serde_json::Value;

// ── SignRenderer ──────────────────────────────────────────────────────────────

/// Converts a sign's current state into outbound records.
///
/// Any `Fn(SignId, Turn) -> Vec<SignRecord>` closure is a renderer.
pub trait SignRenderer: Send + Sync {
    fn render(&self, sign: SignId, current_turn: Turn) -> Vec<SignRecord>;
}

impl<F> SignRenderer for F
where
    F: Fn(SignId, Turn) -> Vec<SignRecord> + Send + Sync,
{
    fn render(&self, sign: SignId, current_turn: Turn) -> Vec<SignRecord> {
        self(sign, current_turn)
    }
}

/// Table-driven renderer: for each displayed turn, the lanes the sign
/// governs and the movement code each lane shows.
///
/// Records have the shape `{vmsId, laneId, direction, movement}`.
#[derive(Clone, Debug)]
pub struct LaneTurnRenderer {
    direction: Direction,
    states:    BTreeMap<Turn, Vec<(LaneId, u32)>>,
}

impl LaneTurnRenderer {
    pub fn new(direction: Direction) -> Self {
        Self { direction, states: BTreeMap::new() }
    }

    /// While the sign shows `turn`, `lane` displays `movement_code`.
    pub fn lane(mut self, turn: Turn, lane: LaneId, movement_code: u32) -> Self {
        self.states.entry(turn).or_default().push((lane, movement_code));
        self
    }
}

impl SignRenderer for LaneTurnRenderer {
    fn render(&self, sign: SignId, current_turn: Turn) -> Vec<SignRecord> {
        let direction = self.direction.code();
        self.states
            .get(&current_turn)
            .into_iter()
            .flatten()
            .map(|&(lane, code)| {
                json!({
                    "vmsId":     sign.get(),
                    "laneId":    lane.get(),
                    "direction": direction,
                    "movement":  code,
                })
            })
            .collect()
    }
}

// ── Vms ───────────────────────────────────────────────────────────────────────

/// Two-state sign bound to one variable lane group.
pub struct Vms {
    id:           SignId,
    current_turn: Turn,
    major_turn:   Turn,
    minor_turn:   Turn,
    renderer:     Box<dyn SignRenderer>,
}

impl Vms {
    /// # Errors
    ///
    /// `InvalidSignState` if `initial` is neither `major` nor `minor`, or
    /// the two coincide.
    pub fn new(
        id:       SignId,
        initial:  Turn,
        major:    Turn,
        minor:    Turn,
        renderer: impl SignRenderer + 'static,
    ) -> LaneResult<Self> {
        if major == minor || (initial != major && initial != minor) {
            return Err(LaneError::InvalidSignState { sign: id, turn: initial, major, minor });
        }
        Ok(Self {
            id,
            current_turn: initial,
            major_turn:   major,
            minor_turn:   minor,
            renderer:     Box::new(renderer),
        })
    }

    pub fn id(&self) -> SignId {
        self.id
    }

    pub fn current_turn(&self) -> Turn {
        self.current_turn
    }

    pub fn major_turn(&self) -> Turn {
        self.major_turn
    }

    pub fn minor_turn(&self) -> Turn {
        self.minor_turn
    }

    #[inline]
    pub fn is_major(&self) -> bool {
        self.current_turn == self.major_turn
    }

    #[inline]
    pub fn is_minor(&self) -> bool {
        self.current_turn == self.minor_turn
    }

    /// Flip between the major and minor turn.
    pub fn change_state(&mut self) {
        self.current_turn = if self.is_major() { self.minor_turn } else { self.major_turn };
    }

    pub fn render(&self) -> Vec<SignRecord> {
        self.renderer.render(self.id, self.current_turn)
    }
}

impl fmt::Debug for Vms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vms")
            .field("id", &self.id)
            .field("current_turn", &self.current_turn)
            .field("major_turn", &self.major_turn)
            .field("minor_turn", &self.minor_turn)
            .finish_non_exhaustive()
    }
}
