//! Approach directions, turning maneuvers, and movements.
//!
//! # Composite turns
//!
//! A lane whose markings allow two maneuvers is modelled as a composite
//! [`Turn`].  [`Turn::decompose`] breaks it into its basic constituents and
//! the rule for attributing the lane's flow to them:
//!
//! | Composite        | Constituents        | Flow attributed to each |
//! |------------------|---------------------|-------------------------|
//! | `LeftStraight`   | `Left`, `Straight`  | half                    |
//! | `RightStraight`  | `Right`, `Straight` | half                    |
//! | `RightTurn`      | `Right`, `UTurn`    | **full**                |
//!
//! A right-or-U-turn lane cannot be disaggregated, so for capacity sizing
//! its whole flow contends for both movements.  Route-demand synthesis
//! ([`crate::route`]) halves it instead; the two consumers differ on purpose.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four approaches into an intersection.
///
/// The discriminants are the wire codes used in outbound sign records.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    West  = 1,
    South = 2,
    East  = 3,
    North = 4,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::West, Direction::South, Direction::East, Direction::North];

    /// Numeric wire code (1–4).
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The approach facing this one across the intersection.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::West  => Direction::East,
            Direction::South => Direction::North,
            Direction::East  => Direction::West,
            Direction::North => Direction::South,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::West  => "west",
            Direction::South => "south",
            Direction::East  => "east",
            Direction::North => "north",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "west"  | "w" | "1" => Ok(Direction::West),
            "south" | "s" | "2" => Ok(Direction::South),
            "east"  | "e" | "3" => Ok(Direction::East),
            "north" | "n" | "4" => Ok(Direction::North),
            _ => Err(CoreError::UnknownDirection(s.to_owned())),
        }
    }
}

// ── Turn ──────────────────────────────────────────────────────────────────────

/// A turning maneuver, either basic or the composite served by one shared lane.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Turn {
    Left,
    LeftStraight,
    Straight,
    RightStraight,
    Right,
    /// U-turn.
    UTurn,
    /// Shared right-turn / U-turn lane.
    RightTurn,
}

const LEFT_STRAIGHT_PARTS:  &[Turn] = &[Turn::Left, Turn::Straight];
const RIGHT_STRAIGHT_PARTS: &[Turn] = &[Turn::Right, Turn::Straight];
const RIGHT_TURN_PARTS:     &[Turn] = &[Turn::Right, Turn::UTurn];
const RIGHT_TURN_FRACTIONS: &[f64]  = &[1.0, 1.0];

impl Turn {
    pub const BASIC: [Turn; 4] = [Turn::Left, Turn::Straight, Turn::Right, Turn::UTurn];

    /// `true` for turns that physically serve two basic maneuvers.
    #[inline]
    pub fn is_composite(self) -> bool {
        matches!(self, Turn::LeftStraight | Turn::RightStraight | Turn::RightTurn)
    }

    /// Split this turn into its basic constituents.
    pub fn decompose(self) -> Decomposition {
        match self {
            Turn::RightTurn => Decomposition {
                turns:     RIGHT_TURN_PARTS,
                fractions: Some(RIGHT_TURN_FRACTIONS),
            },
            Turn::RightStraight => Decomposition { turns: RIGHT_STRAIGHT_PARTS, fractions: None },
            Turn::LeftStraight  => Decomposition { turns: LEFT_STRAIGHT_PARTS,  fractions: None },
            Turn::Left     => Decomposition { turns: &[Turn::Left],     fractions: None },
            Turn::Straight => Decomposition { turns: &[Turn::Straight], fractions: None },
            Turn::Right    => Decomposition { turns: &[Turn::Right],    fractions: None },
            Turn::UTurn    => Decomposition { turns: &[Turn::UTurn],    fractions: None },
        }
    }

    /// The maneuver that decides which phase serves this lane.
    ///
    /// Shared straight lanes follow their turning constituent.
    pub fn basic_movement(self) -> Turn {
        match self {
            Turn::LeftStraight  => Turn::Left,
            Turn::RightStraight => Turn::Right,
            other               => other,
        }
    }

    /// The maneuver that may conflict with this one under a shared phase.
    pub fn possible_conflict(self) -> Option<Turn> {
        match self.basic_movement() {
            Turn::Left     => Some(Turn::Straight),
            Turn::Straight => Some(Turn::Left),
            _              => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Turn::Left          => "left",
            Turn::LeftStraight  => "left_straight",
            Turn::Straight      => "straight",
            Turn::RightStraight => "right_straight",
            Turn::Right         => "right",
            Turn::UTurn         => "u_turn",
            Turn::RightTurn     => "right_turn",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Turn {
    type Err = CoreError;

    /// Accepts the snake-case names and the lane-marking shorthand
    /// (`l`, `s`, `r`, `t`, `ls`, `rs`, `rt`).
    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left"           | "l"         => Ok(Turn::Left),
            "left_straight"  | "ls" | "sl" => Ok(Turn::LeftStraight),
            "straight"       | "s"         => Ok(Turn::Straight),
            "right_straight" | "rs" | "sr" => Ok(Turn::RightStraight),
            "right"          | "r"         => Ok(Turn::Right),
            "u_turn" | "uturn" | "turn" | "t" => Ok(Turn::UTurn),
            "right_turn"     | "rt" | "tr" => Ok(Turn::RightTurn),
            _ => Err(CoreError::UnknownTurn(s.to_owned())),
        }
    }
}

// ── Decomposition ─────────────────────────────────────────────────────────────

/// The basic constituents of a [`Turn`] and how a lane's flow is shared
/// between them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decomposition {
    /// Constituent basic turns, in a fixed order.
    pub turns: &'static [Turn],
    /// Per-constituent share of the lane's flow.  `None` means an even split.
    pub fractions: Option<&'static [f64]>,
}

impl Decomposition {
    /// Number of constituent turns.
    #[inline]
    pub fn count(&self) -> usize {
        self.turns.len()
    }

    /// The share of `value` attributed to the `i`-th constituent.
    pub fn share(&self, i: usize, value: f64) -> f64 {
        match self.fractions {
            Some(fractions) => value * fractions[i],
            None            => value / self.turns.len() as f64,
        }
    }

    /// Pair every constituent turn with its share of `value`.
    pub fn split(&self, value: f64) -> impl Iterator<Item = (Turn, f64)> + '_ {
        self.turns
            .iter()
            .enumerate()
            .map(move |(i, &turn)| (turn, self.share(i, value)))
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// A (direction, turn) pair an approach can serve.  Compared and hashed by value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movement {
    pub direction: Direction,
    pub turn:      Turn,
}

impl Movement {
    #[inline]
    pub const fn new(direction: Direction, turn: Turn) -> Self {
        Self { direction, turn }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.direction, self.turn)
    }
}
