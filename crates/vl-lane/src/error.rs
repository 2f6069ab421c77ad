use thiserror::Error;

use vl_core::{CoreError, Direction, SignId, Turn};

#[derive(Debug, Error)]
pub enum LaneError {
    #[error("flexible lane-allocation table is empty")]
    EmptyFlexibleTable,

    #[error("turn {0} is not allocated by any candidate lane layout")]
    TurnNotAllocated(Turn),

    #[error("no priority window covers hour {0}")]
    NoPriorityWindow(f64),

    #[error("{direction} approach has no demand record for turn {turn}")]
    MissingDemand { direction: Direction, turn: Turn },

    #[error("{direction} approach has no saturation threshold for turn {turn}")]
    MissingThreshold { direction: Direction, turn: Turn },

    #[error("{direction} approach has no green split for turn {turn}")]
    MissingGreenSplit { direction: Direction, turn: Turn },

    #[error("{direction} approach has a candidate lane layout giving sign turn {turn} no lanes")]
    UnservedSignTurn { direction: Direction, turn: Turn },

    #[error("sign {sign} cannot show {turn}: it only switches between {major} and {minor}")]
    InvalidSignState {
        sign:  SignId,
        turn:  Turn,
        major: Turn,
        minor: Turn,
    },

    #[error("saturation error: {0}")]
    Core(#[from] CoreError),
}

pub type LaneResult<T> = Result<T, LaneError>;
