//! Error types for the Nim solver.

use thiserror::Error;

use crate::game::Phase;

/// Main error type of the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("there is no pile {}: there are {pile_count} piles", index.saturating_add(1))]
    InvalidPileIndex { index: i64, pile_count: usize },

    #[error("pile {} is empty", index + 1)]
    EmptyPileSelected { index: usize },

    #[error("cannot remove {count} stones: the pile has {available}")]
    InvalidMoveCount { count: i64, available: u32 },

    #[error("best move requested for a terminal position")]
    SolverPreconditionViolation,

    #[error("search cancelled")]
    Cancelled,

    #[error("'{input}' is not a valid number")]
    InvalidNumber { input: String },

    #[error("invalid pile configuration '{input}'")]
    InvalidPiles { input: String },

    #[error("{total} stones is more than the solver accepts (at most {max})")]
    TooManyStones { total: u64, max: u64 },

    #[error("action not allowed while {actual:?} (expected {expected:?})")]
    WrongPhase { expected: Phase, actual: Phase },
}

impl Error {
    /// True for errors caused by human input, which the driver reports and re-prompts.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPileIndex { .. }
                | Error::EmptyPileSelected { .. }
                | Error::InvalidMoveCount { .. }
                | Error::InvalidNumber { .. }
                | Error::InvalidPiles { .. }
                | Error::TooManyStones { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
