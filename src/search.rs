//! Exact minimax search with alpha-beta pruning.
//!
//! Values are from the point of view of the maximizing player, which is the
//! side to move at the root: `WIN` means the maximizer wins with best play,
//! `LOSS` means it loses. There is no depth limit and no discount, so a slow
//! win is worth as much as a fast one.

use crate::error::{Error, Result};
use crate::state::{GameState, Move};

pub const WIN: i8 = 1;
pub const LOSS: i8 = -1;

/// Bounds strictly outside `LOSS..=WIN`, equivalent to infinite bounds.
pub const NEG_INF: i8 = LOSS - 1;
pub const POS_INF: i8 = WIN + 1;

/// Value of a terminal position: whoever has to move there has already lost.
pub fn terminal_value(maximizing: bool) -> i8 {
    if maximizing {
        LOSS
    } else {
        WIN
    }
}

/// Minimax value of `state` with `maximizing` telling whose turn it is.
///
/// `alpha` and `beta` only narrow on the way down; the returned value is the
/// same one an unpruned minimax would produce. Recursion depth is the number
/// of stones left, see
/// [`MAX_TOTAL_STONES`](crate::state::MAX_TOTAL_STONES).
pub fn minimax(state: &GameState, maximizing: bool, alpha: i8, beta: i8) -> i8 {
    alpha_beta(state, maximizing, alpha, beta, &|| true)
        .expect("search without a stop condition always completes")
}

/// Alpha-beta search that calls `visit` once per node and gives up with
/// `None` as soon as it returns false.
pub(crate) fn alpha_beta<F>(
    state: &GameState,
    maximizing: bool,
    mut alpha: i8,
    mut beta: i8,
    visit: &F,
) -> Option<i8>
where
    F: Fn() -> bool,
{
    if !visit() {
        return None;
    }
    if state.is_terminal() {
        return Some(terminal_value(maximizing));
    }

    if maximizing {
        let mut max_eval = NEG_INF;
        for m in state.legal_moves() {
            let eval = alpha_beta(&state.child(m), false, alpha, beta, visit)?;
            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                break;
            }
        }
        Some(max_eval)
    } else {
        let mut min_eval = POS_INF;
        for m in state.legal_moves() {
            let eval = alpha_beta(&state.child(m), true, alpha, beta, visit)?;
            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                break;
            }
        }
        Some(min_eval)
    }
}

/// Optimal move for the side to move.
///
/// Every root move is scored with a fresh full window, and the first move
/// with a strictly greater score wins ties.
pub fn best_move(state: &GameState) -> Result<Move> {
    state.check_size()?;
    best_by_value(
        state
            .legal_moves()
            .map(|m| (m, minimax(&state.child(m), false, NEG_INF, POS_INF))),
    )
}

/// Picks the first move with the strictly greatest value.
pub(crate) fn best_by_value(scored: impl IntoIterator<Item = (Move, i8)>) -> Result<Move> {
    let mut best: Option<(Move, i8)> = None;
    for (m, value) in scored {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((m, value)),
        }
    }
    best.map(|(m, _)| m).ok_or(Error::SolverPreconditionViolation)
}
