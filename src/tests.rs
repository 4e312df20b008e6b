#![cfg(test)]
use std::sync::atomic::Ordering;

use crate::search::{self, minimax, terminal_value, LOSS, NEG_INF, POS_INF, WIN};
use crate::{Error, GameState, Move, Solver, SolverConfig, MAX_TOTAL_STONES};

/// Plain minimax without pruning, used as the reference for the pruned search.
fn unpruned(state: &GameState, maximizing: bool) -> i8 {
    if state.is_terminal() {
        return terminal_value(maximizing);
    }
    let values = state
        .legal_moves()
        .map(|m| unpruned(&state.apply(m).unwrap(), !maximizing));
    if maximizing {
        values.max().unwrap()
    } else {
        values.min().unwrap()
    }
}

/// Every configuration of `piles` piles holding at most `max` stones each.
fn all_states(piles: usize, max: u32) -> Vec<GameState> {
    let mut states = vec![vec![]];
    for _ in 0..piles {
        states = states
            .into_iter()
            .flat_map(|prefix: Vec<u32>| {
                (0..=max).map(move |p| {
                    let mut next = prefix.clone();
                    next.push(p);
                    next
                })
            })
            .collect();
    }
    states.into_iter().map(GameState::new).collect()
}

#[test]
fn test_legal_moves_order() {
    let state = GameState::new(vec![2, 0, 1]);
    let moves: Vec<Move> = state.legal_moves().collect();
    assert_eq!(
        moves,
        vec![Move::new(0, 1), Move::new(0, 2), Move::new(2, 1)]
    );
    // the sequence can be walked again
    assert_eq!(state.legal_moves().count(), 3);
}

#[test]
fn test_legal_moves_strictly_decrease_stones() {
    for state in all_states(3, 4) {
        let total = state.total_stones();
        for m in state.legal_moves() {
            assert!(m.count >= 1 && m.count <= state.piles()[m.pile_index]);
            let child = state.apply(m).unwrap();
            assert!(child.total_stones() < total);
            assert_eq!(child.piles().len(), state.piles().len());
        }
    }
}

#[test]
fn test_terminal_iff_no_stones() {
    for state in all_states(3, 3) {
        assert_eq!(state.is_terminal(), state.total_stones() == 0);
        assert_eq!(state.is_terminal(), state.legal_moves().next().is_none());
    }
    assert!(GameState::new(vec![]).is_terminal());
}

#[test]
fn test_apply() {
    let state = GameState::default();
    assert_eq!(
        state.apply(Move::new(1, 3)).unwrap(),
        GameState::new(vec![1, 0, 4, 5])
    );
    assert_eq!(
        state.apply(Move::new(0, 2)),
        Err(Error::InvalidMoveCount {
            count: 2,
            available: 1
        })
    );
    assert_eq!(
        state.apply(Move::new(2, 0)),
        Err(Error::InvalidMoveCount {
            count: 0,
            available: 4
        })
    );
    assert_eq!(
        state.apply(Move::new(4, 1)),
        Err(Error::InvalidPileIndex {
            index: 4,
            pile_count: 4
        })
    );
    assert_eq!(
        GameState::new(vec![0, 2]).apply(Move::new(0, 1)),
        Err(Error::EmptyPileSelected { index: 0 })
    );
    // the input is never modified
    assert_eq!(state, GameState::default());
}

#[test]
fn test_pruning_preserves_minimax_value() {
    let states = all_states(2, 6).into_iter().chain(all_states(3, 3));
    for state in states {
        for maximizing in [true, false] {
            assert_eq!(
                minimax(&state, maximizing, NEG_INF, POS_INF),
                unpruned(&state, maximizing),
                "{state} maximizing={maximizing}"
            );
        }
    }
}

#[test]
fn test_value_matches_nim_sum() {
    let solver = Solver::default();
    for state in all_states(4, 4) {
        let expected = if state.nim_sum() != 0 { WIN } else { LOSS };
        assert_eq!(solver.value(&state, true), Ok(expected), "{state}");
        assert_eq!(solver.value(&state, false), Ok(-expected), "{state}");
    }
}

#[test]
fn test_best_move_on_terminal_state_fails() {
    let state = GameState::new(vec![0, 0, 0]);
    assert_eq!(
        search::best_move(&state),
        Err(Error::SolverPreconditionViolation)
    );
    assert_eq!(
        Solver::default().best_move(&state),
        Err(Error::SolverPreconditionViolation)
    );
}

#[test]
fn test_single_legal_move() {
    let state = GameState::new(vec![0, 0, 0, 1]);
    let m = search::best_move(&state).unwrap();
    assert_eq!(m, Move::new(3, 1));
    assert!(state.apply(m).unwrap().is_terminal());
}

#[test]
fn test_two_singleton_piles_are_lost_for_the_mover() {
    // whichever stone is taken, the opponent takes the last one
    let state = GameState::new(vec![1, 1]);
    let m = search::best_move(&state).unwrap();
    assert_eq!(m, Move::new(0, 1));
    assert_eq!(unpruned(&state.apply(m).unwrap(), false), LOSS);
}

#[test]
fn test_three_singleton_piles_are_won_for_the_mover() {
    let state = GameState::new(vec![1, 1, 1]);
    let m = search::best_move(&state).unwrap();
    assert_eq!(m, Move::new(0, 1));
    assert_eq!(unpruned(&state.apply(m).unwrap(), false), WIN);
}

#[test]
fn test_best_move_from_initial_configuration() {
    let state = GameState::default();
    let m = search::best_move(&state).unwrap();
    assert_eq!(m, Move::new(1, 3));
    assert_eq!(state.apply(m).unwrap().nim_sum(), 0);
}

#[test]
fn test_first_winning_move_wins_ties() {
    // emptying any of the three piles wins
    let state = GameState::new(vec![2, 2, 2]);
    let winning: Vec<Move> = state
        .legal_moves()
        .filter(|&m| state.apply(m).unwrap().nim_sum() == 0)
        .collect();
    assert_eq!(
        winning,
        vec![Move::new(0, 2), Move::new(1, 2), Move::new(2, 2)]
    );
    assert_eq!(search::best_move(&state).unwrap(), winning[0]);
}

#[test]
fn test_best_move_is_deterministic() {
    let state = GameState::new(vec![2, 3, 5]);
    let snapshot = state.clone();
    let first = search::best_move(&state).unwrap();
    let second = search::best_move(&state).unwrap();
    assert_eq!(first, second);
    assert_eq!(state, snapshot);

    let solver = Solver::default();
    assert_eq!(solver.best_move(&state).unwrap(), first);
    assert_eq!(solver.best_move(&state).unwrap(), first);
}

#[test]
fn test_solver_configurations_agree_with_search() {
    let configs = [
        SolverConfig {
            memoize: true,
            parallel: false,
        },
        SolverConfig {
            memoize: false,
            parallel: false,
        },
        SolverConfig {
            memoize: true,
            parallel: true,
        },
        SolverConfig {
            memoize: false,
            parallel: true,
        },
    ];
    let solvers: Vec<Solver> = configs.into_iter().map(Solver::new).collect();
    for state in all_states(3, 3) {
        if state.is_terminal() {
            continue;
        }
        let expected = search::best_move(&state).unwrap();
        for solver in &solvers {
            assert_eq!(
                solver.best_move(&state),
                Ok(expected),
                "{state} {:?}",
                solver.config()
            );
        }
    }
}

#[test]
fn test_cache_is_shared_and_reused() {
    let solver = Solver::default();
    let clone = solver.clone();
    solver.best_move(&GameState::new(vec![3, 4, 5])).unwrap();
    assert!(clone.cache_size() > 0);

    let nodes = clone.nodes_visited();
    // same canonical position in a different order
    clone.best_move(&GameState::new(vec![5, 3, 4])).unwrap();
    assert!(clone.cache_hits() > 0);
    assert!(clone.nodes_visited() > nodes);
}

#[test]
fn test_cancelled_search() {
    for memoize in [true, false] {
        let solver = Solver::new(SolverConfig {
            memoize,
            parallel: false,
        });
        solver.cancel_flag().store(true, Ordering::Relaxed);
        assert_eq!(
            solver.best_move(&GameState::default()),
            Err(Error::Cancelled)
        );
        assert_eq!(solver.cache_size(), 0);

        solver.reset_cancel();
        assert_eq!(
            solver.best_move(&GameState::default()),
            Ok(Move::new(1, 3))
        );
    }
}

#[test]
fn test_user_errors() {
    assert!(Error::EmptyPileSelected { index: 0 }.is_user_error());
    assert!(!Error::SolverPreconditionViolation.is_user_error());
    assert!(!Error::Cancelled.is_user_error());
}

#[test]
fn test_state_serialization() {
    let state = GameState::new(vec![1, 0, 4, 5]);
    let json = serde_json::to_string(&state).unwrap();
    assert_eq!(json, r#"{"piles":[1,0,4,5]}"#);
    let m: Move = serde_json::from_str(r#"{"pile_index":2,"count":3}"#).unwrap();
    assert_eq!(state.apply(m).unwrap().piles(), &[1, 0, 1, 5]);
}

#[test]
fn test_oversized_positions_are_rejected() {
    let state = GameState::new(vec![300_000]);
    let expected = Err(Error::TooManyStones {
        total: 300_000,
        max: MAX_TOTAL_STONES,
    });
    assert_eq!(search::best_move(&state), expected);
    for memoize in [true, false] {
        let solver = Solver::new(SolverConfig {
            memoize,
            parallel: false,
        });
        assert_eq!(solver.best_move(&state), expected);
        assert_eq!(
            solver.value(&state, true).map(|_| ()),
            expected.clone().map(|_| ())
        );
        assert_eq!(solver.nodes_visited(), 0);
    }
}

#[test]
fn test_single_pile_at_the_stone_limit() {
    // one pile: taking everything wins, and the search runs the full depth
    let state = GameState::new(vec![MAX_TOTAL_STONES as u32]);
    let solver = Solver::default();
    assert_eq!(
        solver.best_move(&state),
        Ok(Move::new(0, MAX_TOTAL_STONES as u32))
    );
}
