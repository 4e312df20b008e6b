//! Last-stone-wins Nim with an exact minimax opponent.
//!
//! [`search`] holds the pure alpha-beta search. [`Solver`] wraps the same
//! search with a shared outcome cache, a cancellation flag and optional
//! parallel scoring of root moves, without ever changing the chosen move.

mod entry;
pub mod error;
pub mod game;
pub mod search;
pub mod state;

mod tests;

use dashmap::DashMap;
use log::debug;
use rayon::prelude::*;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use crate::entry::Entry;
pub use crate::error::{Error, Result};
use crate::search::{alpha_beta, best_by_value, LOSS, NEG_INF, POS_INF, WIN};
pub use crate::state::{
    parse_piles, CanonicalKey, GameState, Move, INITIAL_PILES, MAX_TOTAL_STONES,
};

/// Tuning switches of the [`Solver`]. None of them affect the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Cache outcomes by canonical position.
    pub memoize: bool,
    /// Score root moves on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            memoize: true,
            parallel: false,
        }
    }
}

/// Computes minimax values and optimal moves of Nim positions.
///
/// Clones share the cache, the counters and the cancellation flag.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    cache: Arc<DashMap<CanonicalKey, Entry>>,
    cancel_flag: Arc<AtomicBool>,
    nodes: Arc<AtomicU64>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverConfig::default())
    }
}

impl Solver {
    /// Constructs a new solver with an empty cache.
    pub fn new(config: SolverConfig) -> Solver {
        Solver {
            config,
            cache: Arc::new(DashMap::new()),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            nodes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// Returns the number of positions stored in the cache.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Returns the total number of search nodes visited so far.
    pub fn nodes_visited(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Returns the number of cache lookups that were answered from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache.iter().map(|e| e.hits() as u64).sum()
    }

    /// Returns a handle to the solver's cancellation flag.
    /// Setting it makes running and future searches fail with [`Error::Cancelled`].
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    pub fn reset_cancel(&self) {
        self.cancel_flag.store(false, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Minimax value of `state` seen from the maximizer.
    pub fn value(&self, state: &GameState, maximizing: bool) -> Result<i8> {
        state.check_size()?;
        if self.config.memoize {
            let mover_wins = self.mover_wins(state).ok_or(Error::Cancelled)?;
            Ok(if mover_wins == maximizing { WIN } else { LOSS })
        } else {
            alpha_beta(state, maximizing, NEG_INF, POS_INF, &|| self.visit())
                .ok_or(Error::Cancelled)
        }
    }

    /// Optimal move for the side to move, identical to [`search::best_move`].
    pub fn best_move(&self, state: &GameState) -> Result<Move> {
        if state.is_terminal() {
            return Err(Error::SolverPreconditionViolation);
        }
        state.check_size()?;
        let started = Instant::now();
        let nodes_before = self.nodes_visited();

        let moves: Vec<Move> = state.legal_moves().collect();
        let score = |m: &Move| -> Result<(Move, i8)> {
            Ok((*m, self.value(&state.child(*m), false)?))
        };
        let scored: Vec<(Move, i8)> = if self.config.parallel {
            moves
                .par_iter()
                .map(score)
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<_>>()?
        } else {
            moves.iter().map(score).collect::<Result<_>>()?
        };

        let best = best_by_value(scored)?;
        debug!(
            "best move for {state}: {best} ({} nodes, {} cached positions, {:?})",
            self.nodes_visited() - nodes_before,
            self.cache_size(),
            started.elapsed()
        );
        Ok(best)
    }

    fn visit(&self) -> bool {
        self.nodes.fetch_add(1, Ordering::Relaxed);
        !self.is_cancelled()
    }

    /// Whether the side to move wins `state`. Returns `None` if cancelled.
    ///
    /// Stopping at the first winning child is an alpha-beta cut whose window
    /// equals the value range, so every cached outcome is exact.
    fn mover_wins(&self, state: &GameState) -> Option<bool> {
        if !self.visit() {
            return None;
        }
        let key = state.canonical();
        if key.is_empty() {
            return Some(false);
        }
        if let Some(mut entry) = self.cache.get_mut(&key) {
            entry.record_hit();
            return Some(entry.mover_wins());
        }

        let mut wins = false;
        for m in state.legal_moves() {
            if !self.mover_wins(&state.child(m))? {
                wins = true;
                break;
            }
        }
        self.cache.insert(key, Entry::new(wins));
        Some(wins)
    }
}
