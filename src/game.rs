//! Turn-by-turn driver for a human playing against the solver.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::state::{GameState, Move};
use crate::Solver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Human,
    Computer,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Human => Player::Computer,
            Player::Computer => Player::Human,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHuman,
    AwaitingComputer,
    /// Absorbing until [`Game::reset`]. `winner` took the last stone.
    Terminal { winner: Player },
}

impl Phase {
    fn awaiting(player: Player) -> Phase {
        match player {
            Player::Human => Phase::AwaitingHuman,
            Player::Computer => Phase::AwaitingComputer,
        }
    }
}

/// Owns the authoritative pile configuration of one game.
#[derive(Debug, Clone)]
pub struct Game {
    initial: GameState,
    first: Player,
    state: GameState,
    phase: Phase,
    solver: Solver,
}

impl Game {
    /// New game where the human moves first.
    pub fn new(initial: GameState, solver: Solver) -> Game {
        Game::with_first(initial, solver, Player::Human)
    }

    pub fn with_first(initial: GameState, solver: Solver, first: Player) -> Game {
        let mut game = Game {
            state: initial.clone(),
            initial,
            first,
            phase: Phase::AwaitingHuman,
            solver,
        };
        game.phase = game.opening_phase();
        game
    }

    // a game that starts empty is already lost by whoever would move first
    fn opening_phase(&self) -> Phase {
        if self.state.is_terminal() {
            Phase::Terminal {
                winner: self.first.opponent(),
            }
        } else {
            Phase::awaiting(self.first)
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::Terminal { winner } => Some(winner),
            _ => None,
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Applies a human move. On error the state is left unchanged.
    pub fn human_move(&mut self, m: Move) -> Result<Phase> {
        self.expect_phase(Phase::AwaitingHuman)?;
        self.state = self.state.apply(m)?;
        debug!("human: {m}, piles now {}", self.state);
        Ok(self.advance(Player::Human))
    }

    /// Lets the solver pick and play a move, returning it.
    pub fn computer_move(&mut self) -> Result<Move> {
        self.expect_phase(Phase::AwaitingComputer)?;
        let m = self.solver.best_move(&self.state)?;
        self.state = self.state.apply(m)?;
        debug!("computer: {m}, piles now {}", self.state);
        self.advance(Player::Computer);
        Ok(m)
    }

    fn advance(&mut self, mover: Player) -> Phase {
        self.phase = if self.state.is_terminal() {
            info!("{mover:?} took the last stone and wins");
            Phase::Terminal { winner: mover }
        } else {
            Phase::awaiting(mover.opponent())
        };
        self.phase
    }

    /// Restores the initial configuration.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.phase = self.opening_phase();
    }
}

/// Parses a human move given as a 1-based pile number and a stone count,
/// and checks it against `state`.
pub fn parse_move(pile: &str, count: &str, state: &GameState) -> Result<Move> {
    let pile_number: i64 = parse_number(pile)?;
    let count: i64 = parse_number(count)?;

    let pile_count = state.piles().len();
    let index = pile_number
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < pile_count)
        .ok_or(Error::InvalidPileIndex {
            index: pile_number.saturating_sub(1),
            pile_count,
        })?;
    let available = state.piles()[index];
    if available == 0 {
        return Err(Error::EmptyPileSelected { index });
    }
    let count = u32::try_from(count)
        .ok()
        .filter(|&c| c >= 1 && c <= available)
        .ok_or(Error::InvalidMoveCount { count, available })?;

    Ok(Move::new(index, count))
}

fn parse_number(input: &str) -> Result<i64> {
    input.trim().parse().map_err(|_| Error::InvalidNumber {
        input: input.trim().to_string(),
    })
}

/// Piles above this size are rendered as a count instead of stone by stone.
pub const MAX_DRAWN_STONES: u32 = 30;

/// Text rendering of the piles, one line per pile.
pub fn render(state: &GameState) -> String {
    state
        .piles()
        .iter()
        .enumerate()
        .map(|(i, &stones)| {
            let stones = if stones > MAX_DRAWN_STONES {
                format!("{stones} stones")
            } else {
                vec!["o"; stones as usize].join(" ")
            };
            format!("Pile {}: {}", i + 1, stones).trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Announcement of the computer's move, with 1-based pile numbering.
pub fn describe_computer_move(m: Move) -> String {
    let stones = if m.count == 1 { "stone" } else { "stones" };
    format!(
        "Computer removes {} {} from pile {}",
        m.count,
        stones,
        m.pile_index + 1
    )
}
