use std::fmt;

use serde::{Deserialize, Serialize};
use sorted_vec::SortedVec;

use crate::error::{Error, Result};

/// Starting configuration of a fresh game.
pub const INITIAL_PILES: [u32; 4] = [1, 3, 4, 5];

/// Largest number of stones the solver accepts.
///
/// The search recurses once per removed stone, so this also bounds the
/// recursion depth well within a default thread stack.
pub const MAX_TOTAL_STONES: u64 = 512;

/// Removal of `count` stones from the pile at `pile_index` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub pile_index: usize,
    pub count: u32,
}

impl Move {
    pub fn new(pile_index: usize, count: u32) -> Move {
        Move { pile_index, count }
    }
}

impl fmt::Display for Move {
    // piles are numbered from 1 for humans
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stones = if self.count == 1 { "stone" } else { "stones" };
        write!(
            f,
            "remove {} {} from pile {}",
            self.count,
            stones,
            self.pile_index + 1
        )
    }
}

/// A pile configuration. The number of piles never changes during a game,
/// piles only shrink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    piles: Vec<u32>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(INITIAL_PILES.to_vec())
    }
}

impl From<Vec<u32>> for GameState {
    fn from(piles: Vec<u32>) -> Self {
        GameState::new(piles)
    }
}

impl GameState {
    pub fn new(piles: Vec<u32>) -> GameState {
        GameState { piles }
    }

    pub fn piles(&self) -> &[u32] {
        &self.piles
    }

    pub fn total_stones(&self) -> u64 {
        self.piles.iter().map(|&p| p as u64).sum()
    }

    /// True once every pile is empty. The side to move at a terminal state has lost.
    pub fn is_terminal(&self) -> bool {
        self.piles.iter().all(|&p| p == 0)
    }

    /// Enumerates every legal move, pile-ascending then count-ascending.
    ///
    /// The order is relied upon for tie-breaking in the search, and the
    /// iterator can be recreated at will since it only borrows the state.
    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.piles
            .iter()
            .enumerate()
            .flat_map(|(i, &stones)| (1..=stones).map(move |count| Move::new(i, count)))
    }

    /// Checks a move against this state without applying it.
    pub fn validate(&self, m: Move) -> Result<()> {
        let available = *self.piles.get(m.pile_index).ok_or(Error::InvalidPileIndex {
            index: i64::try_from(m.pile_index).unwrap_or(i64::MAX),
            pile_count: self.piles.len(),
        })?;
        if available == 0 {
            return Err(Error::EmptyPileSelected {
                index: m.pile_index,
            });
        }
        if m.count == 0 || m.count > available {
            return Err(Error::InvalidMoveCount {
                count: i64::from(m.count),
                available,
            });
        }
        Ok(())
    }

    /// Fails with [`Error::TooManyStones`] above [`MAX_TOTAL_STONES`].
    pub fn check_size(&self) -> Result<()> {
        let total = self.total_stones();
        if total > MAX_TOTAL_STONES {
            return Err(Error::TooManyStones {
                total,
                max: MAX_TOTAL_STONES,
            });
        }
        Ok(())
    }

    /// Returns the state after `m`, leaving `self` untouched.
    pub fn apply(&self, m: Move) -> Result<GameState> {
        self.validate(m)?;
        Ok(self.child(m))
    }

    /// Applies a move produced by [`GameState::legal_moves`], skipping validation.
    pub(crate) fn child(&self, m: Move) -> GameState {
        let mut piles = self.piles.clone();
        piles[m.pile_index] -= m.count;
        GameState { piles }
    }

    /// XOR of all pile sizes. The side to move wins iff it is non-zero.
    pub fn nim_sum(&self) -> u32 {
        self.piles.iter().fold(0, |acc, &p| acc ^ p)
    }

    /// Key under which positions with the same outcome are cached.
    ///
    /// Pile order and empty piles are irrelevant, and two equal piles cancel
    /// out since `G + H + H` has the same outcome as `G`.
    pub fn canonical(&self) -> CanonicalKey {
        let sorted = SortedVec::from_unsorted(
            self.piles.iter().copied().filter(|&p| p != 0).collect::<Vec<_>>(),
        );
        CanonicalKey(remove_pairs(&sorted))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let piles: Vec<String> = self.piles.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", piles.join(", "))
    }
}

/// Canonical form of a pile configuration, see [`GameState::canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalKey(Vec<u32>);

impl CanonicalKey {
    /// An empty key is a loss for the side to move, whether or not stones remain.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Removes consecutive pairs of equal elements in a sorted list.
fn remove_pairs(sorted: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(sorted.len());
    let mut read = 0;

    while read < sorted.len() {
        if read + 1 < sorted.len() && sorted[read] == sorted[read + 1] {
            read += 2;
        } else {
            out.push(sorted[read]);
            read += 1;
        }
    }
    out
}

/// Parses a pile list such as `1,3,4,5` or `1 3 4 5`.
pub fn parse_piles(input: &str) -> Result<GameState> {
    let piles = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::InvalidPiles {
            input: input.to_string(),
        })?;
    if piles.is_empty() {
        return Err(Error::InvalidPiles {
            input: input.to_string(),
        });
    }
    let state = GameState::new(piles);
    state.check_size()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_pairs() {
        assert_eq!(remove_pairs(&[1, 1, 2, 3, 3, 3]), vec![2, 3]);
        assert_eq!(remove_pairs(&[4, 4]), Vec::<u32>::new());
        assert_eq!(remove_pairs(&[1, 2, 5]), vec![1, 2, 5]);
    }

    #[test]
    fn test_canonical_ignores_order_zeros_and_pairs() {
        let a = GameState::new(vec![5, 0, 3, 1, 3]);
        let b = GameState::new(vec![1, 5]);
        assert_eq!(a.canonical(), b.canonical());
        assert!(GameState::new(vec![2, 2, 0]).canonical().is_empty());
    }

    #[test]
    fn test_parse_piles() {
        assert_eq!(parse_piles("1,3,4,5").unwrap(), GameState::default());
        assert_eq!(parse_piles(" 2 0  7 ").unwrap().piles(), &[2, 0, 7]);
        assert_eq!(
            parse_piles("1,-3"),
            Err(Error::InvalidPiles {
                input: "1,-3".to_string()
            })
        );
        assert!(parse_piles("").is_err());
    }

    #[test]
    fn test_parse_piles_rejects_too_many_stones() {
        assert_eq!(
            parse_piles("300000"),
            Err(Error::TooManyStones {
                total: 300_000,
                max: MAX_TOTAL_STONES
            })
        );
        // the limit applies to the sum, not to single piles
        assert!(matches!(
            parse_piles("300,300"),
            Err(Error::TooManyStones { total: 600, .. })
        ));
        assert!(matches!(
            parse_piles("4294967295,4294967295"),
            Err(Error::TooManyStones { .. })
        ));
        assert_eq!(
            parse_piles("256,256").unwrap().total_stones(),
            MAX_TOTAL_STONES
        );
    }

    #[test]
    fn test_move_display_is_one_based() {
        assert_eq!(Move::new(2, 1).to_string(), "remove 1 stone from pile 3");
        assert_eq!(Move::new(0, 4).to_string(), "remove 4 stones from pile 1");
    }
}
