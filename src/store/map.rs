use super::Probability;
use crate::board::Board;
use crate::error::{Result, TableError};

/// Sorted boards of one page with a probability per board.
///
/// Lookups are by exact board value; every board asked for must be present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbabilityMap {
    sum: u32,
    boards: Vec<Board>,
    probabilities: Vec<Probability>,
}

impl ProbabilityMap {
    /// A map over `boards` (ascending) with every probability at 0.
    pub fn new(sum: u32, boards: Vec<Board>) -> Self {
        debug_assert!(boards.windows(2).all(|w| w[0] < w[1]), "boards for sum {sum} are not ascending");
        let probabilities = vec![0; boards.len()];
        Self { sum, boards, probabilities }
    }

    /// A map whose probabilities are already known.
    pub fn with_probabilities(sum: u32, boards: Vec<Board>, probabilities: Vec<Probability>) -> Self {
        debug_assert_eq!(boards.len(), probabilities.len());
        Self { sum, boards, probabilities }
    }

    /// An empty page, for layers past the maximum sum.
    pub fn empty(sum: u32) -> Self { Self { sum, ..Self::default() } }

    #[inline]
    pub fn sum(&self) -> u32 { self.sum }

    #[inline]
    pub fn len(&self) -> usize { self.boards.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.boards.is_empty() }

    #[inline]
    pub fn boards(&self) -> &[Board] { &self.boards }

    #[inline]
    pub fn probabilities(&self) -> &[Probability] { &self.probabilities }

    #[inline]
    pub fn probabilities_mut(&mut self) -> &mut [Probability] { &mut self.probabilities }

    /// Row of `board`, if present.
    #[inline]
    pub fn position(&self, board: Board) -> Option<usize> { self.boards.binary_search(&board).ok() }

    /// Probability of `board`.
    pub fn get(&self, board: Board) -> Result<Probability> {
        self.position(board)
            .map(|i| self.probabilities[i])
            .ok_or(TableError::MissingBoard { board, sum: self.sum })
    }

    /// Sum of all stored probabilities.
    pub fn total(&self) -> u64 { self.probabilities.iter().sum() }
}
