use std::collections::BTreeMap;

use crate::board::Board;
use crate::movement::spawn_pairs;
use crate::tree::BoardTree;

/// Seed boards for the listing pass, bucketed by tile sum.
#[derive(Clone, Debug)]
pub struct SeedSet {
    board_size: usize,
    seeds: BTreeMap<u32, BoardTree>,
}

impl SeedSet {
    pub fn new(board_size: usize) -> Self { Self { board_size, seeds: BTreeMap::new() } }

    /// Every board with two spawned tiles on an otherwise empty board.
    ///
    /// ```
    /// use tablebase_2048::seeds::SeedSet;
    /// let seeds = SeedSet::starting_positions(2);
    /// // 2+2, 2+4 / 4+2, 4+4
    /// assert_eq!(seeds.get(4).map(|t| t.len()), Some(1));
    /// assert_eq!(seeds.get(6).map(|t| t.len()), Some(2));
    /// assert_eq!(seeds.get(8).map(|t| t.len()), Some(1));
    /// ```
    pub fn starting_positions(board_size: usize) -> Self {
        let mut set = Self::new(board_size);
        for (two, four) in spawn_pairs(Board::EMPTY, board_size) {
            for single in [two, four] {
                set.extend(spawn_pairs(single, board_size).flat_map(|(a, b)| [a, b]));
            }
        }
        set
    }

    #[inline]
    pub fn board_size(&self) -> usize { self.board_size }

    /// Add `board` under its tile sum. Returns false if it was already present.
    pub fn add(&mut self, board: Board) -> bool {
        let sum = board.tile_sum(self.board_size);
        let size = self.board_size;
        self.seeds.entry(sum).or_insert_with(|| BoardTree::new(size)).add(board)
    }

    /// Seeds whose tile sum is `sum`, if any.
    pub fn get(&self, sum: u32) -> Option<&BoardTree> { self.seeds.get(&sum) }

    /// Total number of seed boards.
    pub fn len(&self) -> usize { self.seeds.values().map(BoardTree::len).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Sums that have at least one seed, ascending.
    pub fn sums(&self) -> impl Iterator<Item = u32> + '_ { self.seeds.keys().copied() }
}

impl Extend<Board> for SeedSet {
    fn extend<I: IntoIterator<Item = Board>>(&mut self, iter: I) {
        for board in iter {
            self.add(board);
        }
    }
}
