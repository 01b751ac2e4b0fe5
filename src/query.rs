//! Point lookups against a generated table.

use crate::board::{max_sum, Board};
use crate::error::Result;
use crate::generator::move_success;
use crate::movement::{legal_moves, spawn_pairs};
use crate::params::BoardParameters;
use crate::store::{fill_map, read_single_entry, PageEntry, Probability, ProbabilityMap, TablePaths};
use crate::tree::BoardTree;

/// Stored probability and best move for `board`.
pub fn query(params: &BoardParameters, paths: &TablePaths, board: Board) -> Result<PageEntry> {
    let sum = board.tile_sum(params.board_size());
    read_single_entry(paths, sum, params.board_width(), board)
}

/// Success probability of each legal move from `board`, in move order.
///
/// Only the spawn results of those moves are loaded from the two pages above
/// the board's sum. Boards within 4 of the maximum sum can't be expanded, so
/// every move there is worth 0.
pub fn move_probabilities(params: &BoardParameters, paths: &TablePaths, board: Board) -> Result<Vec<(usize, Probability)>> {
    let size = params.board_size();
    let sum = board.tile_sum(size);
    let moves: Vec<(usize, Board)> = legal_moves(board, params).collect();
    if sum + 4 > max_sum(size) {
        return Ok(moves.into_iter().map(|(i, _)| (i, 0)).collect());
    }

    let mut twos = BoardTree::new(size);
    let mut fours = BoardTree::new(size);
    for &(_, moved) in &moves {
        for (two, four) in spawn_pairs(moved, size) {
            twos.add(two);
            fours.add(four);
        }
    }
    let mut plus_two = ProbabilityMap::new(sum + 2, twos.iter().collect());
    let mut plus_four = ProbabilityMap::new(sum + 4, fours.iter().collect());
    fill_map(paths, params.board_width(), &mut plus_two)?;
    fill_map(paths, params.board_width(), &mut plus_four)?;

    moves
        .into_iter()
        .map(|(i, moved)| Ok((i, move_success(moved, size, &plus_two, &plus_four)?)))
        .collect()
}
