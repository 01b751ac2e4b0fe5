//! Slide/merge simulation along arbitrary columns, and spawn enumeration.
//!
//! A column is an ordered list of tile positions; tiles slide toward the first
//! position and equal neighbours merge once per move. A move is a set of
//! movable columns plus a set of columns that must be locked for the move to
//! count. No randomness lives here: spawns are enumerated exhaustively.

use crate::board::{shift, Board};
use crate::params::{BoardParameters, Column, MoveSpec};

/// Slide and merge the tiles of one column toward `column[0]`.
///
/// Single pass with one carried tile: each nonzero tile is cleared from its
/// slot, then either held, merged with the held tile, or used to flush the
/// held tile into the next output slot.
///
/// ```
/// use tablebase_2048::board::Board;
/// use tablebase_2048::movement::move_column;
/// assert_eq!(move_column(Board::from_raw(0x1123), &[0, 1, 2, 3]), Board::from_raw(0x0223));
/// assert_eq!(move_column(Board::from_raw(0x1123), &[3, 2, 1, 0]), Board::from_raw(0x2230));
/// ```
pub fn move_column(board: Board, column: &[usize]) -> Board {
    let mut raw = board.into_raw();
    let mut held = 0u64;
    let mut out = 0usize;
    for &idx in column {
        let s = shift(idx);
        let mut readout = raw & (0xf << s);
        if readout == 0 {
            continue;
        }
        raw ^= readout;
        readout >>= s;
        if held == 0 {
            held = readout;
            continue;
        }
        // Both nonzero: something gets written. The target slot is already clear.
        let top = shift(column[out]);
        out += 1;
        if readout == held {
            raw ^= (held + 1) << top;
            held = 0;
        } else {
            raw ^= held << top;
            held = readout;
        }
    }
    if held != 0 {
        raw ^= held << shift(column[out]);
    }
    Board::from_raw(raw)
}

/// True if the column can't move in either direction: no blanks and no two
/// equal adjacent tiles along the listed order.
pub fn is_locked(board: Board, column: &[usize]) -> bool {
    let mut prev = None;
    for &idx in column {
        let tile = board.tile(idx);
        if tile == 0 || prev == Some(tile) {
            return false;
        }
        prev = Some(tile);
    }
    true
}

/// Apply a move. Returns `board` unchanged if an immovable column is unlocked
/// (illegal move) or if nothing slides.
pub fn move_board(board: Board, movable: &[Column], immovable: &[Column]) -> Board {
    if !immovable.iter().all(|column| is_locked(board, column)) {
        return board;
    }
    movable.iter().fold(board, |b, column| move_column(b, column))
}

/// [`move_board`] for a [`MoveSpec`].
#[inline]
pub fn apply_move(board: Board, mv: &MoveSpec) -> Board { move_board(board, &mv.movable, &mv.immovable) }

/// Call `f(index, moved)` for every move that changes `board`, in move order.
pub fn iterate_moves<F>(board: Board, moves: &[MoveSpec], mut f: F)
where
    F: FnMut(usize, Board),
{
    for (i, mv) in moves.iter().enumerate() {
        let moved = apply_move(board, mv);
        if moved != board {
            f(i, moved);
        }
    }
}

/// Iterator form of [`iterate_moves`]: `(index, moved)` for each legal move.
pub fn legal_moves<'a>(board: Board, params: &'a BoardParameters) -> impl Iterator<Item = (usize, Board)> + 'a {
    params
        .moves()
        .iter()
        .enumerate()
        .map(move |(i, mv)| (i, apply_move(board, mv)))
        .filter(move |&(_, moved)| moved != board)
}

/// True if no move changes the board.
pub fn is_game_over(board: Board, params: &BoardParameters) -> bool { legal_moves(board, params).next().is_none() }

/// Enumerate every board reachable by spawning one tile into a blank slot.
///
/// For each blank position in ascending index order, `on_two` receives the
/// board with a 2 (exponent 1) there, then `on_four` the board with a 4
/// (exponent 2). Calls happen in strictly ascending numeric order of the
/// resulting boards, which callers depend on when merging into sorted data.
///
/// ```
/// use tablebase_2048::board::Board;
/// use tablebase_2048::movement::iterate_spawns;
/// use std::cell::RefCell;
/// let seen = RefCell::new(Vec::new());
/// let push = |b: Board| seen.borrow_mut().push(b.raw());
/// iterate_spawns(Board::from_raw(0x1010), 4, push, push);
/// assert_eq!(seen.into_inner(), vec![0x1011, 0x1012, 0x1110, 0x1210]);
/// ```
pub fn iterate_spawns<T, F>(board: Board, board_size: usize, mut on_two: T, mut on_four: F)
where
    T: FnMut(Board),
    F: FnMut(Board),
{
    for (two, four) in spawn_pairs(board, board_size) {
        on_two(two);
        on_four(four);
    }
}

/// `(with_two, with_four)` for each blank position, ascending index.
///
/// Same order as [`iterate_spawns`]; handy when the consumer needs to bail out
/// with an error partway through.
pub fn spawn_pairs(board: Board, board_size: usize) -> impl Iterator<Item = (Board, Board)> {
    let raw = board.into_raw();
    (0..board_size).filter_map(move |i| {
        let s = shift(i);
        if raw & (0xf << s) != 0 {
            return None;
        }
        // the slot is zero, so `|` and `+` agree
        let two = raw | (1 << s);
        Some((Board::from_raw(two), Board::from_raw(two + (1 << s))))
    })
}
