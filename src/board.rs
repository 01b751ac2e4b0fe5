use std::fmt;

type BoardRaw = u64;
/// A tile exponent: 0 is blank, `k` is the numeric value `2^k`.
pub type Tile = u8;

/// Bits per tile. Four bits is assumed throughout the crate (trie branching,
/// on-disk width, spawn arithmetic), so this is not a tunable.
pub const TILE_BITS: usize = 4;

/// Largest number of tiles a packed board can hold.
pub const MAX_BOARD_SIZE: usize = 16;

/// Largest board the simulator accepts. With 14 tiles `max_sum` is 65532, so
/// two 2^15 tiles can never meet and every merge result fits in a nibble.
pub const MAX_PLAYABLE_SIZE: usize = 14;

/// Packed board of up to 16 tiles, 4 bits each, in a `u64`.
///
/// Tile `i` occupies bits `[4i, 4i + 4)`, so tile 0 is the least significant
/// nibble. Bits beyond `4 * board_size` are always zero. Boards order by their
/// raw integer value and every streaming algorithm in the crate relies on it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Strictly greater than any board a 16-tile (or smaller) game can reach.
    ///
    /// Used as the end-of-stream marker by page readers.
    pub const END: Board = Board(BoardRaw::MAX);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub const fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub const fn into_raw(self) -> BoardRaw { self.0 }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Tile exponent at `index`.
    ///
    /// ```
    /// use tablebase_2048::board::Board;
    /// let b = Board::from_raw(0x0312);
    /// assert_eq!((b.tile(0), b.tile(1), b.tile(2), b.tile(3)), (2, 1, 3, 0));
    /// ```
    #[inline]
    pub fn tile(self, index: usize) -> Tile { ((self.0 >> shift(index)) & 0xf) as Tile }

    /// The board with the tile at `index` replaced by `tile`.
    #[inline]
    pub fn with_tile(self, index: usize, tile: Tile) -> Self {
        let s = shift(index);
        Board((self.0 & !(0xf << s)) | ((tile as BoardRaw & 0xf) << s))
    }

    /// `(index, tile)` pairs for the first `board_size` tiles, ascending index.
    #[inline]
    pub fn tiles(self, board_size: usize) -> impl Iterator<Item = (usize, Tile)> {
        (0..board_size).map(move |i| (i, self.tile(i)))
    }

    /// Sum of numeric tile values (the page key).
    pub fn tile_sum(self, board_size: usize) -> u32 {
        self.tiles(board_size).map(|(_, t)| tile_value(t)).sum()
    }

    /// Count the number of blank cells among the first `board_size` tiles.
    pub fn count_empty(self, board_size: usize) -> usize {
        self.tiles(board_size).filter(|&(_, t)| t == 0).count()
    }

    /// Highest tile exponent on the board (0 for an empty board).
    pub fn max_tile(self, board_size: usize) -> Tile {
        self.tiles(board_size).map(|(_, t)| t).max().unwrap_or(0)
    }

    /// True if no bit above `4 * board_size` is set.
    #[inline]
    pub fn fits(self, board_size: usize) -> bool {
        board_size >= MAX_BOARD_SIZE || self.0 >> shift(board_size) == 0
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::LowerHex for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::LowerHex::fmt(&self.0, f) }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.into_raw() } }

#[inline(always)]
pub(crate) fn shift(index: usize) -> usize { index * TILE_BITS }

/// Numeric value of a tile exponent, e.g. 3 -> 8. Blank is 0.
#[inline]
pub fn tile_value(tile: Tile) -> u32 { if tile == 0 { 0 } else { 1 << tile } }

/// Maximum tile sum reachable on a board with `board_size` tiles.
///
/// Filling tile 0 with a 4, tile 1 with an 8, tile 2 with a 16 and so on gives
/// this sum; no sequence of spawns and merges can exceed it.
///
/// ```
/// use tablebase_2048::board::max_sum;
/// assert_eq!(max_sum(2), 12);
/// assert_eq!(max_sum(16), 262_140);
/// ```
#[inline]
pub fn max_sum(board_size: usize) -> u32 { (4u32 << board_size) - 4 }

/// True if any tile reaches `2^exponent`. The usual "win" predicate.
#[inline]
pub fn has_tile(board: Board, board_size: usize, exponent: Tile) -> bool {
    board.max_tile(board_size) >= exponent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_get_and_set_tile() {
        let b = Board::from_raw(0x0123456789abcdef);
        assert_eq!(b.tile(0), 0xf);
        assert_eq!(b.tile(3), 0xc);
        assert_eq!(b.tile(15), 0x0);
        let b = b.with_tile(15, 7).with_tile(0, 0);
        assert_eq!(b, Board::from_raw(0x7123456789abcde0));
        assert_eq!(Board::EMPTY.with_tile(2, 1), Board::from_raw(0x100));
    }

    #[test]
    fn it_tile_sum_and_empty() {
        // tiles in index order: 2, _, 4, 8
        let b = Board::from_raw(0x3201);
        assert_eq!(b.tile_sum(4), 14);
        assert_eq!(b.count_empty(4), 1);
        assert_eq!(b.count_empty(6), 3);
        assert_eq!(b.max_tile(4), 3);
        assert!(has_tile(b, 4, 3));
        assert!(!has_tile(b, 4, 4));
    }

    #[test]
    fn it_max_sum_matches_staircase() {
        // a staircase only fits in 4-bit tiles up to 14 tiles (top tile 2^15)
        for size in 1..=14 {
            let staircase = (0..size).fold(Board::EMPTY, |b, i| b.with_tile(i, (i + 2) as Tile));
            assert_eq!(staircase.tile_sum(size), max_sum(size), "size {size}");
        }
    }

    #[test]
    fn it_fits() {
        assert!(Board::from_raw(0xfff).fits(3));
        assert!(!Board::from_raw(0x1000).fits(3));
        assert!(Board::END.fits(16));
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(Board::from_raw(0x10) > Board::from_raw(0x0f));
        assert!(Board::END > Board::from_raw(0x0fff_ffff_ffff_ffff));
    }
}
