//! Board shape and move configuration.
//!
//! A board is an arbitrary set of `board_size` tile positions. Moves are
//! described by columns (ordered lists of positions) rather than directions,
//! so any shape can be expressed. Configuration is usually loaded from TOML:
//!
//! ```toml
//! board_size = 4
//! target_tile = 5
//! seeds = [0x0011]
//!
//! [[moves]]
//! name = "left"
//! movable = [[0, 1], [2, 3]]
//!
//! [[moves]]
//! name = "right"
//! movable = [[1, 0], [3, 2]]
//! immovable = []
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::board::{Board, Tile, MAX_PLAYABLE_SIZE};
use crate::error::{Result, TableError};
use crate::store::OUTCOME_SENTINEL;

/// An ordered list of tile positions. Tiles slide toward the first entry.
pub type Column = Vec<usize>;

/// A single move: columns that slide, plus columns that must stay locked.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MoveSpec {
    /// Display name; only used by front ends and log lines.
    #[serde(default)]
    pub name: String,
    pub movable: Vec<Column>,
    /// Columns that must be locked (full, no equal neighbours) for the move to be legal.
    #[serde(default)]
    pub immovable: Vec<Column>,
}

impl MoveSpec {
    pub fn new(name: impl Into<String>, movable: Vec<Column>, immovable: Vec<Column>) -> Self {
        Self { name: name.into(), movable, immovable }
    }
}

/// Immutable board configuration shared by every pass.
///
/// `moves[i]` is the move stored as index `i` in the tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardParameters {
    board_size: usize,
    moves: Vec<MoveSpec>,
}

impl BoardParameters {
    /// Validate and build a configuration.
    ///
    /// ```
    /// use tablebase_2048::params::{BoardParameters, MoveSpec};
    /// let p = BoardParameters::new(2, vec![
    ///     MoveSpec::new("left", vec![vec![0, 1]], vec![]),
    ///     MoveSpec::new("right", vec![vec![1, 0]], vec![]),
    /// ]).unwrap();
    /// assert_eq!(p.num_moves(), 2);
    /// assert!(BoardParameters::new(0, vec![]).is_err());
    /// ```
    pub fn new(board_size: usize, moves: Vec<MoveSpec>) -> Result<Self> {
        if board_size == 0 || board_size > MAX_PLAYABLE_SIZE {
            return Err(TableError::InvalidParameters(format!(
                "board_size must be in 1..={MAX_PLAYABLE_SIZE}, got {board_size}"
            )));
        }
        if moves.is_empty() {
            return Err(TableError::InvalidParameters("at least one move is required".into()));
        }
        if moves.len() > OUTCOME_SENTINEL as usize {
            return Err(TableError::InvalidParameters(format!(
                "at most {OUTCOME_SENTINEL} moves fit in a one-byte index, got {}",
                moves.len()
            )));
        }
        for (i, mv) in moves.iter().enumerate() {
            for column in mv.movable.iter().chain(&mv.immovable) {
                if column.is_empty() {
                    return Err(TableError::InvalidParameters(format!("move {i} has an empty column")));
                }
                if let Some(&bad) = column.iter().find(|&&idx| idx >= board_size) {
                    return Err(TableError::InvalidParameters(format!(
                        "move {i} references tile {bad} on a board of {board_size} tiles"
                    )));
                }
            }
        }
        Ok(Self { board_size, moves })
    }

    #[inline]
    pub fn board_size(&self) -> usize { self.board_size }

    #[inline]
    pub fn moves(&self) -> &[MoveSpec] { &self.moves }

    #[inline]
    pub fn num_moves(&self) -> usize { self.moves.len() }

    /// Bytes per board in a list file: one nibble per tile, rounded up.
    #[inline]
    pub fn board_width(&self) -> usize { board_width(self.board_size) }
}

/// Bytes needed to store a board of `board_size` tiles.
#[inline]
pub fn board_width(board_size: usize) -> usize { (board_size + 1) / 2 }

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    board_size: usize,
    moves: Vec<MoveSpec>,
    #[serde(default)]
    seeds: Vec<u64>,
    target_tile: Option<Tile>,
}

/// Everything a run needs from the configuration file.
#[derive(Clone, Debug)]
pub struct Config {
    pub params: BoardParameters,
    pub seeds: Vec<Board>,
    /// Exponent of the tile that counts as a win, if the file sets one.
    pub target_tile: Option<Tile>,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents)?;
        let params = BoardParameters::new(raw.board_size, raw.moves)?;
        let seeds: Vec<Board> = raw.seeds.into_iter().map(Board::from_raw).collect();
        if let Some(bad) = seeds.iter().find(|b| !b.fits(params.board_size())) {
            return Err(TableError::InvalidParameters(format!(
                "seed {bad:?} has tiles beyond a board of {} tiles",
                params.board_size()
            )));
        }
        Ok(Self { params, seeds, target_tile: raw.target_tile })
    }

    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TableError::File { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE4: &str = r#"
board_size = 4
target_tile = 5
seeds = [0x0011, 17]

[[moves]]
name = "left"
movable = [[0, 1, 2, 3]]

[[moves]]
name = "right"
movable = [[3, 2, 1, 0]]
immovable = []
"#;

    #[test]
    fn parses_toml_config() {
        let cfg = Config::from_toml_str(LINE4).unwrap();
        assert_eq!(cfg.params.board_size(), 4);
        assert_eq!(cfg.params.num_moves(), 2);
        assert_eq!(cfg.params.moves()[1].name, "right");
        assert_eq!(cfg.params.moves()[1].movable, vec![vec![3, 2, 1, 0]]);
        assert!(cfg.params.moves()[0].immovable.is_empty());
        assert_eq!(cfg.seeds, vec![Board::from_raw(0x11), Board::from_raw(0x11)]);
        assert_eq!(cfg.target_tile, Some(5));
        assert_eq!(cfg.params.board_width(), 2);
    }

    #[test]
    fn rejects_out_of_range_column() {
        let err = BoardParameters::new(3, vec![MoveSpec::new("x", vec![vec![0, 3]], vec![])]).unwrap_err();
        assert!(matches!(err, TableError::InvalidParameters(_)));
        let err = BoardParameters::new(3, vec![MoveSpec::new("x", vec![vec![0]], vec![vec![]])]).unwrap_err();
        assert!(matches!(err, TableError::InvalidParameters(_)));
    }

    #[test]
    fn rejects_oversized_seed_and_bad_toml() {
        let bad_seed = LINE4.replace("seeds = [0x0011, 17]", "seeds = [0x10000]");
        assert!(matches!(Config::from_toml_str(&bad_seed), Err(TableError::InvalidParameters(_))));
        assert!(matches!(Config::from_toml_str("board_size = \"four\""), Err(TableError::Config(_))));
    }

    #[test]
    fn caps_board_size_below_tile_overflow() {
        let line = |n: usize| vec![MoveSpec::new("left", vec![(0..n).collect()], vec![])];
        assert!(BoardParameters::new(14, line(14)).is_ok());
        for n in [15, 16] {
            let err = BoardParameters::new(n, line(n)).unwrap_err();
            assert!(matches!(err, TableError::InvalidParameters(_)), "size {n}");
        }
        // on 15 tiles two 32768s fit under the maximum sum and their merge would not fit a nibble
        assert!(2 * 32768 <= crate::board::max_sum(15));
        assert!(2 * 32768 > crate::board::max_sum(14));
    }

    #[test]
    fn rejects_too_many_moves() {
        let moves = vec![MoveSpec::new("m", vec![vec![0, 1]], vec![]); 256];
        assert!(BoardParameters::new(2, moves).is_err());
        let moves = vec![MoveSpec::new("m", vec![vec![0, 1]], vec![]); 255];
        assert!(BoardParameters::new(2, moves).is_ok());
    }

    #[test]
    fn widths() {
        assert_eq!(board_width(1), 1);
        assert_eq!(board_width(2), 1);
        assert_eq!(board_width(9), 5);
        assert_eq!(board_width(16), 8);
    }
}
