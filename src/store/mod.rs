//! On-disk paged tables.
//!
//! One page per tile sum, split over three headerless binary files that are
//! aligned row by row:
//! - `<sum>-list.txt`: boards, `ceil(board_size / 2)` bytes each, big-endian, ascending
//! - `<sum>-index.txt`: one byte per board, move index or 255
//! - `<sum>-chance.txt`: 7 bytes per board, big-endian success probability
//!   numerator over [`PROBABILITY_ONE`]
//!
//! The `.txt` suffix is historical; the content is raw binary. List files may
//! live in a different directory from index/chance files ([`TablePaths`]).
//! Every reader here streams, relying on ascending board order to do point
//! lookups and merges in a single forward pass.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{Result, TableError};

mod codec;
mod map;
mod page;

pub use codec::{decode_be, read_be, read_board_list, write_be, BoardReader, BoardWriter};
pub use map::ProbabilityMap;
pub use page::{
    fill_map, iterate_page_entries, read_single_entry, MoveOutcome, PageEntries, PageEntry, PageWriter,
};

/// Fixed-point success probability: a numerator over [`PROBABILITY_ONE`].
pub type Probability = u64;

/// Certainty. The worst-case expectation denominator is 130 (13 blank slots
/// after a move, times 10), and `130 * 7e16 < 2^63`, while `7e16 < 2^56`
/// keeps every stored value within 7 bytes. The trailing zeros make the
/// 9:1 spawn weighting divide cleanly.
pub const PROBABILITY_ONE: Probability = 70_000_000_000_000_000;

/// Bytes per probability in a chance file.
pub const CHANCE_WIDTH: usize = 7;

/// Index byte meaning "no move": needed if the probability is certain, possible otherwise.
pub const OUTCOME_SENTINEL: u8 = 255;

/// The three files that make up a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageFile {
    List,
    Index,
    Chance,
}

impl PageFile {
    pub fn suffix(self) -> &'static str {
        match self {
            PageFile::List => "-list",
            PageFile::Index => "-index",
            PageFile::Chance => "-chance",
        }
    }
}

/// Path of one page file: `<dir>/<sum><suffix>.txt`.
pub fn page_path(dir: &Path, sum: u32, file: PageFile) -> PathBuf {
    dir.join(format!("{sum}{}.txt", file.suffix()))
}

/// Where a table lives: board lists, and per-board probability/index data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TablePaths {
    pub lists: PathBuf,
    pub data: PathBuf,
}

impl TablePaths {
    pub fn new(lists: impl Into<PathBuf>, data: impl Into<PathBuf>) -> Self {
        Self { lists: lists.into(), data: data.into() }
    }

    /// Lists and data in the same directory.
    pub fn single(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self { lists: dir.clone(), data: dir }
    }

    pub fn page(&self, sum: u32, file: PageFile) -> PathBuf {
        match file {
            PageFile::List => page_path(&self.lists, sum, file),
            PageFile::Index | PageFile::Chance => page_path(&self.data, sum, file),
        }
    }
}

fn file_error(path: &Path) -> impl FnOnce(std::io::Error) -> TableError + '_ {
    move |source| TableError::File { path: path.to_path_buf(), source }
}

/// True if both paths name the same directory, after resolving `.` and links
/// where the directories exist.
pub(crate) fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(file_error(path))
}

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path).map(BufWriter::new).map_err(file_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_naming() {
        let paths = TablePaths::new("lists", "data");
        assert_eq!(paths.page(12, PageFile::List), PathBuf::from("lists/12-list.txt"));
        assert_eq!(paths.page(0, PageFile::Index), PathBuf::from("data/0-index.txt"));
        assert_eq!(paths.page(262140, PageFile::Chance), PathBuf::from("data/262140-chance.txt"));
    }

    #[test]
    fn same_dir_resolves_dots() {
        let dir = tempfile::tempdir().unwrap();
        assert!(same_dir(dir.path(), &dir.path().join(".")));
        let other = tempfile::tempdir().unwrap();
        assert!(!same_dir(dir.path(), other.path()));
        // missing paths fall back to a literal comparison
        assert!(same_dir(Path::new("nowhere"), Path::new("nowhere")));
    }

    #[test]
    fn certainty_fits_in_seven_bytes() {
        assert!(PROBABILITY_ONE < 1 << (8 * CHANCE_WIDTH));
        assert!(PROBABILITY_ONE.checked_mul(130).is_some_and(|v| v < i64::MAX as u64));
        // a full spawn expectation never overflows the accumulator
        assert!((16 * PROBABILITY_ONE).checked_mul(10).is_some());
    }
}
