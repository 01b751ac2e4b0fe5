use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use super::{create, open, read_be, write_be, PageFile, Probability, ProbabilityMap, TablePaths};
use super::{CHANCE_WIDTH, OUTCOME_SENTINEL};
use crate::board::Board;
use crate::error::{Result, TableError};

/// What the table says to do from a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The board already satisfies the target.
    NoMoveNeeded,
    /// No move leads anywhere with a nonzero chance (or no move is legal).
    NoMovePossible,
    /// Play move `i` of the board parameters.
    Move(u8),
}

impl MoveOutcome {
    /// The index byte stored on disk.
    #[inline]
    pub fn to_byte(self) -> u8 {
        match self {
            MoveOutcome::Move(i) => i,
            MoveOutcome::NoMoveNeeded | MoveOutcome::NoMovePossible => OUTCOME_SENTINEL,
        }
    }

    /// Decode an index byte; the sentinel is disambiguated by the probability.
    #[inline]
    pub fn from_byte(byte: u8, probability: Probability) -> Self {
        match byte {
            OUTCOME_SENTINEL if probability == 0 => MoveOutcome::NoMovePossible,
            OUTCOME_SENTINEL => MoveOutcome::NoMoveNeeded,
            i => MoveOutcome::Move(i),
        }
    }

    #[inline]
    pub fn move_index(self) -> Option<usize> {
        match self {
            MoveOutcome::Move(i) => Some(i as usize),
            _ => None,
        }
    }
}

/// One row of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageEntry {
    pub board: Board,
    pub probability: Probability,
    pub outcome: MoveOutcome,
}

/// Writes the index and chance files of a page, row by row.
pub struct PageWriter<W: Write> {
    index: W,
    chance: W,
    written: u64,
}

impl<W: Write> PageWriter<W> {
    pub fn new(index: W, chance: W) -> Self { Self { index, chance, written: 0 } }

    pub fn write(&mut self, probability: Probability, outcome: MoveOutcome) -> Result<()> {
        debug_assert!(probability < 1 << (8 * CHANCE_WIDTH));
        self.index.write_all(&[outcome.to_byte()])?;
        write_be(&mut self.chance, probability, CHANCE_WIDTH)?;
        self.written += 1;
        Ok(())
    }

    /// Flush both files and return the number of rows written.
    pub fn finish(mut self) -> Result<u64> {
        self.index.flush()?;
        self.chance.flush()?;
        Ok(self.written)
    }
}

impl PageWriter<BufWriter<File>> {
    /// Create (truncating) the index and chance files for `sum`.
    pub fn create(paths: &TablePaths, sum: u32) -> Result<Self> {
        Ok(Self::new(create(&paths.page(sum, PageFile::Index))?, create(&paths.page(sum, PageFile::Chance))?))
    }
}

/// Streams the rows of a page: list, chance and index files in lock-step.
pub struct PageEntries<R> {
    list: R,
    chance: R,
    index: R,
    width: usize,
    sum: u32,
    read: u64,
    done: bool,
}

impl<R: Read> PageEntries<R> {
    pub fn new(list: R, chance: R, index: R, width: usize, sum: u32) -> Self {
        Self { list, chance, index, width, sum, read: 0, done: false }
    }

    fn read_entry(&mut self) -> Result<Option<PageEntry>> {
        let index = read_be(&mut self.index, 1)?;
        let board = read_be(&mut self.list, self.width)?;
        let chance = read_be(&mut self.chance, CHANCE_WIDTH)?;
        match (board, chance, index) {
            (None, None, None) => Ok(None),
            (Some(board), Some(probability), Some(byte)) => {
                self.read += 1;
                Ok(Some(PageEntry {
                    board: Board::from_raw(board),
                    probability,
                    outcome: MoveOutcome::from_byte(byte as u8, probability),
                }))
            }
            (board, _, _) => Err(TableError::Misaligned {
                sum: self.sum,
                boards: self.read + board.is_some() as u64,
                entries: self.read + (index.is_some() && chance.is_some()) as u64,
            }),
        }
    }
}

impl<R: Read> Iterator for PageEntries<R> {
    type Item = Result<PageEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_entry().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Open the page for `sum` for streaming.
pub fn iterate_page_entries(paths: &TablePaths, sum: u32, width: usize) -> Result<PageEntries<BufReader<File>>> {
    Ok(PageEntries::new(
        open(&paths.page(sum, PageFile::List))?,
        open(&paths.page(sum, PageFile::Chance))?,
        open(&paths.page(sum, PageFile::Index))?,
        width,
        sum,
    ))
}

/// Look up one board by streaming its page. Stops as soon as the ascending
/// stream passes the board.
pub fn read_single_entry(paths: &TablePaths, sum: u32, width: usize, board: Board) -> Result<PageEntry> {
    for entry in iterate_page_entries(paths, sum, width)? {
        let entry = entry?;
        if entry.board == board {
            return Ok(entry);
        }
        if entry.board > board {
            break;
        }
    }
    Err(TableError::MissingBoard { board, sum })
}

/// Fill in probabilities for the (ascending) boards already in `map`, reading
/// only one pass over the page. Every board in `map` must be in the page.
pub fn fill_map(paths: &TablePaths, width: usize, map: &mut ProbabilityMap) -> Result<()> {
    let sum = map.sum();
    let mut entries = iterate_page_entries(paths, sum, width)?;
    let boards = map.boards().to_vec();
    for (i, board) in boards.into_iter().enumerate() {
        loop {
            let entry = entries.next().transpose()?.ok_or(TableError::MissingBoard { board, sum })?;
            if entry.board == board {
                map.probabilities_mut()[i] = entry.probability;
                break;
            }
            if entry.board > board {
                return Err(TableError::MissingBoard { board, sum });
            }
        }
    }
    Ok(())
}
