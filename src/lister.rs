//! Forward pass: list every board reachable from the seeds.
//!
//! Sums only grow (a move keeps the sum, a spawn adds 2 or 4), so the pass
//! walks sums upward holding three tries: the current layer and the pending
//! layers at +2 and +4. Each layer is written as a sorted, deduplicated list
//! file before it is expanded.

use std::fs;
use std::io::{Read, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};

use crate::board::{max_sum, Board};
use crate::error::{Result, TableError};
use crate::movement::{iterate_moves, iterate_spawns};
use crate::params::BoardParameters;
use crate::progress::layer_bar;
use crate::seeds::SeedSet;
use crate::store::{same_dir, BoardReader, BoardWriter};
use crate::tree::BoardTree;

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// Directory holding list files from an earlier run. Its boards are
    /// carried into the output and are not expanded again.
    pub preexisting: Option<PathBuf>,
    /// Show a progress bar on stderr.
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListSummary {
    /// Number of list files written (one per even sum up to the maximum).
    pub layers: usize,
    /// Boards written across all layers.
    pub boards: u64,
    /// Boards expanded in this run (excludes boards already in the preexisting lists).
    pub expanded: u64,
}

/// List positions reachable from `seeds` into `output_dir`, one file per sum.
pub fn list_positions(
    params: &BoardParameters,
    output_dir: &Path,
    seeds: &SeedSet,
    options: &ListOptions,
) -> Result<ListSummary> {
    let size = params.board_size();
    let width = params.board_width();
    let max = max_sum(size);
    debug_assert_eq!(seeds.board_size(), size);
    if let Some(dir) = &options.preexisting {
        if same_dir(dir, output_dir) {
            return Err(TableError::InvalidParameters(format!(
                "preexisting lists in {} would be overwritten by the output",
                dir.display()
            )));
        }
    }
    if let Some(sum) = seeds.sums().find(|&s| s > max) {
        warn!("Seeds with sum {sum} exceed the maximum sum {max} and will be ignored");
    }
    fs::create_dir_all(output_dir).map_err(|source| TableError::File { path: output_dir.to_path_buf(), source })?;

    info!("Beginning board listing: {} tiles, {} moves, max sum {max}", size, params.num_moves());
    let pb = layer_bar(max as u64 / 2 + 1, options.progress, "listing")?;
    let mut summary = ListSummary::default();
    let mut plus_zero = BoardTree::new(size);
    let mut plus_two = BoardTree::new(size);
    let mut plus_four = BoardTree::new(size);
    for sum in (0..=max).step_by(2) {
        if let Some(seeded) = seeds.get(sum) {
            plus_zero.merge(seeded);
        }
        let mut output = BoardWriter::create(output_dir, sum, width)?;
        if let Some(dir) = &options.preexisting {
            let mut known = BoardReader::open(dir, sum, width)?;
            let fresh = plus_zero.len();
            plus_zero = merge_preexisting(&plus_zero, &mut known, &mut output)?;
            debug!("Sum={sum}; {} of {fresh} boards are new", plus_zero.len());
        } else {
            for board in &plus_zero {
                output.write(board)?;
            }
        }
        let written = output.finish()?;
        summary.layers += 1;
        summary.boards += written;
        info!("Sum={sum}; Number of boards={written}");

        // From the last two layers even a +2 spawn would overshoot the maximum.
        if max - sum >= 4 {
            let start = Instant::now();
            expand(params, &plus_zero, &mut plus_two, &mut plus_four);
            summary.expanded += plus_zero.len() as u64;
            info!("Sum={sum}; expanded {} boards in {:?}", plus_zero.len(), start.elapsed());
        }
        plus_zero = mem::replace(&mut plus_two, mem::replace(&mut plus_four, BoardTree::new(size)));
        pb.set_message(format!("sum {sum}"));
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(summary)
}

/// Stream-merge a freshly enumerated layer with a preexisting sorted list.
///
/// Writes the union to `output` in ascending order and returns only the boards
/// the preexisting list didn't have. Every board in `fresh` is compared
/// against the stream exactly once.
pub fn merge_preexisting<R: Read, W: Write>(
    fresh: &BoardTree,
    preexisting: &mut BoardReader<R>,
    output: &mut BoardWriter<W>,
) -> Result<BoardTree> {
    let mut novel = BoardTree::new(fresh.depth());
    let mut known = preexisting.next_board()?;
    for board in fresh {
        while known < board {
            output.write(known)?;
            known = preexisting.next_board()?;
        }
        // On equality the board goes out later, as `known`.
        if known > board {
            output.write(board)?;
            novel.add(board);
        }
    }
    while known != Board::END {
        output.write(known)?;
        known = preexisting.next_board()?;
    }
    Ok(novel)
}

/// Insert every move+spawn successor of `frontier` into the +2 / +4 layers.
pub fn expand(params: &BoardParameters, frontier: &BoardTree, plus_two: &mut BoardTree, plus_four: &mut BoardTree) {
    let size = params.board_size();
    for board in frontier {
        iterate_moves(board, params.moves(), |_, moved| {
            iterate_spawns(moved, size, |b| { plus_two.add(b); }, |b| { plus_four.add(b); });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MoveSpec;
    use crate::store::read_board_list;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn line2() -> BoardParameters {
        BoardParameters::new(2, vec![MoveSpec::new("left", vec![vec![0, 1]], vec![]), MoveSpec::new("right", vec![vec![1, 0]], vec![])])
            .unwrap()
    }

    fn raw(boards: &[Board]) -> Vec<u64> { boards.iter().map(|b| b.raw()).collect() }

    #[test]
    fn merge_with_preexisting_list() {
        let mut fresh = BoardTree::new(2);
        fresh.extend([30, 5, 20, 7].map(Board::from_raw));
        let mut known = BoardReader::new(Cursor::new(vec![5u8, 9, 20]), 1);
        let mut out = Vec::new();
        let mut writer = BoardWriter::new(&mut out, 1);
        let novel = merge_preexisting(&fresh, &mut known, &mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), 5);
        assert_eq!(out, vec![5, 7, 9, 20, 30]);
        assert_eq!(novel.iter().map(|b| b.raw()).collect::<Vec<_>>(), vec![7, 30]);
    }

    #[test]
    fn merge_against_empty_sides() {
        let empty = BoardTree::new(2);
        let mut known = BoardReader::new(Cursor::new(vec![1u8, 2]), 1);
        let mut out = Vec::new();
        let novel = merge_preexisting(&empty, &mut known, &mut BoardWriter::new(&mut out, 1)).unwrap();
        assert!(novel.is_empty());
        assert_eq!(out, vec![1, 2]);

        let mut fresh = BoardTree::new(2);
        fresh.extend([3, 1].map(Board::from_raw));
        let mut nothing = BoardReader::new(Cursor::new(Vec::new()), 1);
        let mut out = Vec::new();
        let novel = merge_preexisting(&fresh, &mut nothing, &mut BoardWriter::new(&mut out, 1)).unwrap();
        assert_eq!(novel.len(), 2);
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn lists_two_tile_line() {
        let params = line2();
        let dir = tempdir().unwrap();
        let mut seeds = SeedSet::new(2);
        seeds.add(Board::from_raw(0x01));
        let summary = list_positions(&params, dir.path(), &seeds, &ListOptions::default()).unwrap();
        assert_eq!(summary.layers, 7);
        let layer = |sum| raw(&read_board_list(dir.path(), sum, 1).unwrap());
        assert!(layer(0).is_empty());
        assert_eq!(layer(2), vec![0x01]);
        assert_eq!(layer(4), vec![0x11]);
        assert_eq!(layer(6), vec![0x12, 0x21]);
        assert_eq!(layer(8), vec![0x22]);
        assert_eq!(layer(10), vec![0x13, 0x31]);
        assert_eq!(layer(12), vec![0x23, 0x32]);
        assert_eq!(summary.boards, 9);
        // sums 10 and 12 are never expanded
        assert_eq!(summary.expanded, 5);
    }

    #[test]
    fn rerun_against_preexisting_lists() {
        let params = line2();
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let mut seeds = SeedSet::new(2);
        seeds.add(Board::from_raw(0x01));
        list_positions(&params, first.path(), &seeds, &ListOptions::default()).unwrap();

        // a new seed reaches boards the first run never saw
        seeds.add(Board::from_raw(0x02));
        let opts = ListOptions { preexisting: Some(first.path().to_path_buf()), progress: false };
        let summary = list_positions(&params, second.path(), &seeds, &opts).unwrap();
        let layer = |sum| raw(&read_board_list(second.path(), sum, 1).unwrap());
        assert_eq!(layer(4), vec![0x02, 0x11]);
        assert_eq!(layer(6), vec![0x12, 0x21]);
        assert_eq!(layer(8), vec![0x22]);
        // only 0x02 is new; its successors 0x21 and 0x22 were already listed
        assert_eq!(summary.expanded, 1);

        for spelling in [second.path().to_path_buf(), second.path().join(".")] {
            let same = ListOptions { preexisting: Some(spelling), progress: false };
            assert!(matches!(
                list_positions(&params, second.path(), &seeds, &same),
                Err(TableError::InvalidParameters(_))
            ));
        }
    }
}
