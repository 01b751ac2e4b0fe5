//! Backward pass: optimal move and success probability for every listed board.
//!
//! Sums are walked from the maximum down. A layer only depends on the two
//! layers above it (a move keeps the sum, the spawn adds 2 or 4), which are
//! kept in memory as [`ProbabilityMap`]s and rotated down one step per layer.
//! Boards within a layer are independent, so each layer is solved on the
//! rayon pool and written back in list order.

use std::fs;
use std::mem;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::board::{max_sum, Board};
use crate::error::{Result, TableError};
use crate::movement::{legal_moves, spawn_pairs};
use crate::params::BoardParameters;
use crate::progress::layer_bar;
use crate::store::{
    iterate_page_entries, read_board_list, same_dir, MoveOutcome, PageWriter, Probability, ProbabilityMap, TablePaths,
    PROBABILITY_ONE,
};

#[derive(Clone, Debug, Default)]
pub struct GenerateOptions {
    /// Table from an earlier run whose entries are copied instead of recomputed.
    /// Every board it lists must also be in the new lists.
    pub preexisting: Option<TablePaths>,
    /// Size of a dedicated rayon pool; the global pool when unset.
    pub workers: Option<usize>,
    /// Solve each layer on the calling thread.
    pub sequential: bool,
    /// Show a progress bar on stderr.
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateSummary {
    pub layers: usize,
    pub boards: u64,
    /// Entries copied from the preexisting table.
    pub prefilled: u64,
    /// Boards already satisfying the target.
    pub won: u64,
    /// Boards with probability 0.
    pub lost: u64,
}

type Solved = (Probability, MoveOutcome);

/// Compute the table for every board in `paths.lists`, writing index and
/// chance files into `paths.data`. `target` marks boards that count as won.
pub fn make_tables<F>(
    params: &BoardParameters,
    paths: &TablePaths,
    target: F,
    options: &GenerateOptions,
) -> Result<GenerateSummary>
where
    F: Fn(Board) -> bool + Sync,
{
    let size = params.board_size();
    let width = params.board_width();
    let max = max_sum(size);
    if let Some(pre) = &options.preexisting {
        if same_dir(&pre.data, &paths.data) {
            return Err(TableError::InvalidParameters(format!(
                "preexisting table in {} would be overwritten by the output",
                pre.data.display()
            )));
        }
    }
    fs::create_dir_all(&paths.data).map_err(|source| TableError::File { path: paths.data.clone(), source })?;
    let pool = options.workers.map(|n| ThreadPoolBuilder::new().num_threads(n).build()).transpose()?;

    info!("Beginning table generation: {} tiles, {} moves, max sum {max}", size, params.num_moves());
    let pb = layer_bar(max as u64 / 2 + 1, options.progress, "generating")?;
    let mut summary = GenerateSummary::default();
    let mut plus_two = ProbabilityMap::empty(max + 2);
    let mut plus_four = ProbabilityMap::empty(max + 4);
    for sum in (0..=max).rev().step_by(2) {
        let start = Instant::now();
        let boards = read_board_list(&paths.lists, sum, width)?;
        let mut known: Vec<Option<Solved>> = vec![None; boards.len()];
        let prefilled = match &options.preexisting {
            Some(pre) => prefill(pre, sum, width, &boards, &mut known)?,
            None => 0,
        };

        // Spawns from the top two layers would overshoot the maximum sum.
        let layer = Layer { params, plus_two: &plus_two, plus_four: &plus_four, expandable: max - sum >= 4 };
        let solve = |(board, known): (&Board, &Option<Solved>)| match known {
            Some(entry) => Ok(*entry),
            None => layer.solve(*board, &target),
        };
        let solved: Vec<Solved> = if options.sequential {
            boards.iter().zip(&known).map(&solve).collect::<Result<_>>()?
        } else {
            let run = || boards.par_iter().zip(&known).map(&solve).collect::<Result<Vec<_>>>();
            match &pool {
                Some(pool) => pool.install(run)?,
                None => run()?,
            }
        };

        let mut page = PageWriter::create(paths, sum)?;
        for &(probability, outcome) in &solved {
            page.write(probability, outcome)?;
        }
        page.finish()?;

        let won = solved.iter().filter(|(_, o)| *o == MoveOutcome::NoMoveNeeded).count() as u64;
        let lost = solved.iter().filter(|(p, _)| *p == 0).count() as u64;
        summary.layers += 1;
        summary.boards += boards.len() as u64;
        summary.prefilled += prefilled;
        summary.won += won;
        summary.lost += lost;
        info!("Sum={sum}; Number of boards={}; prefilled={prefilled}; time {:?}", boards.len(), start.elapsed());
        debug!("Sum={sum}; won={won}; lost={lost}");

        let probabilities = solved.into_iter().map(|(p, _)| p).collect();
        plus_four = mem::replace(&mut plus_two, ProbabilityMap::with_probabilities(sum, boards, probabilities));
        pb.set_message(format!("sum {sum}"));
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(summary)
}

/// Success probability of a board right after a move, before the spawn:
/// `(four + 9 * two) / (10 * blanks)` over every blank, where `two` / `four`
/// are the summed probabilities of the spawn results. Every spawn result must
/// be in its layer.
pub fn move_success(
    moved: Board,
    board_size: usize,
    plus_two: &ProbabilityMap,
    plus_four: &ProbabilityMap,
) -> Result<Probability> {
    let (mut two, mut four, mut blanks) = (0, 0, 0);
    for (with_two, with_four) in spawn_pairs(moved, board_size) {
        two += plus_two.get(with_two)?;
        four += plus_four.get(with_four)?;
        blanks += 1;
    }
    if blanks == 0 {
        return Ok(0);
    }
    Ok((four + 9 * two) / (10 * blanks))
}

/// The completed layers a sum is solved against.
struct Layer<'a> {
    params: &'a BoardParameters,
    plus_two: &'a ProbabilityMap,
    plus_four: &'a ProbabilityMap,
    expandable: bool,
}

impl Layer<'_> {
    fn solve<F: Fn(Board) -> bool>(&self, board: Board, target: &F) -> Result<Solved> {
        if target(board) {
            return Ok((PROBABILITY_ONE, MoveOutcome::NoMoveNeeded));
        }
        let mut best = (0, MoveOutcome::NoMovePossible);
        if !self.expandable {
            return Ok(best);
        }
        for (index, moved) in legal_moves(board, self.params) {
            let p = move_success(moved, self.params.board_size(), self.plus_two, self.plus_four)?;
            // first index wins ties
            if p > best.0 {
                best = (p, MoveOutcome::Move(index as u8));
            }
        }
        Ok(best)
    }
}

/// Copy entries of the preexisting page into `known`, returning how many.
fn prefill(pre: &TablePaths, sum: u32, width: usize, boards: &[Board], known: &mut [Option<Solved>]) -> Result<u64> {
    let mut i = 0;
    let mut copied = 0;
    for entry in iterate_page_entries(pre, sum, width)? {
        let entry = entry?;
        while i < boards.len() && boards[i] < entry.board {
            i += 1;
        }
        if i == boards.len() || boards[i] != entry.board {
            return Err(TableError::MissingBoard { board: entry.board, sum });
        }
        known[i] = Some((entry.probability, entry.outcome));
        i += 1;
        copied += 1;
    }
    Ok(copied)
}
