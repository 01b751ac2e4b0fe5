use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use tablebase_2048::board::{has_tile, Board};
use tablebase_2048::generator::{make_tables, GenerateOptions};
use tablebase_2048::lister::{list_positions, ListOptions};
use tablebase_2048::query::{move_probabilities, query};
use tablebase_2048::seeds::SeedSet;
use tablebase_2048::store::{TablePaths, PROBABILITY_ONE};
use tablebase_2048::Config;

#[derive(Debug, Parser)]
#[command(name = "tablebase-2048", about = "Build and query exact win-probability tables for 2048-style boards")]
struct Args {
    /// TOML file with board_size, moves and optional seeds / target_tile
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Forward pass: list every board reachable from the seeds
    List {
        /// Output directory for <sum>-list.txt files
        #[arg(long)]
        lists: PathBuf,
        /// Lists from an earlier run to merge with instead of re-expanding
        #[arg(long)]
        preexisting: Option<PathBuf>,
        /// Extra seed boards (hex)
        #[arg(long = "seed", value_parser = parse_board)]
        seeds: Vec<Board>,
        /// Also seed every two-tile starting position
        #[arg(long)]
        initial: bool,
        #[arg(long)]
        progress: bool,
    },
    /// Backward pass: best move and success probability for every listed board
    Generate {
        /// Directory holding the lists
        #[arg(long)]
        lists: PathBuf,
        /// Output directory for index and chance files (defaults to --lists)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Lists of a table to reuse
        #[arg(long, requires = "preexisting_data")]
        preexisting_lists: Option<PathBuf>,
        /// Index and chance files of a table to reuse
        #[arg(long, requires = "preexisting_lists")]
        preexisting_data: Option<PathBuf>,
        /// Exponent of the winning tile; overrides the config
        #[arg(long)]
        target_tile: Option<u8>,
        /// Worker threads (default: all cores)
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        sequential: bool,
        #[arg(long)]
        progress: bool,
    },
    /// Look up one board
    Query {
        #[arg(long)]
        lists: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        /// Board (hex)
        #[arg(value_parser = parse_board)]
        board: Board,
        /// Also print the success probability of every legal move
        #[arg(long)]
        all_moves: bool,
    },
}

fn parse_board(s: &str) -> Result<Board, std::num::ParseIntError> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map(Board::from_raw)
}

fn as_fraction(p: u64) -> f64 { p as f64 / PROBABILITY_ONE as f64 }

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = Config::from_toml(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let params = &config.params;
    let size = params.board_size();

    match args.cmd {
        Cmd::List { lists, preexisting, seeds, initial, progress } => {
            let mut set = if initial { SeedSet::starting_positions(size) } else { SeedSet::new(size) };
            set.extend(config.seeds.iter().copied().chain(seeds));
            if set.is_empty() {
                bail!("no seeds: pass --seed, --initial or set `seeds` in the config");
            }
            let summary = list_positions(params, &lists, &set, &ListOptions { preexisting, progress })
                .with_context(|| format!("listing positions into {}", lists.display()))?;
            info!("Listed {} boards over {} sums ({} expanded)", summary.boards, summary.layers, summary.expanded);
        }
        Cmd::Generate { lists, data, preexisting_lists, preexisting_data, target_tile, workers, sequential, progress } => {
            let Some(target) = target_tile.or(config.target_tile) else {
                bail!("no target tile: pass --target-tile or set `target_tile` in the config");
            };
            let paths = TablePaths::new(&lists, data.unwrap_or_else(|| lists.clone()));
            let preexisting = preexisting_lists.zip(preexisting_data).map(|(l, d)| TablePaths::new(l, d));
            let options = GenerateOptions { preexisting, workers, sequential, progress };
            let summary = make_tables(params, &paths, |b| has_tile(b, size, target), &options)
                .with_context(|| format!("generating tables into {}", paths.data.display()))?;
            info!(
                "Solved {} boards over {} sums ({} reused, {} won, {} lost)",
                summary.boards, summary.layers, summary.prefilled, summary.won, summary.lost
            );
        }
        Cmd::Query { lists, data, board, all_moves } => {
            if !board.fits(size) {
                bail!("{board:?} has tiles beyond a board of {size} tiles");
            }
            let paths = TablePaths::new(&lists, data.unwrap_or_else(|| lists.clone()));
            let entry = query(params, &paths, board).context("looking up board")?;
            println!("{:?}: {:.6} {:?}", entry.board, as_fraction(entry.probability), entry.outcome);
            if all_moves {
                for (i, p) in move_probabilities(params, &paths, board).context("computing move probabilities")? {
                    println!("  {:>8}: {:.6}", params.moves()[i].name, as_fraction(p));
                }
            }
        }
    }
    Ok(())
}
