//! tablebase-2048: exhaustive win-probability tables for generalized 2048 boards
//!
//! This crate provides:
//! - A packed `Board` (one nibble per tile) and a move/spawn simulator for
//!   arbitrary board shapes described as columns (`board`, `movement`, `params`)
//! - A forward pass listing every reachable board per tile sum (`lister`)
//! - A backward pass computing the best move and exact success probability
//!   for every listed board (`generator`)
//! - The paged on-disk format both passes share, and lookups against it
//!   (`store`, `query`)
//!
//! Quick start:
//! ```
//! use tablebase_2048::board::{has_tile, Board};
//! use tablebase_2048::generator::{make_tables, GenerateOptions};
//! use tablebase_2048::lister::{list_positions, ListOptions};
//! use tablebase_2048::params::{BoardParameters, MoveSpec};
//! use tablebase_2048::query::query;
//! use tablebase_2048::seeds::SeedSet;
//! use tablebase_2048::store::{MoveOutcome, TablePaths};
//!
//! // A 1x3 strip with left and right moves
//! let params = BoardParameters::new(3, vec![
//!     MoveSpec::new("left", vec![vec![0, 1, 2]], vec![]),
//!     MoveSpec::new("right", vec![vec![2, 1, 0]], vec![]),
//! ]).unwrap();
//! let dir = tempfile::tempdir().unwrap();
//! let paths = TablePaths::single(dir.path());
//!
//! list_positions(&params, dir.path(), &SeedSet::starting_positions(3), &ListOptions::default()).unwrap();
//! make_tables(&params, &paths, |b| has_tile(b, 3, 4), &GenerateOptions::default()).unwrap();
//!
//! let entry = query(&params, &paths, Board::from_raw(0x011)).unwrap();
//! assert!(matches!(entry.outcome, MoveOutcome::Move(_) | MoveOutcome::NoMovePossible));
//! ```
//!
pub mod board;
pub mod error;
pub mod generator;
pub mod lister;
pub mod movement;
pub mod params;
mod progress;
pub mod query;
pub mod seeds;
pub mod store;
pub mod tree;

pub use board::Board;
pub use error::{Result, TableError};
pub use params::{BoardParameters, Config, MoveSpec};
