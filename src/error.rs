use std::io;
use std::path::PathBuf;

use crate::board::Board;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },
    #[error("truncated page file {}: {len} bytes is not a multiple of {width}", path.display())]
    Truncated { path: PathBuf, len: u64, width: usize },
    /// A board that must be in a page isn't. Either the listing pass is
    /// incomplete or a preexisting table isn't a subset of the new one.
    #[error("board {board:?} missing from page for sum {sum}")]
    MissingBoard { board: Board, sum: u32 },
    #[error("page for sum {sum} is misaligned: {boards} boards but {entries} table entries")]
    Misaligned { sum: u32, boards: u64, entries: u64 },
    #[error("invalid board parameters: {0}")]
    InvalidParameters(String),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("progress template error: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TableError>;
