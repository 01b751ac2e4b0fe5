use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::{create, open, page_path, PageFile};
use crate::board::Board;
use crate::error::{Result, TableError};

/// Write the low `width` bytes of `value`, most significant first.
#[inline]
pub fn write_be<W: Write + ?Sized>(w: &mut W, value: u64, width: usize) -> io::Result<()> {
    debug_assert!((1..=8).contains(&width));
    w.write_all(&value.to_be_bytes()[8 - width..])
}

/// Read a `width`-byte big-endian value. `Ok(None)` on a clean end of input;
/// a record cut short is an `UnexpectedEof` error.
pub fn read_be<R: Read + ?Sized>(r: &mut R, width: usize) -> io::Result<Option<u64>> {
    debug_assert!((1..=8).contains(&width));
    let mut buf = [0u8; 8];
    let dst = &mut buf[8 - width..];
    let mut filled = 0;
    while filled < width {
        match r.read(&mut dst[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    match filled {
        0 => Ok(None),
        n if n == width => Ok(Some(u64::from_be_bytes(buf))),
        n => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("record cut short: {n} of {width} bytes"),
        )),
    }
}

/// Big-endian value of an in-memory record.
#[inline]
pub fn decode_be(bytes: &[u8]) -> u64 { bytes.iter().fold(0, |acc, &b| (acc << 8) | b as u64) }

/// Streams ascending boards from a list file.
///
/// Exhaustion is reported as [`Board::END`], which compares greater than any
/// real board, so merge loops need no separate end-of-input check.
pub struct BoardReader<R> {
    inner: R,
    width: usize,
}

impl<R: Read> BoardReader<R> {
    pub fn new(inner: R, width: usize) -> Self { Self { inner, width } }

    /// The next board, or [`Board::END`] once input is exhausted.
    pub fn next_board(&mut self) -> Result<Board> {
        Ok(read_be(&mut self.inner, self.width)?.map_or(Board::END, Board::from_raw))
    }
}

impl BoardReader<BufReader<File>> {
    /// Open the list file for `sum` in `dir`.
    pub fn open(dir: &Path, sum: u32, width: usize) -> Result<Self> {
        Ok(Self::new(open(&page_path(dir, sum, PageFile::List))?, width))
    }
}

/// Appends boards to a list file. Callers must write in ascending order.
pub struct BoardWriter<W: Write> {
    inner: W,
    width: usize,
    written: u64,
    last: Option<Board>,
}

impl<W: Write> BoardWriter<W> {
    pub fn new(inner: W, width: usize) -> Self { Self { inner, width, written: 0, last: None } }

    pub fn write(&mut self, board: Board) -> Result<()> {
        debug_assert!(self.last.map_or(true, |last| last < board), "{:?} after {:?}", board, self.last);
        write_be(&mut self.inner, board.into_raw(), self.width)?;
        self.written += 1;
        self.last = Some(board);
        Ok(())
    }

    /// Flush and return the number of boards written.
    pub fn finish(mut self) -> Result<u64> {
        self.inner.flush()?;
        Ok(self.written)
    }
}

impl BoardWriter<BufWriter<File>> {
    /// Create (truncating) the list file for `sum` in `dir`.
    pub fn create(dir: &Path, sum: u32, width: usize) -> Result<Self> {
        Ok(Self::new(create(&page_path(dir, sum, PageFile::List))?, width))
    }
}

/// Load a whole board list into memory.
pub fn read_board_list(dir: &Path, sum: u32, width: usize) -> Result<Vec<Board>> {
    let path: PathBuf = page_path(dir, sum, PageFile::List);
    let file = File::open(&path).map_err(|source| TableError::File { path: path.clone(), source })?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    if len % width as u64 != 0 {
        return Err(TableError::Truncated { path, len, width });
    }
    // Safety: page files are written once per pass and never modified while mapped.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap.chunks_exact(width).map(|chunk| Board::from_raw(decode_be(chunk))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn round_trip_every_width() {
        for size in 1..=16usize {
            let width = (size + 1) / 2;
            let top = if size == 16 { u64::MAX - 1 } else { (1u64 << (4 * size)) - 1 };
            let boards: Vec<u64> = [0, 1, 0x10, top / 3, top - 1, top].into_iter().filter(|&b| b <= top).collect();
            let mut bytes = Vec::new();
            for &b in &boards {
                write_be(&mut bytes, b, width).unwrap();
            }
            assert_eq!(bytes.len(), boards.len() * width);
            let mut r = Cursor::new(bytes);
            for &b in &boards {
                assert_eq!(read_be(&mut r, width).unwrap(), Some(b), "size {size}");
            }
            assert_eq!(read_be(&mut r, width).unwrap(), None);
        }
    }

    #[test]
    fn big_endian_layout() {
        let mut bytes = Vec::new();
        write_be(&mut bytes, 0x0123_4567, 3).unwrap();
        assert_eq!(bytes, vec![0x23, 0x45, 0x67]);
        assert_eq!(decode_be(&bytes), 0x23_4567);
    }

    #[test]
    fn cut_short_is_an_error() {
        let mut r = Cursor::new(vec![1u8, 2, 3]);
        assert_eq!(read_be(&mut r, 2).unwrap(), Some(0x0102));
        let err = read_be(&mut r, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn reader_ends_with_sentinel() {
        let mut r = BoardReader::new(Cursor::new(vec![0x00, 0x05, 0x12, 0x34]), 2);
        assert_eq!(r.next_board().unwrap(), Board::from_raw(5));
        assert_eq!(r.next_board().unwrap(), Board::from_raw(0x1234));
        assert_eq!(r.next_board().unwrap(), Board::END);
        assert_eq!(r.next_board().unwrap(), Board::END);
    }

    #[test]
    fn list_file_round_trip() {
        let dir = tempdir().unwrap();
        let mut w = BoardWriter::create(dir.path(), 6, 2).unwrap();
        for b in [0x0011u64, 0x0101, 0x1100] {
            w.write(Board::from_raw(b)).unwrap();
        }
        assert_eq!(w.finish().unwrap(), 3);
        let boards = read_board_list(dir.path(), 6, 2).unwrap();
        assert_eq!(boards, [0x0011, 0x0101, 0x1100].map(Board::from_raw).to_vec());

        let mut r = BoardReader::open(dir.path(), 6, 2).unwrap();
        assert_eq!(r.next_board().unwrap(), Board::from_raw(0x0011));
    }

    #[test]
    fn empty_and_truncated_lists() {
        let dir = tempdir().unwrap();
        BoardWriter::create(dir.path(), 0, 3).unwrap().finish().unwrap();
        assert!(read_board_list(dir.path(), 0, 3).unwrap().is_empty());

        std::fs::write(page_path(dir.path(), 2, PageFile::List), [1u8, 2, 3, 4]).unwrap();
        assert!(matches!(read_board_list(dir.path(), 2, 3), Err(TableError::Truncated { len: 4, width: 3, .. })));
        assert!(matches!(read_board_list(dir.path(), 4, 3), Err(TableError::File { .. })));
    }
}
