use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, Seek, SeekFrom},
    path::Path,
};

use tracing::debug;

use crate::{
    error::{Error, IoOp, Result},
    parse::parse_line,
    store::AggregateStore,
};

const LINE_CAPACITY: usize = 128;

/// A worker's slice of the input: start offset and read budget, in bytes.
///
/// The slice is nominal. The worker owns every line whose first byte lies in
/// `(offset, offset + budget]`, plus the line at `offset` itself when
/// `offset` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub budget: u64,
}

impl ByteRange {
    pub const UNBOUNDED: u64 = u64::MAX;

    pub const fn new(offset: u64, budget: u64) -> Self {
        Self { offset, budget }
    }

    /// A range that reads from `offset` to the end of the file.
    pub const fn to_end(offset: u64) -> Self {
        Self::new(offset, Self::UNBOUNDED)
    }

    pub const fn is_unbounded(&self) -> bool {
        self.budget == Self::UNBOUNDED
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "{}..EOF", self.offset)
        } else {
            write!(f, "{}..{}", self.offset, self.offset.saturating_add(self.budget))
        }
    }
}

/// Aggregates the lines of `range` with a private read handle on `path`.
pub fn scan_range(path: &Path, range: ByteRange, buffer_capacity: usize) -> Result<AggregateStore> {
    let mut file = File::open(path).map_err(|source| Error::io(IoOp::Open, path, source))?;
    file.seek(SeekFrom::Start(range.offset))
        .map_err(|source| Error::io(IoOp::Seek, path, source))?;
    scan_lines(BufReader::with_capacity(buffer_capacity, file), range, path)
}

/// Aggregates lines from a reader already positioned at `range.offset`.
fn scan_lines<R: BufRead>(mut reader: R, range: ByteRange, path: &Path) -> Result<AggregateStore> {
    let read_error = |source: io::Error| Error::io(IoOp::Read, path, source);
    let mut store = AggregateStore::new();
    let mut line = Vec::with_capacity(LINE_CAPACITY);
    let mut consumed: u64 = 0;
    let mut records: u64 = 0;

    // The line straddling `offset` belongs to the previous range.
    if range.offset > 0 {
        consumed += reader.read_until(b'\n', &mut line).map_err(read_error)? as u64;
    }

    while consumed <= range.budget {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).map_err(read_error)?;
        if read == 0 {
            break;
        }
        let (key, reading) = parse_line(trim_terminator(&line)).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            offset: range.offset + consumed,
            source,
        })?;
        store.record(key, reading);
        records += 1;
        consumed += read as u64;
    }

    debug!(%range, records, bytes = consumed, "range scanned");
    Ok(store)
}

fn trim_terminator(line: &[u8]) -> &[u8] {
    match line {
        [record @ .., b'\r', b'\n'] | [record @ .., b'\n'] => record,
        _ => line,
    }
}
