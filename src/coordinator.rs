use std::{fs, num::NonZeroUsize, path::Path, thread};

use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{Error, IoOp, Result},
    store::AggregateStore,
    worker::{ByteRange, scan_range},
};

/// Splits `file_len` bytes into one range per worker.
///
/// The worker count is capped at `file_len` so that offsets stay strictly
/// increasing. The last range is unbounded and absorbs the division
/// remainder.
pub fn partition(file_len: u64, workers: NonZeroUsize) -> Vec<ByteRange> {
    let workers = (workers.get() as u64).min(file_len).max(1);
    let chunk = file_len / workers;
    (0..workers)
        .map(|i| {
            let offset = i * chunk;
            if i == workers - 1 {
                ByteRange::to_end(offset)
            } else {
                ByteRange::new(offset, chunk)
            }
        })
        .collect()
}

/// Aggregates `path` using every available core.
pub fn calculate(path: impl AsRef<Path>) -> Result<AggregateStore> {
    calculate_with(path, &Config::default())
}

/// Aggregates `path` with one worker thread per range of the file.
///
/// Every worker is joined before any result is used, including when one has
/// already failed: workers are not cancelled, so an early error is reported
/// only once the slowest range finishes. The first failure in range order is
/// returned and nothing after it is merged.
#[instrument(skip_all, fields(path = %path.as_ref().display(), workers = config.workers.get()))]
pub fn calculate_with(path: impl AsRef<Path>, config: &Config) -> Result<AggregateStore> {
    let path = path.as_ref();
    let file_len = fs::metadata(path)
        .map_err(|source| Error::io(IoOp::Metadata, path, source))?
        .len();
    let ranges = partition(file_len, config.workers);
    debug!(file_len, ranges = ranges.len(), "partitioned input");

    let outcomes: Vec<Result<AggregateStore>> = thread::scope(|s| {
        let handles: Vec<_> = ranges
            .iter()
            .map(|&range| {
                let handle = s.spawn(move || scan_range(path, range, config.buffer_capacity));
                (range, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(range, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::WorkerPanicked { range }))
            })
            .collect()
    });

    let merged = outcomes
        .into_iter()
        .try_fold(AggregateStore::new(), |merged, outcome| {
            outcome.map(|store| merged.merge(store))
        })?;
    debug!(keys = merged.len(), records = merged.total_count(), "merged ranges");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn ranges_are_contiguous_and_last_is_unbounded() {
        let ranges = partition(103, workers(4));
        assert_eq!(
            ranges,
            vec![
                ByteRange::new(0, 25),
                ByteRange::new(25, 25),
                ByteRange::new(50, 25),
                ByteRange::to_end(75),
            ]
        );
        for (a, b) in ranges.iter().tuple_windows() {
            assert_eq!(a.offset + a.budget, b.offset);
        }
    }

    #[test]
    fn worker_count_is_capped_by_file_length() {
        let ranges = partition(3, workers(8));
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().map(|range| range.offset).tuple_windows().all(|(a, b)| a < b));
    }

    #[test]
    fn empty_file_gets_one_range() {
        assert_eq!(partition(0, workers(8)), vec![ByteRange::to_end(0)]);
    }

    #[test]
    fn single_worker_reads_everything() {
        assert_eq!(partition(1_000, workers(1)), vec![ByteRange::to_end(0)]);
    }
}
