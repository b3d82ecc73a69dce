use std::{num::NonZeroUsize, thread};

/// Read buffer per worker.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub workers: NonZeroUsize,
    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity.max(1);
        self
    }
}

/// Hardware parallelism, or a single worker when it cannot be determined.
pub fn available_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let workers = NonZeroUsize::new(3).unwrap();
        let config = Config::default().with_workers(workers).with_buffer_capacity(0);
        assert_eq!(config.workers, workers);
        assert_eq!(config.buffer_capacity, 1);
    }
}
