use fxhash::FxHashMap;

use crate::parse::Reading;

/// Expected number of distinct keys in a typical input.
const KEY_CAPACITY: usize = 1024;

/// Running min/max/sum/count for one key.
///
/// Values are kept in tenths so that `sum` is exact and merging is
/// associative and commutative. `sum` is 128 bits wide so that any number of
/// `i64` readings up to `u64::MAX` observations cannot overflow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    min: Reading,
    max: Reading,
    sum: i128,
    count: u64,
}

impl Aggregate {
    pub fn new(reading: Reading) -> Self {
        Self {
            min: reading,
            max: reading,
            sum: i128::from(reading.tenths()),
            count: 1,
        }
    }

    pub fn record(&mut self, reading: Reading) {
        self.min = self.min.min(reading);
        self.max = self.max.max(reading);
        self.sum += i128::from(reading.tenths());
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn min(&self) -> f64 {
        self.min.value()
    }

    pub fn max(&self) -> f64 {
        self.max.value()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn sum(&self) -> f64 {
        self.sum as f64 / 10.0
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64 / 10.0
    }

    pub fn min_reading(&self) -> Reading {
        self.min
    }

    pub fn max_reading(&self) -> Reading {
        self.max
    }

    pub fn sum_tenths(&self) -> i128 {
        self.sum
    }

    /// The mean rounded half-up to one decimal digit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_mean(&self) -> Reading {
        let count = i128::from(self.count);
        let quotient = self.sum.div_euclid(count);
        let rounded = if 2 * self.sum.rem_euclid(count) >= count {
            quotient + 1
        } else {
            quotient
        };
        // The rounded mean lies within [min, max], so it fits in i64.
        Reading::from_tenths(rounded as i64)
    }
}

/// Map from key to its [`Aggregate`], owned by exactly one writer at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStore {
    entries: FxHashMap<Box<str>, Aggregate>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::with_capacity(KEY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Folds one observation into the aggregate for `key`.
    ///
    /// The key is only copied the first time it is seen.
    pub fn record(&mut self, key: &str, reading: Reading) {
        match self.entries.get_mut(key) {
            Some(aggregate) => aggregate.record(reading),
            None => {
                self.entries.insert(key.into(), Aggregate::new(reading));
            }
        }
    }

    /// Combines two stores key by key. Keys present in only one side are
    /// carried over unchanged.
    pub fn merge(self, other: Self) -> Self {
        let (mut larger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        larger.merge_from(smaller);
        larger
    }

    pub fn merge_from(&mut self, other: Self) {
        for (key, aggregate) in other.entries {
            match self.entries.get_mut(&key) {
                Some(existing) => existing.merge(&aggregate),
                None => {
                    self.entries.insert(key, aggregate);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Aggregate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of observations across all keys.
    pub fn total_count(&self) -> u64 {
        self.entries.values().map(Aggregate::count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Aggregate)> {
        self.entries.iter().map(|(key, aggregate)| (&**key, aggregate))
    }
}

/// Folds any number of stores into one.
pub fn merge_all(stores: impl IntoIterator<Item = AggregateStore>) -> AggregateStore {
    stores
        .into_iter()
        .reduce(AggregateStore::merge)
        .unwrap_or_default()
}

impl<'a> Extend<(&'a str, Reading)> for AggregateStore {
    fn extend<I: IntoIterator<Item = (&'a str, Reading)>>(&mut self, iter: I) {
        for (key, reading) in iter {
            self.record(key, reading);
        }
    }
}

impl<'a> FromIterator<(&'a str, Reading)> for AggregateStore {
    fn from_iter<I: IntoIterator<Item = (&'a str, Reading)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
