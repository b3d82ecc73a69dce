//! Rendering of a final [`AggregateStore`].

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::store::{Aggregate, AggregateStore};

/// The reported statistics for one key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: u64,
}

impl From<&Aggregate> for Summary {
    fn from(aggregate: &Aggregate) -> Self {
        Self {
            min: aggregate.min(),
            max: aggregate.max(),
            mean: aggregate.mean(),
            count: aggregate.count(),
        }
    }
}

/// Key-ordered summaries, so that rendering is deterministic.
pub fn summarize(store: &AggregateStore) -> BTreeMap<String, Summary> {
    store
        .iter()
        .map(|(key, aggregate)| (key.to_owned(), Summary::from(aggregate)))
        .collect()
}

/// Writes `{"key": {"min": .., "max": .., "mean": .., "count": ..}, ...}`
/// followed by a newline.
pub fn write_json(mut writer: impl Write, store: &AggregateStore) -> serde_json::Result<()> {
    serde_json::to_writer(&mut writer, &summarize(store))?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Writes `{key=min/mean/max, ...}` with one decimal digit per value.
pub fn write_text(mut writer: impl Write, store: &AggregateStore) -> io::Result<()> {
    writer.write_all(b"{")?;
    for (i, (key, aggregate)) in store
        .iter()
        .sorted_unstable_by_key(|(key, _)| *key)
        .enumerate()
    {
        if i > 0 {
            writer.write_all(b", ")?;
        }
        push_aggregation(&mut writer, key, aggregate)?;
    }
    writer.write_all(b"}\n")
}

fn push_aggregation(writer: &mut impl Write, key: &str, aggregate: &Aggregate) -> io::Result<()> {
    write!(
        writer,
        "{key}={}/{}/{}",
        aggregate.min_reading(),
        aggregate.rounded_mean(),
        aggregate.max_reading()
    )
}
