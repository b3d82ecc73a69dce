//! Synthetic measurement files with known expected results.

use std::io::{self, BufRead, BufWriter, Write};

use itertools::Itertools;
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};

use crate::{error::GenerateError, parse::Reading, store::AggregateStore};

/// Spread of generated readings around a station's average.
pub const STANDARD_DEVIATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub average: f64,
}

impl Station {
    pub fn new(name: impl Into<String>, average: f64) -> Self {
        Self {
            name: name.into(),
            average,
        }
    }
}

/// Reads `name;average` lines. Comment lines and unparsable lines are
/// skipped, and only the first entry for each name is kept.
pub fn parse_stations(reader: impl BufRead) -> io::Result<Vec<Station>> {
    let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
    Ok(lines
        .iter()
        .filter(|line| !line.contains('#'))
        .filter_map(|line| {
            let (name, average) = line.split_once(';')?;
            Some(Station::new(name, average.trim().parse().ok()?))
        })
        .unique_by(|station| station.name.clone())
        .collect())
}

#[derive(Debug)]
pub struct Generation {
    /// The aggregates of exactly what was written.
    pub expected: AggregateStore,
    pub bytes_written: u64,
}

/// Writes `count` records drawn from `stations` to `output`.
///
/// Readings follow a normal distribution around each station's average and
/// are truncated to one decimal digit. The last record has no trailing
/// newline. `on_row` is called with the index of each written record.
pub fn generate_measurements<R: Rng>(
    output: impl Write,
    stations: &[Station],
    count: usize,
    rng: &mut R,
    mut on_row: impl FnMut(usize),
) -> Result<Generation, GenerateError> {
    let sources = stations
        .iter()
        .map(|station| {
            Normal::new(station.average, STANDARD_DEVIATION).map(|normal| (station, normal))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = BufWriter::new(output);
    let mut expected = AggregateStore::with_capacity(stations.len());
    let mut bytes_written = 0_u64;
    let mut line = String::new();

    for i in 0..count {
        let (station, distribution) = sources.choose(rng).ok_or(GenerateError::NoStations)?;
        let reading = Reading::from_value_truncated(distribution.sample(rng));

        line.clear();
        line.push_str(&station.name);
        line.push(';');
        line.push_str(&reading.to_string());
        if i + 1 < count {
            line.push('\n');
        }
        writer.write_all(line.as_bytes())?;
        bytes_written += line.len() as u64;

        expected.record(&station.name, reading);
        on_row(i);
    }

    writer.flush()?;
    Ok(Generation {
        expected,
        bytes_written,
    })
}
