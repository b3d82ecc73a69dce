use std::{
    fs::File,
    io::{BufWriter, Write},
    num::NonZeroUsize,
    path::PathBuf,
    time::Instant,
};

use anyhow::Context;
use brc_aggregate::{Config, calculate_with, output};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::default();
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }

    let start_parsing = Instant::now();
    let store = calculate_with(&args.input_file, &config)
        .with_context(|| format!("Failed to aggregate {}", args.input_file.display()))?;
    info!(
        keys = store.len(),
        records = store.total_count(),
        workers = config.workers.get(),
        "Aggregation took {:?}",
        start_parsing.elapsed()
    );

    let start_writing = Instant::now();
    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create results file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_json(&mut writer, &store).context("Failed to write results")?;
            writer.flush().context("Failed to flush results")?;
        }
        None => {
            let mut writer = BufWriter::new(std::io::stdout().lock());
            match args.format {
                Format::Json => output::write_json(&mut writer, &store)?,
                Format::Text => output::write_text(&mut writer, &store)?,
            }
            writer.flush()?;
        }
    }
    info!("Writing took {:?}", start_writing.elapsed());

    Ok(())
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// `{"key": {"min", "max", "mean", "count"}}`
    Json,
    /// `{key=min/mean/max, ...}`
    Text,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to measurements file
    #[arg(short, long, default_value = "data/measurements.txt")]
    input_file: PathBuf,

    /// Write JSON results to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Stdout format when no output file is given
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Number of worker threads; defaults to available parallelism
    #[arg(short, long, env = "BRC_WORKERS")]
    workers: Option<NonZeroUsize>,
}
