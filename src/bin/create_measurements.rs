#![warn(clippy::pedantic)]
use anyhow::{Context, Result};
use brc_aggregate::{
    generate::{Station, generate_measurements, parse_stations},
    output,
};
use clap::Parser;
use humansize::{BINARY, format_size};
use indicatif::ProgressBar;
use rand::{SeedableRng, rngs::StdRng};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of records to create
    #[arg(help = "Positive integer number of records to create")]
    num_records: usize,

    /// Input file containing weather station names and average temperatures
    #[arg(short, long, help = "Path to the input weather stations file")]
    input_file: PathBuf,

    /// Output file for measurements
    #[arg(short, long, help = "Path to the output measurements file")]
    output_file: PathBuf,

    /// Output file for the expected results
    #[arg(short, long, help = "Path to write the expected results as JSON")]
    stats_file: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn build_weather_station_list(input_file: &Path) -> Result<Vec<Station>> {
    let file = File::open(input_file).with_context(|| {
        format!(
            "Failed to open weather stations file: {}",
            input_file.display()
        )
    })?;
    parse_stations(BufReader::new(file)).with_context(|| {
        format!(
            "Failed to read weather stations file: {}",
            input_file.display()
        )
    })
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn estimate_file_size(stations: &[Station], num_rows_to_create: usize) -> String {
    let total_name_bytes: usize = stations.iter().map(|station| station.name.len()).sum();
    let avg_name_bytes = total_name_bytes as f64 / stations.len() as f64;
    let avg_temp_bytes = 4.400_200_100_050_025;
    let avg_line_length = avg_name_bytes + avg_temp_bytes + 2.0;
    let estimated_size = num_rows_to_create as f64 * avg_line_length;

    format_size(estimated_size as u64, BINARY)
}

fn build_test_data(args: &Args, stations: &[Station]) -> Result<()> {
    let start_time = Instant::now();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Building test data...");

    let file = File::create(&args.output_file).with_context(|| {
        format!(
            "Failed to create measurements file: {}",
            args.output_file.display()
        )
    })?;

    let pb = ProgressBar::new(args.num_records as u64);
    let generation = generate_measurements(file, stations, args.num_records, &mut rng, |i| {
        if i % 10000 == 0 {
            pb.set_position(i as u64);
        }
    })
    .context("Failed to write measurements file")?;
    pb.finish_with_message("Test data generation complete");

    if let Some(stats_file) = &args.stats_file {
        let file = File::create(stats_file).with_context(|| {
            format!("Failed to create stats file: {}", stats_file.display())
        })?;
        let mut writer = BufWriter::new(file);
        output::write_json(&mut writer, &generation.expected)
            .context("Failed to write stats file")?;
        writer.flush().context("Failed to flush stats file")?;
        info!("Expected results written to {}", stats_file.display());
    }

    let elapsed_time = start_time.elapsed();
    let human_file_size = format_size(generation.bytes_written, BINARY);

    info!(
        "Test data successfully written to {}",
        args.output_file.display()
    );
    info!("Actual file size: {human_file_size}");
    info!("Elapsed time: {elapsed_time:?}");

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stations = build_weather_station_list(&args.input_file)?;
    anyhow::ensure!(
        !stations.is_empty(),
        "No weather stations found in {}",
        args.input_file.display()
    );
    let estimated_file_size = estimate_file_size(&stations, args.num_records);
    info!("Estimated file size is: {estimated_file_size}");

    build_test_data(&args, &stations)?;
    info!("Test data build complete.");

    Ok(())
}
