use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use bstar_floorplan::Result;
use bstar_floorplan::anneal::{AnnealConfig, Annealer};
use bstar_floorplan::io::{Report, load_circuit, write_report};
use bstar_floorplan::logging::{
    FileSink, LogLevel, Logger, TARGET_CLI, WriterSink, event_with_fields, json_kv,
};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Cap on the JSON log file before it is truncated.
const LOG_MAX_BYTES: u64 = 8 * 1024 * 1024;

/// Fixed-outline floorplanning with B*-trees and simulated annealing.
#[derive(Debug, Parser)]
#[command(name = "floorplan", version)]
struct CliArgs {
    /// Area weight in [0, 1]; wirelength gets 1 - alpha.
    alpha: f64,
    /// Block and terminal definitions.
    block_path: PathBuf,
    /// Net list referring to block and terminal names.
    net_path: PathBuf,
    /// Where the report is written.
    report_path: PathBuf,
    /// Seed for a reproducible run; omitted means a fresh random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// JSON annealing config; missing keys keep their defaults.
    #[arg(long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,
    /// JSON-lines log file, debug level. Without it info events go to stderr.
    #[arg(long = "log", value_name = "FILE")]
    log_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let logger = build_logger(&args)?;

    let config = match &args.config_path {
        Some(path) => AnnealConfig::from_path(path)?,
        None => AnnealConfig::default(),
    }
    .with_alpha(args.alpha);

    let circuit = load_circuit(&args.block_path, &args.net_path)?;
    let _ = logger.log_event(event_with_fields(
        LogLevel::Info,
        TARGET_CLI,
        "circuit_loaded",
        [
            json_kv("blocks", circuit.blocks.len()),
            json_kv("terminals", circuit.terminals.len()),
            json_kv("nets", circuit.nets.len()),
            json_kv("outline_width", circuit.outline.width),
            json_kv("outline_height", circuit.outline.height),
            json_kv("seed", args.seed),
        ],
    ));

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut annealer = Annealer::new(&circuit, config)?.with_logger(logger.clone());
    let outcome = annealer.run(&mut rng)?;
    let report = Report::from_outcome(&circuit, &outcome)?;

    let mut out = BufWriter::new(File::create(&args.report_path)?);
    write_report(&mut out, &report)?;

    let level = if outcome.cost.fits {
        LogLevel::Info
    } else {
        LogLevel::Warn
    };
    let _ = logger.log_event(event_with_fields(
        level,
        TARGET_CLI,
        "report_written",
        [
            json_kv("path", args.report_path.display().to_string()),
            json_kv("cost", report.cost),
            json_kv("fits_outline", outcome.cost.fits),
        ],
    ));
    Ok(())
}

fn build_logger(args: &CliArgs) -> Result<Logger> {
    let logger = match &args.log_path {
        Some(path) => Logger::new(FileSink::new(path, LOG_MAX_BYTES)?).with_min_level(LogLevel::Debug),
        None => Logger::new(WriterSink::new(io::stderr())).with_min_level(LogLevel::Info),
    };
    Ok(logger)
}
