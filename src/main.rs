//! Batch runner: solves each instance file, writes `<name>-out.txt` next to
//! the configured output directory, and keeps going when a single instance
//! fails or times out.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stripack::{
    error::{PackError, Result},
    instance::Variant,
    io::{format_solution, read_instance},
    solver::{
        decode::decode,
        driver::{solve_default, SolveConfig, SolveOutcome, SolveResult},
        stats::render_stats_table,
    },
};

#[derive(Debug, Parser)]
#[command(
    name = "stripack",
    about = "Exact strip-packing solver for VLSI floorplanning instances"
)]
struct Args {
    /// Instance files in the plain-text format (width, count, dimension pairs).
    #[arg(required = true)]
    instances: Vec<PathBuf>,

    /// Whether circuits may rotate by 90 degrees.
    #[arg(long, default_value = "fixed")]
    variant: Variant,

    /// Solving deadline per instance, in milliseconds.
    #[arg(long, default_value_t = 300_000)]
    timeout_ms: u64,

    /// Directory for the solution files; defaults to the current directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write the decoded result as JSON.
    #[arg(long)]
    json: bool,

    /// Print the per-constraint search statistics table.
    #[arg(long)]
    stats: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config =
        SolveConfig::new(args.variant).with_deadline(Duration::from_millis(args.timeout_ms));

    let mut failures = 0usize;
    for path in &args.instances {
        match run_one(path, &config, &args) {
            Ok(()) => {}
            Err(err) => {
                // One bad instance never aborts the batch.
                error!(instance = %path.display(), "{err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

fn run_one(path: &Path, config: &SolveConfig, args: &Args) -> Result<()> {
    let instance = read_instance(path)?;
    info!(
        instance = %path.display(),
        circuits = instance.circuit_count(),
        plate_width = instance.plate_width(),
        "solving"
    );

    let outcome = solve_default(&instance, config)?;
    if args.stats {
        println!("{}", render_stats_table(&outcome.stats, &outcome.descriptors));
    }

    match &outcome.result {
        SolveResult::Sat { height, .. } => {
            info!(instance = %path.display(), height, "sat");
            write_outputs(path, &instance, &outcome, args)?;
        }
        SolveResult::Unsat => {
            warn!(instance = %path.display(), "proven infeasible, no output written");
        }
        SolveResult::TimedOut => {
            warn!(
                instance = %path.display(),
                timeout_ms = config.deadline.as_millis() as u64,
                "no solution found within the deadline"
            );
        }
    }
    Ok(())
}

fn write_outputs(
    path: &Path,
    instance: &stripack::instance::Instance,
    outcome: &SolveOutcome,
    args: &Args,
) -> Result<()> {
    let result = decode(instance, outcome)
        .ok_or_else(|| PackError::Backend("sat outcome produced no placements".to_string()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "instance".to_string());

    let out_path = args.out_dir.join(format!("{stem}-out.txt"));
    fs::write(&out_path, format_solution(&result))?;
    info!(output = %out_path.display(), "solution written");

    if args.json {
        let json_path = args.out_dir.join(format!("{stem}-out.json"));
        let json = serde_json::to_string_pretty(&result)
            .map_err(|err| PackError::Backend(err.to_string()))?;
        fs::write(&json_path, json)?;
        info!(output = %json_path.display(), "json written");
    }
    Ok(())
}
