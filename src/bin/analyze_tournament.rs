//! Tournament Results Analyzer
//!
//! Reads a tournament results CSV and writes heatmaps, replicator dynamics
//! plots and a Nash equilibria summary under `analysis_outputs/<csv name>/`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use tournament_analysis::{analyze_tournament, default_solver, AnalysisConfig};

#[derive(Parser, Debug)]
#[command(name = "analyze_tournament", about = "Analyze tournament results.")]
struct Args {
    /// Path to the tournament results CSV file.
    csv_file: PathBuf,

    /// Root directory for analysis output.
    #[arg(long, default_value = tournament_analysis::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Hide the per-opening progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start = Instant::now();

    let config = AnalysisConfig::default()
        .with_output_dir(args.output_dir)
        .with_progress(!args.no_progress);
    let solver = default_solver(&config);

    let summary = analyze_tournament(&args.csv_file, &config, solver.as_deref())
        .with_context(|| format!("analysis of '{}' failed", args.csv_file.display()))?;

    println!("\n=== Analysis Complete ===");
    println!("Output directory: {}", summary.layout.run_dir.display());
    println!("Files written: {}", summary.written.len());
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
