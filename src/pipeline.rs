//! The tournament report generator.
//!
//! A single forward pass: load, score, render the overall heatmap, then walk
//! the openings in first-appearance order. Failures before the opening loop
//! abort the run; failures inside the game-theory step of one opening are
//! recorded in the equilibria report and the loop moves on.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::game::{uniform_population, GameSolver, PayoffMatrix, SolveError};
use crate::matrix::{matchup_matrix, strategy_opening_matrix, LabeledMatrix};
use crate::output::{EquilibriaReport, EquilibriumRecord, OpeningEquilibria, OutputLayout};
use crate::performance::{performance_scores, print_performance, PerformanceScore};
use crate::plot::{render_dynamics, render_heatmap, ColorScale, HeatmapStyle};
use crate::table::{validate_input_path, ResultTable};

/// Placeholder recorded when vertex enumeration exceeds its work ceiling.
pub const OVERFLOW_MESSAGE: &str = "OverflowError during vertex enumeration";

/// Everything a run computed, plus the files it wrote.
#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    /// Where the run wrote its files.
    pub layout: OutputLayout,
    /// Strategies, sorted.
    pub strategies: Vec<String>,
    /// Openings in first-appearance order.
    pub openings: Vec<String>,
    /// Scores sorted best first.
    pub performance: Vec<PerformanceScore>,
    /// Win rate of each strategy within each opening, in percent.
    pub strategy_opening: LabeledMatrix,
    /// Matchup matrix per opening, in first-appearance order.
    pub matchups: Vec<(String, LabeledMatrix)>,
    /// `None` when no game solver was available.
    pub equilibria: Option<EquilibriaReport>,
    /// Every file written, in order.
    pub written: Vec<PathBuf>,
}

/// Run the full analysis over `csv_path`.
///
/// # Arguments
/// * `csv_path` - Tournament results CSV
/// * `config` - Output location and solver parameters
/// * `solver` - Game-theory capability; `None` skips replicator dynamics and
///   Nash equilibria
pub fn analyze_tournament(
    csv_path: &Path,
    config: &AnalysisConfig,
    solver: Option<&dyn GameSolver>,
) -> Result<AnalysisSummary> {
    config.validate()?;
    validate_input_path(csv_path)?;

    let layout = OutputLayout::create(&config.output_dir, csv_path)?;
    let mut written = Vec::new();

    log::info!("Reading data from {}...", csv_path.display());
    let table = ResultTable::from_path(csv_path)?;

    let strategies = table.strategies();
    let openings = table.openings();
    log::info!("Found {} strategies: {}", strategies.len(), strategies.join(", "));
    log::info!("Found {} openings: {}", openings.len(), openings.join(", "));

    println!("\n--- Overall Strategy Performance (Score / Total Games | Win=1, Draw=0.5, Loss=0) ---");
    let performance = performance_scores(&table, &strategies);
    print_performance(&performance);

    log::info!("Generating Strategy vs Opening heatmap");
    let strategy_opening = strategy_opening_matrix(&table, &strategies, &openings);
    let path = layout.strategy_opening_heatmap();
    render_heatmap(
        &path,
        &strategy_opening,
        &HeatmapStyle {
            title: "Win Rate % of Strategy within each Opening (Wins / (Wins+Losses))".to_string(),
            x_desc: "Openings".to_string(),
            y_desc: "Strategies".to_string(),
            scale: ColorScale::Viridis,
            size: HeatmapStyle::size_for(openings.len(), strategies.len(), 1.5, 0.6),
        },
    )?;
    log::info!("Saved: {}", path.display());
    written.push(path);

    match solver {
        Some(solver) => log::info!(
            "Game solver available ({}). Performing Replicator Dynamics and Nash Equilibria analysis.",
            solver.name()
        ),
        None => log::warn!("No game solver available. Skipping Replicator Dynamics and Nash Equilibria analysis."),
    }

    let progress = progress_bar(openings.len() as u64, config.show_progress);
    let mut report = EquilibriaReport::new();
    let mut matchups = Vec::with_capacity(openings.len());

    for (k, opening) in openings.iter().enumerate() {
        let index = k + 1;
        progress.set_message(opening.clone());
        log::info!("Analyzing opening: {}", opening);

        let matchup = matchup_matrix(&table, &strategies, opening);
        let path = layout.matchup_heatmap(index, opening);
        render_heatmap(
            &path,
            &matchup,
            &HeatmapStyle {
                title: format!("Head-to-Head Win % ({}) - Win % for Row Player", opening),
                x_desc: "Opponent Strategy".to_string(),
                y_desc: "Strategy".to_string(),
                scale: ColorScale::ViridisReversed,
                size: HeatmapStyle::size_for(strategies.len(), strategies.len(), 0.8, 0.7),
            },
        )?;
        log::info!("Saved: {}", path.display());
        written.push(path);

        if let Some(solver) = solver {
            let outcome = analyze_opening(
                solver,
                config,
                &layout,
                index,
                opening,
                &strategies,
                &matchup,
                &mut written,
            );
            report.insert(opening, outcome);
        }

        matchups.push((opening.clone(), matchup));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let equilibria = match solver {
        Some(_) if !report.is_empty() => {
            let path = layout.equilibria_file();
            match report.save_json(&path) {
                Ok(()) => {
                    log::info!("Saved: {}", path.display());
                    written.push(path);
                }
                Err(e) => log::error!("Error saving Nash Equilibria to JSON: {}", e),
            }
            Some(report)
        }
        Some(_) => {
            log::info!("No Nash Equilibria results to save.");
            Some(report)
        }
        None => {
            log::info!("Skipped saving Nash Equilibria (no game solver available).");
            None
        }
    };

    log::info!("Analysis complete");
    Ok(AnalysisSummary {
        layout,
        strategies,
        openings,
        performance,
        strategy_opening,
        matchups,
        equilibria,
        written,
    })
}

/// Replicator dynamics and equilibria for one opening.
///
/// Never fails: every problem becomes an error placeholder.
#[allow(clippy::too_many_arguments)]
fn analyze_opening(
    solver: &dyn GameSolver,
    config: &AnalysisConfig,
    layout: &OutputLayout,
    index: usize,
    opening: &str,
    strategies: &[String],
    matchup: &LabeledMatrix,
    written: &mut Vec<PathBuf>,
) -> OpeningEquilibria {
    log::info!("Calculating Replicator Dynamics and Nash Equilibria for {}", opening);

    let payoffs = match PayoffMatrix::from_matchup(matchup) {
        Ok(payoffs) => payoffs,
        Err(e) => {
            log::warn!("Skipping game analysis for {} due to missing data (NaN)", opening);
            return OpeningEquilibria::failed(e.to_string());
        }
    };

    let timepoints = config.timepoints();
    let trajectory =
        match solver.replicator_dynamics(&payoffs, &uniform_population(strategies.len()), &timepoints) {
            Ok(trajectory) => trajectory,
            Err(e) => {
                log::error!("Error during replicator dynamics for {}: {}", opening, e);
                return OpeningEquilibria::failed(e.to_string());
            }
        };

    let path = layout.dynamics_plot(index, opening);
    let title = format!("Replicator Dynamics ({})", opening);
    if let Err(e) = render_dynamics(&path, strategies, &trajectory, &title) {
        log::error!("Error during game analysis for {}: {}", opening, e);
        return OpeningEquilibria::failed(e.to_string());
    }
    log::info!("Saved: {}", path.display());
    written.push(path);

    log::info!("Finding Nash Equilibria for {} using Vertex Enumeration", opening);
    let equilibria = match solver.vertex_enumeration(&payoffs) {
        Ok(equilibria) => equilibria,
        Err(SolveError::Overflow { .. }) => {
            log::error!(
                "Error (Overflow) during vertex enumeration for {}. Matrix may be too large/complex.",
                opening
            );
            return OpeningEquilibria::failed(OVERFLOW_MESSAGE);
        }
        Err(e) => {
            log::error!("Error during vertex enumeration for {}: {}", opening, e);
            return OpeningEquilibria::failed(e.to_string());
        }
    };

    println!("Nash Equilibria found for {}:", opening);
    if equilibria.is_empty() {
        println!("  No Nash Equilibria found by vertex enumeration.");
        return OpeningEquilibria::Found(Vec::new());
    }

    let records = equilibria
        .iter()
        .enumerate()
        .map(|(i, eq)| {
            let record =
                EquilibriumRecord::from_mixed(i + 1, eq, strategies, config.probability_threshold);
            let support: Vec<String> = record
                .row_strategy
                .iter()
                .map(|(s, p)| format!("{}: {:.3}", s, p))
                .collect();
            println!("  NE {}:", i + 1);
            println!("    Row Player Strategy: {{{}}}", support.join(", "));
            record
        })
        .collect();

    OpeningEquilibria::Found(records)
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
