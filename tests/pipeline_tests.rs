//! End-to-end runs of the analysis over small tournament files.

use std::fs;
use std::path::{Path, PathBuf};

use tournament_analysis::game::Trajectory;
use tournament_analysis::{
    analyze_tournament, default_solver, AnalysisConfig, EquilibriaReport, GameSolver,
    MixedEquilibrium, OpeningEquilibria, PayoffMatrix, ReportError, SolveError,
};

const HEADER: &str = "Opening,Strategy,Opponent,Wins,Losses,Draws,Win %,Games Played";

/// Both rows of a match between `a` and `b`.
fn mirrored(opening: &str, a: &str, b: &str, a_wins: u32, b_wins: u32, draws: u32) -> Vec<String> {
    vec![row(opening, a, b, a_wins, b_wins, draws), row(opening, b, a, b_wins, a_wins, draws)]
}

fn row(opening: &str, strategy: &str, opponent: &str, wins: u32, losses: u32, draws: u32) -> String {
    let decisive = wins + losses;
    let win_pct = if decisive > 0 {
        wins as f64 / decisive as f64 * 100.0
    } else {
        0.0
    };
    format!(
        "{},{},{},{},{},{},{:.2},{}",
        opening,
        strategy,
        opponent,
        wins,
        losses,
        draws,
        win_pct,
        wins + losses + draws
    )
}

/// Three openings:
/// - "No Opening": Rock strictly dominates
/// - "Standard Opening": a pure rock-paper-scissors cycle
/// - "Sidewall Opening": Scissors vs Paper is missing
fn write_tournament(dir: &Path) -> PathBuf {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(mirrored("No Opening", "Rock", "Paper", 9, 1, 0));
    lines.extend(mirrored("No Opening", "Rock", "Scissors", 8, 2, 0));
    lines.extend(mirrored("No Opening", "Paper", "Scissors", 5, 5, 0));

    lines.extend(mirrored("Standard Opening", "Rock", "Scissors", 10, 0, 0));
    lines.extend(mirrored("Standard Opening", "Scissors", "Paper", 10, 0, 0));
    lines.extend(mirrored("Standard Opening", "Paper", "Rock", 10, 0, 0));

    lines.extend(mirrored("Sidewall Opening", "Rock", "Paper", 6, 4, 2));
    lines.extend(mirrored("Sidewall Opening", "Rock", "Scissors", 3, 7, 0));
    lines.push(row("Sidewall Opening", "Paper", "Scissors", 4, 6, 0));

    let path = dir.join("rps_results.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn test_config(output: &Path) -> AnalysisConfig {
    AnalysisConfig::default()
        .with_output_dir(output)
        .with_time_grid(50.0, 2_000)
        .with_progress(false)
}

#[test]
fn test_full_run_writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_tournament(dir.path());
    let config = test_config(&dir.path().join("out"));
    let solver = default_solver(&config);

    let summary = analyze_tournament(&csv, &config, solver.as_deref()).unwrap();

    assert_eq!(summary.strategies, vec!["Paper", "Rock", "Scissors"]);
    assert_eq!(
        summary.openings,
        vec!["No Opening", "Standard Opening", "Sidewall Opening"]
    );

    let layout = &summary.layout;
    assert_eq!(layout.run_dir, dir.path().join("out").join("rps_results"));
    assert!(layout.strategy_opening_heatmap().is_file());
    for (i, opening) in summary.openings.iter().enumerate() {
        assert!(layout.matchup_heatmap(i + 1, opening).is_file());
    }
    assert!(layout.heatmaps_dir.join("3_Sidewall_Opening_Matchup_Heatmap.png").is_file());

    if solver.is_none() {
        return;
    }

    assert!(layout.dynamics_plot(1, "No Opening").is_file());
    assert!(layout.dynamics_plot(2, "Standard Opening").is_file());
    assert!(!layout.dynamics_plot(3, "Sidewall Opening").exists());
    assert!(layout.equilibria_file().is_file());
}

#[test]
fn test_equilibria_report_contents() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_tournament(dir.path());
    let config = test_config(&dir.path().join("out"));
    let Some(solver) = default_solver(&config) else {
        return;
    };

    let summary = analyze_tournament(&csv, &config, Some(solver.as_ref())).unwrap();
    let report = EquilibriaReport::load_json(&summary.layout.equilibria_file()).unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(Some(&report), summary.equilibria.as_ref());

    // Dominated strategies carry zero probability and are left out.
    match report.get("No Opening").unwrap() {
        OpeningEquilibria::Found(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].equilibrium_index, 1);
            assert_eq!(records[0].row_strategy.len(), 1);
            assert!((records[0].row_strategy["Rock"] - 1.0).abs() < 1e-9);
            assert_eq!(records[0].column_strategy.len(), 1);
            assert!(records[0].column_strategy.contains_key("Rock"));
        }
        other => panic!("expected equilibria, got {:?}", other),
    }

    match report.get("Standard Opening").unwrap() {
        OpeningEquilibria::Found(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].row_strategy.len(), 3);
            for p in records[0].row_strategy.values() {
                assert!((p - 1.0 / 3.0).abs() < 1e-9);
            }
        }
        other => panic!("expected equilibria, got {:?}", other),
    }

    assert_eq!(
        report.get("Sidewall Opening"),
        Some(&OpeningEquilibria::failed("Skipped due to NaN in payoff matrix"))
    );

    // Probabilities are plain JSON numbers.
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(summary.layout.equilibria_file()).unwrap()).unwrap();
    assert!(raw["No Opening"][0]["row_strategy"]["Rock"].is_f64());
}

#[test]
fn test_overflow_is_recorded_per_opening() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = vec![HEADER.to_string()];
    lines.extend(mirrored("No Opening", "Rock", "Paper", 9, 1, 0));
    lines.extend(mirrored("No Opening", "Rock", "Scissors", 8, 2, 0));
    lines.extend(mirrored("No Opening", "Paper", "Scissors", 5, 5, 0));
    // Every matchup even: each player's optimal face has three bases.
    lines.extend(mirrored("Even Opening", "Rock", "Paper", 5, 5, 0));
    lines.extend(mirrored("Even Opening", "Rock", "Scissors", 5, 5, 0));
    lines.extend(mirrored("Even Opening", "Paper", "Scissors", 5, 5, 0));
    let csv = dir.path().join("even.csv");
    fs::write(&csv, lines.join("\n")).unwrap();

    let config = test_config(&dir.path().join("out")).with_max_vertex_bases(2);
    let Some(solver) = default_solver(&config) else {
        return;
    };

    let summary = analyze_tournament(&csv, &config, Some(solver.as_ref())).unwrap();
    let report = summary.equilibria.unwrap();
    assert_eq!(
        report.get("Even Opening"),
        Some(&OpeningEquilibria::failed("OverflowError during vertex enumeration"))
    );
    // Dynamics still ran before enumeration failed.
    assert!(summary.layout.dynamics_plot(2, "Even Opening").is_file());
    // A game with a unique equilibrium stays well under the ceiling.
    assert!(matches!(
        report.get("No Opening"),
        Some(OpeningEquilibria::Found(records)) if records.len() == 1
    ));
}

/// Round robin over `n` strategies in each opening. Results are spread over
/// 97 decisive games so the matchup games are rarely degenerate.
fn write_round_robin(dir: &Path, n: usize, openings: &[&str]) -> PathBuf {
    let strategies: Vec<String> = (0..n).map(|i| format!("Strategy{:02}", i)).collect();
    let mut lines = vec![HEADER.to_string()];
    for (o, opening) in openings.iter().enumerate() {
        for i in 0..n {
            for j in (i + 1)..n {
                let wins = ((i * 37 + j * 53 + o * 17) % 98) as u32;
                let draws = ((i + j + o) % 4) as u32;
                lines.extend(mirrored(opening, &strategies[i], &strategies[j], wins, 97 - wins, draws));
            }
        }
    }
    let path = dir.join("round_robin.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_fifteen_strategy_tournament_reports_equilibria() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_round_robin(dir.path(), 15, &["No Opening", "Standard Opening"]);
    let config = test_config(&dir.path().join("out"));
    let Some(solver) = default_solver(&config) else {
        return;
    };

    let summary = analyze_tournament(&csv, &config, Some(solver.as_ref())).unwrap();
    assert_eq!(summary.strategies.len(), 15);
    assert!(summary.layout.dynamics_plot(2, "Standard Opening").is_file());

    let report = EquilibriaReport::load_json(&summary.layout.equilibria_file()).unwrap();
    for opening in ["No Opening", "Standard Opening"] {
        match report.get(opening) {
            Some(OpeningEquilibria::Found(records)) => {
                assert!(!records.is_empty(), "no equilibria for {}", opening);
                for record in records {
                    let total: f64 = record.row_strategy.values().sum();
                    assert!((total - 1.0).abs() < 15.0 * 1e-4);
                    assert!(record.row_strategy.values().all(|&p| p > 1e-4));
                }
            }
            other => panic!("expected equilibria for {}, got {:?}", opening, other),
        }
    }
}

/// Holds the population still and never finds an equilibrium.
struct BarrenSolver;

impl GameSolver for BarrenSolver {
    fn replicator_dynamics(
        &self,
        _payoffs: &PayoffMatrix,
        initial: &[f64],
        timepoints: &[f64],
    ) -> Result<Trajectory, SolveError> {
        Ok(vec![initial.to_vec(); timepoints.len()])
    }

    fn vertex_enumeration(&self, _payoffs: &PayoffMatrix) -> Result<Vec<MixedEquilibrium>, SolveError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "barren"
    }
}

#[test]
fn test_opening_without_equilibria_records_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_tournament(dir.path());
    let config = test_config(&dir.path().join("out"));

    let summary = analyze_tournament(&csv, &config, Some(&BarrenSolver)).unwrap();
    let report = EquilibriaReport::load_json(&summary.layout.equilibria_file()).unwrap();

    assert_eq!(report.get("No Opening"), Some(&OpeningEquilibria::Found(Vec::new())));
    assert_eq!(report.get("Standard Opening"), Some(&OpeningEquilibria::Found(Vec::new())));
    assert!(summary.layout.dynamics_plot(1, "No Opening").is_file());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(summary.layout.equilibria_file()).unwrap()).unwrap();
    assert_eq!(raw["Standard Opening"], serde_json::json!([]));
}

#[test]
fn test_run_without_solver_skips_game_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_tournament(dir.path());
    let config = test_config(&dir.path().join("out"));

    let summary = analyze_tournament(&csv, &config, None).unwrap();

    assert!(summary.equilibria.is_none());
    assert!(summary.layout.strategy_opening_heatmap().is_file());
    assert_eq!(fs::read_dir(&summary.layout.heatmaps_dir).unwrap().count(), 4);
    assert_eq!(fs::read_dir(&summary.layout.dynamics_dir).unwrap().count(), 0);
    assert!(!summary.layout.equilibria_file().exists());
}

#[test]
fn test_strategy_opening_matrix_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pair.csv");
    let mut lines = vec![HEADER.to_string()];
    lines.extend(mirrored("Opening1", "A", "B", 7, 3, 0));
    fs::write(&path, lines.join("\n")).unwrap();

    let summary = analyze_tournament(&path, &test_config(&dir.path().join("out")), None).unwrap();
    assert_eq!(summary.strategy_opening.get_by_label("A", "Opening1"), Some(70.0));
    assert_eq!(summary.strategy_opening.get_by_label("B", "Opening1"), Some(30.0));
    assert_eq!(summary.performance[0].strategy, "A");
    assert_eq!(summary.performance[0].score, 70.0);
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("out"));

    let result = analyze_tournament(&dir.path().join("nope.csv"), &config, None);
    assert!(matches!(result, Err(ReportError::InputNotFound(_))));

    let result = analyze_tournament(dir.path(), &config, None);
    assert!(matches!(result, Err(ReportError::NotAFile(_))));

    // Nothing was created for a rejected input.
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_malformed_csv_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(&path, "Strategy,Opponent\nA,B\n").unwrap();

    let result = analyze_tournament(&path, &test_config(&dir.path().join("out")), None);
    assert!(matches!(result, Err(ReportError::Csv(_))));
}
