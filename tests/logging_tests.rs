//! Data-quality warnings reach the `log` facade.
//!
//! A single process-wide logger records every message. Tests run in
//! parallel, so each one looks only for the names it introduced.

use std::fs;
use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use tournament_analysis::matrix::matchup_matrix;
use tournament_analysis::performance::performance_scores;
use tournament_analysis::{analyze_tournament, default_solver, AnalysisConfig, ResultRecord, ResultTable};

struct CaptureLogger;

static CAPTURED: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();
static LOGGER: CaptureLogger = CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut captured) = CAPTURED.lock() {
            captured.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn capture() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Captured messages at `level` containing `needle`.
fn logged(level: Level, needle: &str) -> Vec<String> {
    CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, msg)| *l == level && msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_strategy_without_rows_is_warned() {
    capture();
    let table = ResultTable::from_records(vec![
        ResultRecord::new("Alpha", "Beta", "Opening1", 3.0, 1.0, 0.0, 75.0, 4.0),
        ResultRecord::new("Beta", "Alpha", "Opening1", 1.0, 3.0, 0.0, 25.0, 4.0),
    ]);

    let scores = performance_scores(&table, &names(&["Alpha", "Beta", "Ghost"]));
    assert_eq!(scores.last().unwrap().strategy, "Ghost");

    let warnings = logged(Level::Warn, "'Ghost'");
    assert_eq!(
        warnings,
        vec![
            "No records found for strategy 'Ghost' as 'Strategy'. Skipping performance calculation."
                .to_string()
        ]
    );
    assert!(logged(Level::Warn, "'Alpha'").is_empty());
}

#[test]
fn test_missing_matchup_is_warned_per_direction() {
    capture();
    let table = ResultTable::from_records(vec![
        ResultRecord::new("Ash", "Birch", "Mirror Opening", 6.0, 4.0, 0.0, 60.0, 10.0),
        ResultRecord::new("Birch", "Ash", "Mirror Opening", 4.0, 6.0, 0.0, 40.0, 10.0),
        ResultRecord::new("Ash", "Cedar", "Mirror Opening", 5.0, 5.0, 0.0, 50.0, 10.0),
    ]);

    let matrix = matchup_matrix(&table, &names(&["Ash", "Birch", "Cedar"]), "Mirror Opening");
    assert!(matrix.has_nan());

    let warnings = logged(Level::Warn, "in Mirror Opening");
    let expected = [
        "Missing matchup data for Birch vs Cedar in Mirror Opening",
        "Missing matchup data for Cedar vs Ash in Mirror Opening",
        "Missing matchup data for Cedar vs Birch in Mirror Opening",
    ];
    assert_eq!(warnings.len(), expected.len());
    for message in expected {
        assert!(warnings.iter().any(|w| w == message), "missing warning: {}", message);
    }
}

#[test]
fn test_unusable_rows_are_reported() {
    capture();
    let csv = "Opening,Strategy,Opponent,Wins,Losses,Draws,Win %,Games Played\n\
               Dusk Opening,Elm,Fir,3,1,0,75.00,4\n\
               Dusk Opening,Fir,Elm,1,3,0,25.00,4\n\
               Dusk Opening,Elm,Gum,,1,0,0.00,1\n\
               Dusk Opening,Gum,Elm,1,oops,0,100.00,1\n";

    let table = ResultTable::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.dropped(), 2);
    assert!(!logged(Level::Info, "Dropped 2 rows with missing numeric data").is_empty());
}

#[test]
fn test_pipeline_warns_about_incomplete_opening() {
    capture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaps.csv");
    fs::write(
        &path,
        "Opening,Strategy,Opponent,Wins,Losses,Draws,Win %,Games Played\n\
         Gap Opening,Hazel,Ivy,6,4,0,60.00,10\n\
         Gap Opening,Ivy,Hazel,4,6,0,40.00,10\n\
         Gap Opening,Hazel,Juniper,7,3,0,70.00,10\n\
         Gap Opening,Juniper,Hazel,3,7,0,30.00,10\n\
         Gap Opening,Ivy,Juniper,5,5,0,50.00,10\n",
    )
    .unwrap();

    let config = AnalysisConfig::default()
        .with_output_dir(dir.path().join("out"))
        .with_time_grid(10.0, 200)
        .with_progress(false);
    let solver = default_solver(&config);
    analyze_tournament(&path, &config, solver.as_deref()).unwrap();

    assert_eq!(
        logged(Level::Warn, "Missing matchup data for Juniper vs Ivy in Gap Opening").len(),
        1
    );
    if solver.is_some() {
        assert_eq!(
            logged(Level::Warn, "Skipping game analysis for Gap Opening").len(),
            1
        );
    }
}
