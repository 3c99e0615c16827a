//! # Tournament Analysis
//!
//! Turns a CSV of pairwise tournament results (strategy vs opponent, per
//! opening) into performance scores, win-rate heatmaps, and, per opening,
//! replicator dynamics trajectories and Nash equilibria.
//!
//! ## Features
//!
//! - **Performance scores**: win = 1, draw = 0.5, normalized by games played
//! - **Heatmaps**: strategy × opening win rate, and head-to-head matchups per opening
//! - **Replicator dynamics**: population shares under each opening's payoff matrix
//! - **Nash equilibria**: vertex enumeration of the zero-sum matchup game
//! - **Optional solver**: the game-theory step is a cargo feature (`equilibria`)
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use tournament_analysis::{analyze_tournament, default_solver, AnalysisConfig};
//!
//! let config = AnalysisConfig::default();
//! let solver = default_solver(&config);
//! let summary = analyze_tournament(Path::new("results.csv"), &config, solver.as_deref())?;
//! println!("Wrote {} files", summary.written.len());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Tournament Report Generator                     │
//! │  - Load + validate CSV     - Performance scores                 │
//! │  - Heatmaps                - Equilibria report (JSON)           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ per opening, via dyn GameSolver
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!    ┌─────────┐         ┌────────────┐        ┌────────────┐
//!    │ Matchup │         │ Replicator │        │   Vertex   │
//!    │ Matrix  │         │  Dynamics  │        │ Enumeration│
//!    └─────────┘         └────────────┘        └────────────┘
//! ```

#![warn(missing_docs)]

/// Analysis configuration.
pub mod config;

/// Crate error type.
pub mod error;

/// Optional game-theory capability: payoff matrices, replicator dynamics,
/// vertex enumeration.
pub mod game;

/// Strategy × opening and per-opening matchup matrices.
pub mod matrix;

/// Output directory layout and the equilibria JSON report.
pub mod output;

/// Aggregate performance scores.
pub mod performance;

/// The end-to-end analysis pass.
pub mod pipeline;

/// Heatmap and trajectory rendering.
pub mod plot;

/// CSV ingest and validation.
pub mod table;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalysisConfig, ConfigError};
pub use error::ReportError;
pub use game::{default_solver, GameSolver, MixedEquilibrium, PayoffMatrix, SolveError};
pub use output::{EquilibriaReport, EquilibriumRecord, OpeningEquilibria, OutputLayout};
pub use pipeline::{analyze_tournament, AnalysisSummary};
pub use table::{ResultRecord, ResultTable};
