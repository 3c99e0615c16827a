//! Configuration options for a tournament analysis run.
//!
//! This module provides the configuration struct that controls where output
//! is written and how the per-opening game-theory analysis is carried out.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default root directory for analysis output.
pub const DEFAULT_OUTPUT_DIR: &str = "analysis_outputs";

/// Configuration for the tournament analysis pipeline.
///
/// This struct controls:
/// - Where the output directory tree is created
/// - The time grid used for replicator dynamics
/// - Which equilibrium probabilities are reported
///
/// # Example
/// ```
/// use tournament_analysis::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.time_samples, 20_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root directory; each run gets a subdirectory named after its CSV file.
    pub output_dir: PathBuf,

    /// End of the replicator dynamics time horizon (the start is always 0).
    pub time_horizon: f64,

    /// Number of evenly spaced samples over `[0, time_horizon]`.
    pub time_samples: usize,

    /// Equilibrium probabilities at or below this value are dropped from
    /// the report.
    pub probability_threshold: f64,

    /// Ceiling on the number of optimal bases vertex enumeration may visit
    /// per player.
    ///
    /// Only heavily degenerate games (many tied matchups) come near it; they
    /// are reported with an overflow error instead of running indefinitely.
    pub max_vertex_bases: u64,

    /// Show a progress bar while openings are processed.
    pub show_progress: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            time_horizon: 50.0,
            time_samples: 20_000,
            probability_threshold: 1e-4,
            max_vertex_bases: 100_000,
            show_progress: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new AnalysisConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the output root directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method: set the replicator dynamics time grid.
    pub fn with_time_grid(mut self, horizon: f64, samples: usize) -> Self {
        self.time_horizon = horizon;
        self.time_samples = samples;
        self
    }

    /// Builder method: set the probability reporting threshold.
    pub fn with_probability_threshold(mut self, threshold: f64) -> Self {
        self.probability_threshold = threshold;
        self
    }

    /// Builder method: set the vertex enumeration ceiling.
    pub fn with_max_vertex_bases(mut self, max: u64) -> Self {
        self.max_vertex_bases = max;
        self
    }

    /// Builder method: enable or disable the progress bar.
    pub fn with_progress(mut self, enable: bool) -> Self {
        self.show_progress = enable;
        self
    }

    /// Evenly spaced timepoints over `[0, time_horizon]`, endpoints included.
    pub fn timepoints(&self) -> Vec<f64> {
        linspace(0.0, self.time_horizon, self.time_samples)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_horizon.is_finite() || self.time_horizon <= 0.0 {
            return Err(ConfigError::InvalidHorizon(self.time_horizon));
        }

        if self.time_samples < 2 {
            return Err(ConfigError::TooFewSamples(self.time_samples));
        }

        if !(0.0..1.0).contains(&self.probability_threshold) {
            return Err(ConfigError::InvalidThreshold(self.probability_threshold));
        }

        if self.max_vertex_bases == 0 {
            return Err(ConfigError::ZeroBaseCeiling);
        }

        Ok(())
    }
}

/// `samples` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (samples - 1) as f64;
            (0..samples)
                .map(|i| if i == samples - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Errors that can occur when validating the analysis configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Time horizon is not a positive finite number.
    InvalidHorizon(f64),
    /// Fewer than two timepoints requested.
    TooFewSamples(usize),
    /// Probability threshold is outside [0, 1).
    InvalidThreshold(f64),
    /// Vertex enumeration ceiling is zero.
    ZeroBaseCeiling,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidHorizon(val) => {
                write!(f, "Time horizon {} must be positive and finite", val)
            }
            ConfigError::TooFewSamples(val) => {
                write!(f, "Time grid needs at least 2 samples, got {}", val)
            }
            ConfigError::InvalidThreshold(val) => {
                write!(f, "Probability threshold {} is out of range [0, 1)", val)
            }
            ConfigError::ZeroBaseCeiling => {
                write!(f, "Vertex enumeration ceiling must be greater than 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
