//! Game-theory analysis of per-opening payoff matrices.
//!
//! Each opening's matchup matrix, rescaled to `[0, 1]`, is treated as the
//! row player's payoffs of a two-player zero-sum game. Two analyses run on
//! that game:
//!
//! 1. **Replicator dynamics**: how population shares of the strategies evolve
//!    from a uniform start when fitness is the expected payoff.
//! 2. **Nash equilibria**: every equilibrium found by vertex enumeration of the
//!    best-response polytopes.
//!
//! # Optional capability
//!
//! The numerical routines live behind the `equilibria` cargo feature. The
//! pipeline only ever sees a `dyn GameSolver`, obtained from
//! [`default_solver`], which is `None` when the feature is compiled out. In
//! that case the dynamics plots and the equilibria report are skipped and
//! everything else still runs.
//!
//! # Theory
//!
//! **Replicator equation** for population shares `x` under payoff matrix `A`:
//! ```text
//! dx_i/dt = x_i * ((A x)_i - x^T A x)
//! ```
//!
//! **Best-response polytopes** for a bimatrix game `(A, B)` with positive
//! payoffs:
//! ```text
//! P = { x >= 0 : B^T x <= 1 }      Q = { y >= 0 : A y <= 1 }
//! ```
//! A vertex pair `(x, y)` whose tight constraints together label every pure
//! strategy is a Nash equilibrium after normalization.
//!
//! With `B = -A` (both shifted positive) these pairs are exactly the vertices
//! of the faces of `P` and `Q` maximizing `1^T x` and `1^T y`, i.e. the
//! extreme maximin and minimax strategies. Those faces are found by the
//! simplex method and walked pivot by pivot, so a 15×15 game costs a
//! handful of small linear solves instead of `C(30, 15)` subset checks.
//!
//! # References
//!
//! - Taylor, P., Jonker, L. "Evolutionary stable strategies and game dynamics" (1978)
//! - Avis, D., et al. "Enumeration of Nash equilibria for two-player games" (2010)

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::matrix::LabeledMatrix;

#[cfg(feature = "equilibria")]
pub mod dynamics;
#[cfg(feature = "equilibria")]
pub mod linalg;
#[cfg(feature = "equilibria")]
pub mod vertex;
#[cfg(feature = "equilibria")]
pub mod zero_sum;

#[cfg(feature = "equilibria")]
pub use zero_sum::ZeroSumSolver;

/// Population shares over time: one share vector per timepoint.
pub type Trajectory = Vec<Vec<f64>>;

/// Row player's payoff matrix of a two-player game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl PayoffMatrix {
    /// Build from row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, SolveError> {
        if data.len() != rows * cols {
            return Err(SolveError::Dimension(format!(
                "expected {} payoffs for a {}x{} matrix, got {}",
                rows * cols,
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from a list of equal-length rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SolveError> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return Err(SolveError::Dimension("ragged payoff rows".to_string()));
        }
        Self::new(rows.len(), cols, rows.concat())
    }

    /// Payoffs from a head-to-head win-percentage matrix (divided by 100).
    ///
    /// Fails if any matchup is undefined.
    pub fn from_matchup(matchup: &LabeledMatrix) -> Result<Self, SolveError> {
        if matchup.has_nan() {
            return Err(SolveError::UndefinedPayoff);
        }
        let scaled = matchup.scaled(0.01);
        let data = (0..scaled.rows()).flat_map(|r| scaled.row(r).to_vec()).collect();
        Self::new(scaled.rows(), scaled.cols(), data)
    }

    /// Number of row strategies.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of column strategies.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when both players have the same number of strategies.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Payoff to the row player at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Smallest payoff, or 0 for an empty matrix.
    pub fn min(&self) -> f64 {
        self.data.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    /// The opponent's matrix in a zero-sum game.
    pub fn negated(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| -v).collect(),
        }
    }

    /// Matrix shifted so every payoff is at least 1 when any is non-positive.
    ///
    /// Adding a constant does not change best responses, and the polytope
    /// construction needs strictly positive payoffs.
    pub fn shifted_positive(&self) -> Self {
        let min = self.min();
        if min > 0.0 {
            return self.clone();
        }
        let shift = min.abs() + 1.0;
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v + shift).collect(),
        }
    }

    /// The game seen from the column player's side.
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.get(r, c));
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Matrix-vector product `self * x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.rows)
            .map(|r| {
                self.data[r * self.cols..(r + 1) * self.cols]
                    .iter()
                    .zip(x)
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }
}

/// A mixed-strategy Nash equilibrium: one distribution per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedEquilibrium {
    /// Row player's probabilities, one per strategy.
    pub row: Vec<f64>,
    /// Column player's probabilities, one per strategy.
    pub column: Vec<f64>,
}

/// Numerical routines behind the per-opening analysis.
///
/// Implemented by [`ZeroSumSolver`] when the `equilibria` feature is enabled.
pub trait GameSolver {
    /// Integrate the replicator equation for the row player's matrix.
    ///
    /// # Arguments
    /// * `payoffs` - Square payoff matrix
    /// * `initial` - Starting population shares (one per strategy)
    /// * `timepoints` - Increasing times at which to record the shares
    ///
    /// # Returns
    /// One share vector per timepoint; the first equals `initial`.
    fn replicator_dynamics(
        &self,
        payoffs: &PayoffMatrix,
        initial: &[f64],
        timepoints: &[f64],
    ) -> Result<Trajectory, SolveError>;

    /// Enumerate the Nash equilibria of the zero-sum game defined by `payoffs`.
    fn vertex_enumeration(&self, payoffs: &PayoffMatrix) -> Result<Vec<MixedEquilibrium>, SolveError>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// The compiled-in solver, if any.
#[cfg(feature = "equilibria")]
pub fn default_solver(config: &AnalysisConfig) -> Option<Box<dyn GameSolver>> {
    Some(Box::new(ZeroSumSolver::new(config.max_vertex_bases)))
}

/// The compiled-in solver, if any.
#[cfg(not(feature = "equilibria"))]
pub fn default_solver(_config: &AnalysisConfig) -> Option<Box<dyn GameSolver>> {
    None
}

/// Uniform population over `n` strategies.
pub fn uniform_population(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Errors from a single opening's game-theory analysis.
///
/// These never abort a run; the pipeline records them in the report.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The matchup matrix had a missing (NaN) cell.
    UndefinedPayoff,
    /// An optimal face has more bases than the configured ceiling.
    Overflow {
        /// Configured ceiling on bases visited.
        limit: u64,
    },
    /// The integration produced a non-finite share.
    NonFinite {
        /// 1-based integration step that failed.
        step: usize,
    },
    /// Matrix or vector shapes do not fit together.
    Dimension(String),
    /// The simplex phase hit a singular basis or ran out of pivots.
    Numerical(String),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::UndefinedPayoff => write!(f, "Skipped due to NaN in payoff matrix"),
            SolveError::Overflow { limit } => {
                write!(f, "optimal face has more than {} bases", limit)
            }
            SolveError::NonFinite { step } => {
                write!(f, "population shares became non-finite at step {}", step)
            }
            SolveError::Dimension(msg) => write!(f, "dimension mismatch: {}", msg),
            SolveError::Numerical(msg) => write!(f, "numerical failure: {}", msg),
        }
    }
}

impl std::error::Error for SolveError {}
