//! Two-player zero-sum solver.
//!
//! The column player's payoffs are the negation of the row player's. In a
//! zero-sum game the equilibria are exactly the pairs of optimal (maximin
//! and minimax) strategies, so the extreme equilibria are every pairing of
//! a vertex of the row player's optimal set with a vertex of the column
//! player's. Each set is the optimal face of a best-response polytope and is
//! enumerated by [`vertex::optimal_vertices`]; the
//! [`dynamics`](super::dynamics) integrator covers the other analysis.

use super::dynamics;
use super::vertex;
use super::{GameSolver, MixedEquilibrium, PayoffMatrix, SolveError, Trajectory};

/// Zero-sum game solver.
///
/// # Example
/// ```
/// use tournament_analysis::game::{GameSolver, PayoffMatrix, ZeroSumSolver};
///
/// let solver = ZeroSumSolver::new(100_000);
/// let payoffs = PayoffMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// let equilibria = solver.vertex_enumeration(&payoffs).unwrap();
/// assert_eq!(equilibria.len(), 1);
/// assert!((equilibria[0].row[0] - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct ZeroSumSolver {
    /// Ceiling on optimal bases visited per player.
    max_bases: u64,
}

impl ZeroSumSolver {
    /// Solver that gives up with [`SolveError::Overflow`] once either
    /// player's optimal face has more than `max_bases` bases.
    pub fn new(max_bases: u64) -> Self {
        Self { max_bases }
    }
}

impl GameSolver for ZeroSumSolver {
    fn replicator_dynamics(
        &self,
        payoffs: &PayoffMatrix,
        initial: &[f64],
        timepoints: &[f64],
    ) -> Result<Trajectory, SolveError> {
        dynamics::integrate(payoffs, initial, timepoints)
    }

    fn vertex_enumeration(&self, payoffs: &PayoffMatrix) -> Result<Vec<MixedEquilibrium>, SolveError> {
        // P = { x >= 0 : B^T x <= 1 } with B = -A shifted positive. Maximizing
        // 1^T x minimizes the column player's best payoff against x.
        let row_vertices = vertex::optimal_vertices(
            &payoffs.negated().shifted_positive().transposed(),
            self.max_bases,
        )?;

        // Q = { y >= 0 : A y <= 1 }. Maximizing 1^T y minimizes the row
        // player's best payoff against y.
        let col_vertices = vertex::optimal_vertices(&payoffs.shifted_positive(), self.max_bases)?;

        let equilibria = row_vertices
            .iter()
            .flat_map(|x| {
                col_vertices.iter().map(move |y| MixedEquilibrium {
                    row: normalize(x),
                    column: normalize(y),
                })
            })
            .collect();

        Ok(equilibria)
    }

    fn name(&self) -> &'static str {
        "zero-sum vertex enumeration"
    }
}

fn normalize(point: &[f64]) -> Vec<f64> {
    let total: f64 = point.iter().sum();
    point.iter().map(|v| v / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> ZeroSumSolver {
        ZeroSumSolver::new(100_000)
    }

    #[test]
    fn test_rock_paper_scissors_uniform_equilibrium() {
        let payoffs = PayoffMatrix::from_rows(&[
            vec![0.5, 0.0, 1.0],
            vec![1.0, 0.5, 0.0],
            vec![0.0, 1.0, 0.5],
        ])
        .unwrap();
        let equilibria = solver().vertex_enumeration(&payoffs).unwrap();

        assert_eq!(equilibria.len(), 1);
        for p in equilibria[0].row.iter().chain(&equilibria[0].column) {
            assert!((p - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dominant_strategy_pure_equilibrium() {
        let payoffs = PayoffMatrix::from_rows(&[vec![0.5, 0.9], vec![0.1, 0.5]]).unwrap();
        let equilibria = solver().vertex_enumeration(&payoffs).unwrap();

        assert_eq!(equilibria.len(), 1);
        assert!((equilibria[0].row[0] - 1.0).abs() < 1e-9);
        assert!(equilibria[0].row[1].abs() < 1e-9);
        assert!((equilibria[0].column[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_equilibrium_distributions_sum_to_one() {
        let payoffs = PayoffMatrix::from_rows(&[
            vec![0.5, 0.62, 0.31, 0.8],
            vec![0.38, 0.5, 0.7, 0.45],
            vec![0.69, 0.3, 0.5, 0.55],
            vec![0.2, 0.55, 0.45, 0.5],
        ])
        .unwrap();
        let equilibria = solver().vertex_enumeration(&payoffs).unwrap();

        assert!(!equilibria.is_empty());
        for eq in &equilibria {
            assert!((eq.row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!((eq.column.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(eq.row.iter().chain(&eq.column).all(|&p| p >= -1e-9));
        }
    }

    #[test]
    fn test_equivalent_strategies_give_every_pure_pairing() {
        let payoffs = PayoffMatrix::from_rows(&[vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
        let equilibria = solver().vertex_enumeration(&payoffs).unwrap();

        assert_eq!(equilibria.len(), 4);
        for eq in &equilibria {
            assert!(eq.row.iter().chain(&eq.column).all(|&p| p.abs() < 1e-9 || (p - 1.0).abs() < 1e-9));
        }
    }

    /// Constant-sum round robin: `a_ij + a_ji = 1`, 0.5 against itself.
    fn round_robin(n: usize) -> PayoffMatrix {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let skew = (i as f64 - j as f64) * (i + j + 1) as f64;
                        0.5 + 0.4 * skew.sin()
                    })
                    .collect()
            })
            .collect();
        PayoffMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_fifteen_strategy_round_robin() {
        let payoffs = round_robin(15);
        let equilibria = solver().vertex_enumeration(&payoffs).unwrap();
        assert!(!equilibria.is_empty());

        for eq in &equilibria {
            let row_fitness = payoffs.mul_vec(&eq.column);
            let value: f64 = eq.row.iter().zip(&row_fitness).map(|(x, f)| x * f).sum();
            // No pure row strategy beats the equilibrium value against y.
            assert!(row_fitness.iter().all(|&f| f <= value + 1e-7));
            // No pure column strategy holds the row player below it against x.
            let col_payoffs = payoffs.transposed().mul_vec(&eq.row);
            assert!(col_payoffs.iter().all(|&p| p >= value - 1e-7));
            assert!((eq.row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!((eq.column.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let payoffs = PayoffMatrix::from_rows(&[vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
        let result = ZeroSumSolver::new(1).vertex_enumeration(&payoffs);
        assert_eq!(result, Err(SolveError::Overflow { limit: 1 }));
    }
}
