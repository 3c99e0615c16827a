//! Vertex enumeration of the optimal face of a best-response polytope.
//!
//! For a positive `k`×`d` matrix `M`, the polytope `{ w >= 0 : M w <= 1 }`
//! is written in equality form `M w + t = 1` with slacks `t >= 0`. Columns
//! `0..d` are the `w` variables and `d..d + k` the slacks. A basis is `k`
//! columns of `[M | I]`; its basic solution is a vertex when every basic
//! value is non-negative.
//!
//! ```text
//!   simplex (Bland's rule)          face walk
//!   slack basis ──pivot──▶ ... ──▶ optimal basis ──pivot──▶ neighbours
//!                                        │
//!                      columns with negative reduced cost are fixed at 0
//! ```
//!
//! `1^T w` is maximized first. The optimal reduced costs fix every column
//! that is zero on the whole optimal face, and the face's feasible bases are
//! then reached from the optimal basis by single pivots. Work grows with the
//! number of optimal bases, not with the number of constraint subsets.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::linalg;
use super::{PayoffMatrix, SolveError};

/// Feasibility, ratio-test and reduced-cost tolerance.
pub const TOLERANCE: f64 = 1e-9;

/// Pivot budget for the simplex phase.
const MAX_PIVOTS: usize = 10_000;

/// All vertices of the face of `{ w >= 0 : M w <= 1 }` maximizing `1^T w`.
///
/// # Arguments
/// * `m` - Positive constraint matrix `M`
/// * `max_bases` - Ceiling on the number of optimal bases visited
///
/// # Returns
/// Distinct vertices in discovery order, not normalized.
///
/// # Errors
/// [`SolveError::Overflow`] when the face has more than `max_bases` bases;
/// [`SolveError::Numerical`] when the simplex phase breaks down.
pub fn optimal_vertices(m: &PayoffMatrix, max_bases: u64) -> Result<Vec<Vec<f64>>, SolveError> {
    let form = EqualityForm::new(m);
    let optimal = form.maximize()?;

    let duals = form
        .duals(&optimal)
        .ok_or_else(|| SolveError::Numerical("singular optimal basis".to_string()))?;
    // obj(w) = max - sum r_j w_j over nonbasic j, so r_j < 0 pins w_j to 0.
    let on_face: Vec<bool> = (0..form.width())
        .map(|j| optimal.contains(&j) || form.reduced_cost(j, &duals) > -TOLERANCE)
        .collect();

    let mut start = optimal;
    start.sort_unstable();

    let mut seen: FxHashSet<Vec<usize>> = FxHashSet::default();
    let mut queue = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back(start);

    let mut vertices: Vec<Vec<f64>> = Vec::new();
    while let Some(basis) = queue.pop_front() {
        let Some(values) = form.basic_values(&basis) else {
            continue;
        };
        if values.iter().any(|&v| v < -FEASIBILITY_SLACK) {
            continue;
        }

        let point = form.point(&basis, &values);
        if !vertices.iter().any(|v| same_point(v, &point)) {
            vertices.push(point);
        }

        for entering in (0..form.width()).filter(|&j| on_face[j] && !basis.contains(&j)) {
            for next in form.pivots(&basis, &values, entering) {
                if seen.contains(&next) {
                    continue;
                }
                if seen.len() as u64 >= max_bases {
                    return Err(SolveError::Overflow { limit: max_bases });
                }
                seen.insert(next.clone());
                queue.push_back(next);
            }
        }
    }

    Ok(vertices)
}

/// Basic values this far below zero still count as feasible.
const FEASIBILITY_SLACK: f64 = 1e-7;

/// `M w + t = 1` over columns `[M | I]`.
struct EqualityForm<'a> {
    m: &'a PayoffMatrix,
    k: usize,
    d: usize,
}

impl<'a> EqualityForm<'a> {
    fn new(m: &'a PayoffMatrix) -> Self {
        Self {
            m,
            k: m.rows(),
            d: m.cols(),
        }
    }

    fn width(&self) -> usize {
        self.d + self.k
    }

    /// Entry `row` of column `j`.
    fn entry(&self, row: usize, j: usize) -> f64 {
        if j < self.d {
            self.m.get(row, j)
        } else if j - self.d == row {
            1.0
        } else {
            0.0
        }
    }

    fn cost(&self, j: usize) -> f64 {
        if j < self.d {
            1.0
        } else {
            0.0
        }
    }

    /// Solve `B x = column(entering)`, or `B x = 1` when `entering` is `None`.
    fn solve_basis(&self, basis: &[usize], entering: Option<usize>) -> Option<Vec<f64>> {
        let k = self.k;
        let matrix = (0..k)
            .flat_map(|row| basis.iter().map(move |&j| (row, j)))
            .map(|(row, j)| self.entry(row, j))
            .collect();
        let rhs = match entering {
            Some(j) => (0..k).map(|row| self.entry(row, j)).collect(),
            None => vec![1.0; k],
        };
        linalg::solve(matrix, rhs)
    }

    fn basic_values(&self, basis: &[usize]) -> Option<Vec<f64>> {
        self.solve_basis(basis, None)
    }

    /// Simplex multipliers: `B^T y = c_B`.
    fn duals(&self, basis: &[usize]) -> Option<Vec<f64>> {
        let k = self.k;
        let transposed = basis
            .iter()
            .flat_map(|&j| (0..k).map(move |row| (row, j)))
            .map(|(row, j)| self.entry(row, j))
            .collect();
        let costs = basis.iter().map(|&j| self.cost(j)).collect();
        linalg::solve(transposed, costs)
    }

    fn reduced_cost(&self, j: usize, duals: &[f64]) -> f64 {
        let priced: f64 = duals.iter().enumerate().map(|(row, y)| y * self.entry(row, j)).sum();
        self.cost(j) - priced
    }

    /// Maximize `1^T w` from the slack basis, smallest-index entering and
    /// leaving columns (Bland's rule) so degenerate pivots cannot cycle.
    fn maximize(&self) -> Result<Vec<usize>, SolveError> {
        let numerical = |msg: &str| SolveError::Numerical(msg.to_string());
        let mut basis: Vec<usize> = (self.d..self.width()).collect();

        for _ in 0..MAX_PIVOTS {
            let values = self
                .basic_values(&basis)
                .ok_or_else(|| numerical("singular basis during simplex"))?;
            let duals = self
                .duals(&basis)
                .ok_or_else(|| numerical("singular basis during simplex"))?;

            let entering = (0..self.width())
                .filter(|j| !basis.contains(j))
                .find(|&j| self.reduced_cost(j, &duals) > TOLERANCE);
            let Some(entering) = entering else {
                return Ok(basis);
            };

            let direction = self
                .solve_basis(&basis, Some(entering))
                .ok_or_else(|| numerical("singular basis during simplex"))?;
            let ratios = ratio_test(&values, &direction);
            let theta = ratios
                .iter()
                .map(|&(_, r)| r)
                .reduce(f64::min)
                .ok_or_else(|| numerical("objective is unbounded"))?;
            let leaving = ratios
                .iter()
                .filter(|&&(_, r)| ties(r, theta))
                .map(|&(i, _)| i)
                .min_by_key(|&i| basis[i])
                .ok_or_else(|| numerical("empty ratio test"))?;

            basis[leaving] = entering;
        }

        Err(numerical("simplex pivot budget exhausted"))
    }

    /// Every feasible basis reached by bringing `entering` into `basis`.
    ///
    /// Each row tied in the ratio test gives one neighbour, which covers all
    /// degenerate pivots. Results are sorted.
    fn pivots(&self, basis: &[usize], values: &[f64], entering: usize) -> Vec<Vec<usize>> {
        let Some(direction) = self.solve_basis(basis, Some(entering)) else {
            return Vec::new();
        };
        let ratios = ratio_test(values, &direction);
        let Some(theta) = ratios.iter().map(|&(_, r)| r).reduce(f64::min) else {
            return Vec::new();
        };

        ratios
            .iter()
            .filter(|&&(_, r)| ties(r, theta))
            .map(|&(i, _)| {
                let mut next = basis.to_vec();
                next[i] = entering;
                next.sort_unstable();
                next
            })
            .collect()
    }

    /// The `w` part of a basic solution.
    fn point(&self, basis: &[usize], values: &[f64]) -> Vec<f64> {
        let mut point = vec![0.0; self.d];
        for (&j, &v) in basis.iter().zip(values) {
            if j < self.d {
                point[j] = v.max(0.0);
            }
        }
        point
    }
}

/// `(row, value / direction)` for every row the entering column can empty.
fn ratio_test(values: &[f64], direction: &[f64]) -> Vec<(usize, f64)> {
    direction
        .iter()
        .enumerate()
        .filter(|&(_, &dir)| dir > TOLERANCE)
        .map(|(i, &dir)| (i, values[i].max(0.0) / dir))
        .collect()
}

fn ties(ratio: f64, theta: f64) -> bool {
    ratio <= theta + TOLERANCE * (1.0 + theta.abs())
}

fn same_point(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < FEASIBILITY_SLACK)
}
