//! Replicator dynamics integration.

use super::{PayoffMatrix, SolveError, Trajectory};

/// Right-hand side of the replicator equation: `x_i * ((A x)_i - x^T A x)`.
pub fn replicator_rhs(payoffs: &PayoffMatrix, x: &[f64]) -> Vec<f64> {
    let fitness = payoffs.mul_vec(x);
    let average: f64 = x.iter().zip(&fitness).map(|(xi, fi)| xi * fi).sum();
    x.iter()
        .zip(&fitness)
        .map(|(xi, fi)| xi * (fi - average))
        .collect()
}

/// One classic fourth-order Runge-Kutta step of size `dt`.
fn rk4_step(payoffs: &PayoffMatrix, x: &[f64], dt: f64) -> Vec<f64> {
    let offset = |base: &[f64], k: &[f64], h: f64| -> Vec<f64> {
        base.iter().zip(k).map(|(b, k)| b + h * k).collect()
    };

    let k1 = replicator_rhs(payoffs, x);
    let k2 = replicator_rhs(payoffs, &offset(x, &k1, dt / 2.0));
    let k3 = replicator_rhs(payoffs, &offset(x, &k2, dt / 2.0));
    let k4 = replicator_rhs(payoffs, &offset(x, &k3, dt));

    (0..x.len())
        .map(|i| x[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
        .collect()
}

/// Integrate from `initial`, recording the shares at every timepoint.
///
/// One RK4 step is taken between consecutive timepoints. The first recorded
/// state is `initial` itself, at `timepoints[0]`.
pub fn integrate(
    payoffs: &PayoffMatrix,
    initial: &[f64],
    timepoints: &[f64],
) -> Result<Trajectory, SolveError> {
    if !payoffs.is_square() {
        return Err(SolveError::Dimension(format!(
            "replicator dynamics needs a square matrix, got {}x{}",
            payoffs.rows(),
            payoffs.cols()
        )));
    }
    if initial.len() != payoffs.rows() {
        return Err(SolveError::Dimension(format!(
            "initial population has {} shares for {} strategies",
            initial.len(),
            payoffs.rows()
        )));
    }

    let mut trajectory = Vec::with_capacity(timepoints.len());
    if timepoints.is_empty() {
        return Ok(trajectory);
    }
    trajectory.push(initial.to_vec());

    for (step, window) in timepoints.windows(2).enumerate() {
        let dt = window[1] - window[0];
        let next = rk4_step(payoffs, &trajectory[step], dt);
        if next.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::NonFinite { step: step + 1 });
        }
        trajectory.push(next);
    }

    Ok(trajectory)
}
