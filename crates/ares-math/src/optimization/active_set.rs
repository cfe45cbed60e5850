//! Primal active-set solver for bounded convex quadratic programs.
//!
//! Solves
//!
//! ```text
//! minimize    ½ xᵀQx + cᵀx
//! subject to  A x = b
//!             l ≤ x ≤ u
//! ```
//!
//! with `Q` symmetric positive semi-definite. Equality constraints are always
//! in the working set; bound constraints enter when they block a step and
//! leave when their multiplier has the wrong sign. Each iteration solves the
//! KKT system restricted to the free variables through an SVD, which keeps
//! the step well defined when `Q` is only semi-definite.

use std::time::Instant;

use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};
use crate::linear_algebra::solve_least_squares;

/// Relative cutoff for singular values in the KKT solves.
const SVD_EPSILON: f64 = 1e-13;

/// A convex quadratic program with equality and box constraints.
#[derive(Debug, Clone)]
pub struct QpProblem {
    /// Quadratic term `Q` (n×n, symmetric PSD).
    pub quadratic: DMatrix<f64>,
    /// Linear term `c` (length n).
    pub linear: DVector<f64>,
    /// Equality constraint matrix `A` (m×n).
    pub equality_matrix: DMatrix<f64>,
    /// Equality right-hand side `b` (length m).
    pub equality_rhs: DVector<f64>,
    /// Lower bounds `l` (length n).
    pub lower: DVector<f64>,
    /// Upper bounds `u` (length n).
    pub upper: DVector<f64>,
}

impl QpProblem {
    /// Number of decision variables.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.quadratic.nrows()
    }

    /// Objective value `½ xᵀQx + cᵀx`.
    #[must_use]
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.quadratic * x)) + self.linear.dot(x)
    }

    /// Largest violation of any constraint at `x`.
    #[must_use]
    pub fn max_violation(&self, x: &DVector<f64>) -> f64 {
        let eq = (&self.equality_matrix * x - &self.equality_rhs).amax();
        let bounds = x
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&xi, (&lo, &hi))| (lo - xi).max(xi - hi).max(0.0))
            .fold(0.0_f64, f64::max);
        eq.max(bounds)
    }

    fn validate(&self) -> MathResult<()> {
        let n = self.dimension();
        if self.quadratic.ncols() != n {
            return Err(MathError::invalid_input("quadratic term must be square"));
        }
        if n == 0 {
            return Err(MathError::insufficient_data(1, 0));
        }
        for (name, len) in [
            ("linear", self.linear.len()),
            ("lower", self.lower.len()),
            ("upper", self.upper.len()),
        ] {
            if len != n {
                return Err(MathError::invalid_input(format!(
                    "{name} term has length {len}, expected {n}"
                )));
            }
        }
        if self.equality_matrix.ncols() != n
            || self.equality_matrix.nrows() != self.equality_rhs.len()
        {
            return Err(MathError::dimension_mismatch(
                self.equality_matrix.shape(),
                (self.equality_rhs.len(), n),
            ));
        }
        if let Some(i) = (0..n).find(|&i| self.lower[i] > self.upper[i]) {
            return Err(MathError::infeasible(format!(
                "lower bound exceeds upper bound at index {i}"
            )));
        }
        if self
            .quadratic
            .iter()
            .chain(self.linear.iter())
            .chain(self.equality_matrix.iter())
            .any(|v| !v.is_finite())
        {
            return Err(MathError::invalid_input("problem data must be finite"));
        }
        Ok(())
    }
}

/// Limits for one solve.
#[derive(Debug, Clone, Copy)]
pub struct QpConfig {
    /// Feasibility and optimality tolerance.
    pub tolerance: f64,
    /// Maximum number of active-set iterations.
    pub max_iterations: u32,
    /// Optional wall-clock deadline.
    pub deadline: Option<Instant>,
}

impl Default for QpConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 500,
            deadline: None,
        }
    }
}

impl QpConfig {
    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Result of a QP solve.
#[derive(Debug, Clone)]
pub struct QpSolution {
    /// Optimal point.
    pub x: DVector<f64>,
    /// Objective value at `x`.
    pub objective: f64,
    /// Active-set iterations used.
    pub iterations: u32,
    /// Number of bounds held at equality at the solution.
    pub active_bounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Free,
    Lower,
    Upper,
}

/// Solves a convex QP from a feasible starting point.
///
/// # Errors
///
/// - `MathError::InvalidInput` if the problem is malformed or `start` is not
///   feasible
/// - `MathError::ConvergenceFailed` if the iteration budget runs out
/// - `MathError::DeadlineExceeded` if the deadline passes
/// - `MathError::Unbounded` if the objective has no lower bound
pub fn solve_qp(
    problem: &QpProblem,
    start: &DVector<f64>,
    config: &QpConfig,
) -> MathResult<QpSolution> {
    problem.validate()?;
    let n = problem.dimension();
    if start.len() != n {
        return Err(MathError::dimension_mismatch((start.len(), 1), (n, 1)));
    }
    let feasibility_tol = config.tolerance.max(1e-12) * 1e3;
    let violation = problem.max_violation(start);
    if violation > feasibility_tol {
        return Err(MathError::invalid_input(format!(
            "starting point violates constraints by {violation:.2e}"
        )));
    }

    let step_tol = config.tolerance * 10.0;
    let mut x = start.clone();
    // Start with every bound inactive so the working set stays linearly
    // independent; degenerate zero-length steps add bounds back as needed.
    let mut state = vec![Bound::Free; n];
    let mut iterations = 0u32;
    let mut last_residual = f64::INFINITY;

    while iterations < config.max_iterations {
        if let Some(deadline) = config.deadline {
            if Instant::now() >= deadline {
                return Err(MathError::DeadlineExceeded { iterations });
            }
        }
        iterations += 1;

        let gradient = &problem.quadratic * &x + &problem.linear;
        let free: Vec<usize> = (0..n).filter(|&i| state[i] == Bound::Free).collect();
        let step = equality_qp_step(problem, &gradient, &free)?;

        let direction = match step {
            KktStep::Newton { step, multipliers } if step.amax() <= step_tol => {
                // Stationary on the current face: release the bound with the
                // most violated multiplier, or stop.
                let scale = 1.0 + gradient.amax();
                let priced = &gradient + problem.equality_matrix.transpose() * &multipliers;
                let worst = (0..n)
                    .filter_map(|i| match state[i] {
                        Bound::Free => None,
                        Bound::Lower => Some((i, -priced[i])),
                        Bound::Upper => Some((i, priced[i])),
                    })
                    .max_by(|a, b| a.1.total_cmp(&b.1));

                last_residual = worst.map_or(0.0, |(_, v)| v.max(0.0));
                match worst {
                    Some((i, v)) if v > step_tol * scale => {
                        log::trace!("releasing bound {i} (multiplier violation {v:.3e})");
                        state[i] = Bound::Free;
                        continue;
                    }
                    _ => {
                        return Ok(finish(problem, x, &state, iterations));
                    }
                }
            }
            KktStep::Newton { step, .. } => Direction {
                step,
                max_length: 1.0,
            },
            KktStep::Descent(direction) => direction,
        };

        // Ratio test against the bounds of the free variables.
        let mut length = direction.max_length;
        let mut blocking = None;
        for &i in &free {
            let p = direction.step[i];
            if p > step_tol {
                let room = (problem.upper[i] - x[i]).max(0.0) / p;
                if room < length {
                    length = room;
                    blocking = Some((i, Bound::Upper));
                }
            } else if p < -step_tol {
                let room = (problem.lower[i] - x[i]).min(0.0) / p;
                if room < length {
                    length = room;
                    blocking = Some((i, Bound::Lower));
                }
            }
        }

        if !length.is_finite() {
            return Err(MathError::Unbounded);
        }

        x += &direction.step * length;
        if let Some((i, side)) = blocking {
            state[i] = side;
            x[i] = match side {
                Bound::Upper => problem.upper[i],
                _ => problem.lower[i],
            };
        }
        last_residual = direction.step.amax() * length;
    }

    Err(MathError::convergence_failed(iterations, last_residual))
}

struct Direction {
    step: DVector<f64>,
    max_length: f64,
}

enum KktStep {
    /// Exact minimizer of the quadratic on the current face.
    Newton {
        step: DVector<f64>,
        multipliers: DVector<f64>,
    },
    /// The face has a zero-curvature descent direction; take a projected
    /// gradient step with an exact line search instead.
    Descent(Direction),
}

fn equality_qp_step(
    problem: &QpProblem,
    gradient: &DVector<f64>,
    free: &[usize],
) -> MathResult<KktStep> {
    let n = problem.dimension();
    let m = problem.equality_matrix.nrows();
    let k = free.len();

    let mut kkt = DMatrix::zeros(k + m, k + m);
    let mut rhs = DVector::zeros(k + m);
    for (a, &i) in free.iter().enumerate() {
        for (b, &j) in free.iter().enumerate() {
            kkt[(a, b)] = problem.quadratic[(i, j)];
        }
        for r in 0..m {
            kkt[(a, k + r)] = problem.equality_matrix[(r, i)];
            kkt[(k + r, a)] = problem.equality_matrix[(r, i)];
        }
        rhs[a] = -gradient[i];
    }

    let solution = solve_least_squares(&kkt, &rhs, SVD_EPSILON)?;
    let residual = (&kkt * &solution - &rhs).amax();

    if residual <= 1e-9 * (1.0 + rhs.amax()) {
        let mut step = DVector::zeros(n);
        for (a, &i) in free.iter().enumerate() {
            step[i] = solution[a];
        }
        let multipliers = solution.rows(k, m).into_owned();
        return Ok(KktStep::Newton { step, multipliers });
    }

    // Inconsistent KKT system: project the gradient onto the null space of
    // the free equality columns and line-search along it.
    let a_free = DMatrix::from_fn(m, k, |r, a| problem.equality_matrix[(r, free[a])]);
    let g_free = DVector::from_fn(k, |a, _| gradient[free[a]]);
    let nu = solve_least_squares(&a_free.transpose(), &(-&g_free), SVD_EPSILON)?;
    let projected = -(&g_free + a_free.transpose() * nu);

    let mut step = DVector::zeros(n);
    for (a, &i) in free.iter().enumerate() {
        step[i] = projected[a];
    }
    let slope = gradient.dot(&step);
    let curvature = step.dot(&(&problem.quadratic * &step));
    let max_length = if curvature > f64::EPSILON * (1.0 + slope.abs()) {
        -slope / curvature
    } else {
        f64::INFINITY
    };
    Ok(KktStep::Descent(Direction { step, max_length }))
}

fn finish(problem: &QpProblem, mut x: DVector<f64>, state: &[Bound], iterations: u32) -> QpSolution {
    for i in 0..x.len() {
        x[i] = x[i].clamp(problem.lower[i], problem.upper[i]);
    }
    QpSolution {
        objective: problem.objective(&x),
        active_bounds: state.iter().filter(|s| **s != Bound::Free).count(),
        iterations,
        x,
    }
}
