//! Linear objectives over the box-constrained simplex.
//!
//! `{ w : Σw = 1, l ≤ w ≤ u }` is the feasible set of every allocation
//! problem in the engine. Its linear extremes have a closed form: start
//! every weight at its lower bound and pour the remaining budget into the
//! best-scoring coordinates first.

use nalgebra::DVector;

use crate::error::{MathError, MathResult};

/// Extreme values of `μᵀw` over the box-constrained simplex.
#[derive(Debug, Clone)]
pub struct ReturnRange {
    /// Smallest achievable `μᵀw`.
    pub min: f64,
    /// Largest achievable `μᵀw`.
    pub max: f64,
    /// A weight vector attaining `min`.
    pub argmin: DVector<f64>,
    /// A weight vector attaining `max`.
    pub argmax: DVector<f64>,
}

impl ReturnRange {
    /// Computes the range for scores `mu` and bounds `lower`/`upper`.
    ///
    /// # Errors
    ///
    /// Returns `MathError::Infeasible` if the bounds cannot sum to one.
    pub fn new(mu: &DVector<f64>, lower: &DVector<f64>, upper: &DVector<f64>) -> MathResult<Self> {
        let argmax = greedy_fill(mu, lower, upper, true)?;
        let argmin = greedy_fill(mu, lower, upper, false)?;
        Ok(Self {
            min: mu.dot(&argmin),
            max: mu.dot(&argmax),
            argmin,
            argmax,
        })
    }

    /// Returns true if `target` is achievable within `tolerance`.
    #[must_use]
    pub fn contains(&self, target: f64, tolerance: f64) -> bool {
        target >= self.min - tolerance && target <= self.max + tolerance
    }

    /// A feasible weight vector with `μᵀw = target`.
    ///
    /// Convex combination of the two extreme allocations, so it satisfies
    /// the budget and the bounds by construction.
    pub fn point_at(&self, target: f64, tolerance: f64) -> MathResult<DVector<f64>> {
        if !self.contains(target, tolerance) {
            return Err(MathError::infeasible(format!(
                "target {target:.6} outside achievable range [{:.6}, {:.6}]",
                self.min, self.max
            )));
        }
        let span = self.max - self.min;
        if span <= tolerance {
            return Ok(self.argmin.clone());
        }
        let t = ((target - self.min) / span).clamp(0.0, 1.0);
        Ok(&self.argmin * (1.0 - t) + &self.argmax * t)
    }
}

/// Optimizes `scoresᵀw` over `{ Σw = 1, lower ≤ w ≤ upper }`.
///
/// Ties are broken by index so the result is deterministic.
///
/// # Errors
///
/// Returns `MathError::Infeasible` if `Σlower > 1` or `Σupper < 1`.
pub fn greedy_fill(
    scores: &DVector<f64>,
    lower: &DVector<f64>,
    upper: &DVector<f64>,
    maximize: bool,
) -> MathResult<DVector<f64>> {
    let n = scores.len();
    if lower.len() != n || upper.len() != n {
        return Err(MathError::dimension_mismatch((n, 1), (lower.len(), upper.len())));
    }
    if n == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }
    let floor: f64 = lower.sum();
    let ceiling: f64 = upper.sum();
    if floor > 1.0 + 1e-12 || ceiling < 1.0 - 1e-12 {
        return Err(MathError::infeasible(format!(
            "weights bounded to [{floor:.4}, {ceiling:.4}] cannot sum to one"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let ord = scores[a].total_cmp(&scores[b]);
        let ord = if maximize { ord.reverse() } else { ord };
        ord.then(a.cmp(&b))
    });

    let mut weights = lower.clone();
    let mut remaining = 1.0 - floor;
    for i in order {
        if remaining <= 0.0 {
            break;
        }
        let add = (upper[i] - lower[i]).min(remaining);
        weights[i] += add;
        remaining -= add;
    }
    Ok(weights)
}
