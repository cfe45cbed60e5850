//! Linear algebra utilities.
//!
//! Dense helpers over `nalgebra` matrices used by the estimators and the
//! QP solver.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Computes the quadratic form `xᵀ M x`.
pub fn quadratic_form(matrix: &DMatrix<f64>, x: &DVector<f64>) -> MathResult<f64> {
    ensure_square(matrix)?;
    if matrix.nrows() != x.len() {
        return Err(MathError::dimension_mismatch(matrix.shape(), (x.len(), 1)));
    }
    Ok(x.dot(&(matrix * x)))
}

/// Returns true if `|M - Mᵀ|` is within `tolerance` everywhere.
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let n = matrix.nrows();
    (0..n).all(|i| (i + 1..n).all(|j| (matrix[(i, j)] - matrix[(j, i)]).abs() <= tolerance))
}

/// Eigenvalues of a symmetric matrix, ascending.
pub fn symmetric_eigenvalues(matrix: &DMatrix<f64>) -> MathResult<Vec<f64>> {
    ensure_square(matrix)?;
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("matrix contains non-finite values"));
    }
    let mut eigenvalues: Vec<f64> = SymmetricEigen::new(matrix.clone())
        .eigenvalues
        .iter()
        .copied()
        .collect();
    eigenvalues.sort_by(f64::total_cmp);
    Ok(eigenvalues)
}

/// Returns true if every eigenvalue is at least `-tolerance`.
pub fn is_positive_semidefinite(matrix: &DMatrix<f64>, tolerance: f64) -> MathResult<bool> {
    let eigenvalues = symmetric_eigenvalues(matrix)?;
    Ok(eigenvalues.first().map_or(true, |&min| min >= -tolerance))
}

/// Solves a square linear system `Ax = b` by LU decomposition.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    ensure_square(a)?;
    if a.nrows() != b.len() {
        return Err(MathError::dimension_mismatch(a.shape(), (b.len(), 1)));
    }
    let solution = a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(MathError::SingularMatrix);
    }
    Ok(solution)
}

/// Minimum-norm least-squares solution of `Ax ≈ b` via SVD.
///
/// Singular values below `epsilon` times the largest are treated as zero,
/// so rank-deficient systems are accepted.
pub fn solve_least_squares(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    epsilon: f64,
) -> MathResult<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(MathError::dimension_mismatch(a.shape(), (b.len(), 1)));
    }
    if a.ncols() == 0 {
        return Ok(DVector::zeros(0));
    }
    let svd = a.clone().svd(true, true);
    let largest = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    if largest == 0.0 {
        return Ok(DVector::zeros(a.ncols()));
    }
    svd.solve(b, epsilon * largest)
        .map_err(|reason| MathError::invalid_input(reason.to_string()))
}

/// Converts a covariance matrix to a correlation matrix.
///
/// Rows and columns with zero variance are reported as an error; the
/// diagonal of the result is exactly one.
pub fn covariance_to_correlation(covariance: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    ensure_square(covariance)?;
    let n = covariance.nrows();
    let std: Vec<f64> = (0..n).map(|i| covariance[(i, i)].max(0.0).sqrt()).collect();
    if let Some(i) = std.iter().position(|&s| s == 0.0) {
        return Err(MathError::invalid_input(format!("zero variance at index {i}")));
    }
    Ok(DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            1.0
        } else {
            (covariance[(i, j)] / (std[i] * std[j])).clamp(-1.0, 1.0)
        }
    }))
}

fn ensure_square(matrix: &DMatrix<f64>) -> MathResult<()> {
    if matrix.nrows() == matrix.ncols() {
        Ok(())
    } else {
        Err(MathError::invalid_input(format!(
            "matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )))
    }
}
