//! Golden-section search for unimodal scalar functions.

use crate::error::MathError;

/// Inverse golden ratio, (√5 − 1)/2.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Result of a scalar search.
#[derive(Debug, Clone, Copy)]
pub struct ScalarOptimum {
    /// Location of the optimum.
    pub x: f64,
    /// Function value at `x`.
    pub value: f64,
    /// Number of interval reductions performed.
    pub iterations: u32,
}

/// Maximizes a unimodal (or quasi-concave) function on `[a, b]`.
///
/// The objective may fail; the first error is returned unchanged. Stops when
/// the bracket is narrower than `tolerance × (1 + |a| + |b|)` or after
/// `max_iterations` reductions, whichever comes first. The best point
/// evaluated so far is returned, including the end points.
pub fn golden_section_max<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Result<ScalarOptimum, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    if !(a.is_finite() && b.is_finite()) || a > b {
        return Err(MathError::invalid_input(format!("invalid bracket [{a}, {b}]")).into());
    }

    let mut lo = a;
    let mut hi = b;
    let mut best = ScalarOptimum {
        x: a,
        value: f(a)?,
        iterations: 0,
    };
    if b > a {
        let fb = f(b)?;
        if fb > best.value {
            best = ScalarOptimum {
                x: b,
                value: fb,
                iterations: 0,
            };
        }
    }

    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = f(x1)?;
    let mut f2 = f(x2)?;

    let mut iterations = 0;
    while iterations < max_iterations && (hi - lo) > tolerance * (1.0 + lo.abs() + hi.abs()) {
        iterations += 1;
        if f1 >= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1)?;
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2)?;
        }
    }

    for (x, value) in [(x1, f1), (x2, f2)] {
        if value > best.value {
            best.x = x;
            best.value = value;
        }
    }
    best.iterations = iterations;
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathResult;
    use approx::assert_relative_eq;

    fn ok(value: f64) -> MathResult<f64> {
        Ok(value)
    }

    #[test]
    fn test_parabola() {
        let result = golden_section_max(|x| ok(-(x - 2.0).powi(2)), 0.0, 5.0, 1e-10, 200).unwrap();
        assert_relative_eq!(result.x, 2.0, epsilon = 1e-6);
        assert!(result.iterations > 10);
    }

    #[test]
    fn test_monotone_picks_endpoint() {
        let result = golden_section_max(ok, 1.0, 3.0, 1e-8, 200).unwrap();
        assert_relative_eq!(result.x, 3.0);
    }

    #[test]
    fn test_degenerate_bracket() {
        let result = golden_section_max(|x| ok(x * x), 1.5, 1.5, 1e-8, 200).unwrap();
        assert_relative_eq!(result.x, 1.5);
        assert!(golden_section_max(ok, 2.0, 1.0, 1e-8, 10).is_err());
    }

    #[test]
    fn test_propagates_error() {
        let result = golden_section_max(
            |x| {
                if x > 1.0 {
                    Err(MathError::Unbounded)
                } else {
                    ok(x)
                }
            },
            0.0,
            2.0,
            1e-8,
            50,
        );
        assert!(matches!(result, Err(MathError::Unbounded)));
    }
}
