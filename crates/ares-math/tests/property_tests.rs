//! Property-based tests for the QP solver.
//!
//! Each property is checked over a sweep of deterministic seeds:
//! - Solutions satisfy the budget and the bounds
//! - No sampled feasible point has a lower objective
//! - Target-return constraints are met exactly

use ares_math::prelude::*;
use nalgebra::{DMatrix, DVector};

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// Simple deterministic hash for test data generation.
fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut x = seed.wrapping_add(i).wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x = x.wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x
}

/// Uniform value in [0, 1) derived from the hash.
fn unit(seed: u64, i: u64) -> f64 {
    (simple_hash(seed, i) % 1_000_000) as f64 / 1_000_000.0
}

/// Covariance-like matrix `BᵀB/k + εI` with annual variances around 1-10%.
fn generate_covariance(n: usize, seed: u64) -> DMatrix<f64> {
    let k = n + 3;
    let b = DMatrix::from_fn(k, n, |r, c| {
        0.3 * (unit(seed, (r * n + c) as u64) - 0.5)
    });
    b.transpose() * &b / k as f64 + DMatrix::identity(n, n) * 1e-4
}

fn generate_returns(n: usize, seed: u64) -> DVector<f64> {
    DVector::from_fn(n, |i, _| 0.02 + 0.15 * unit(seed ^ 0xABCD, i as u64))
}

fn budget_problem(covariance: DMatrix<f64>, cap: f64) -> QpProblem {
    let n = covariance.nrows();
    QpProblem {
        quadratic: covariance * 2.0,
        linear: DVector::zeros(n),
        equality_matrix: DMatrix::from_element(1, n, 1.0),
        equality_rhs: DVector::from_element(1, 1.0),
        lower: DVector::zeros(n),
        upper: DVector::from_element(n, cap),
    }
}

// =============================================================================
// PROPERTY: FEASIBILITY
// =============================================================================

#[test]
fn property_solution_is_feasible() {
    for seed in 0..20 {
        for n in [2, 3, 5, 8, 12] {
            for cap in [1.0, 0.5] {
                if cap * (n as f64) < 1.0 {
                    continue;
                }
                let problem = budget_problem(generate_covariance(n, seed), cap);
                let start = DVector::from_element(n, 1.0 / n as f64);
                let solution = solve_qp(&problem, &start, &QpConfig::default()).unwrap();

                assert!(
                    (solution.x.sum() - 1.0).abs() < 1e-9,
                    "weights sum to {} for n={}, seed={}",
                    solution.x.sum(),
                    n,
                    seed
                );
                assert!(
                    solution.x.iter().all(|&w| (0.0..=cap + 1e-12).contains(&w)),
                    "bounds violated for n={}, seed={}",
                    n,
                    seed
                );
            }
        }
    }
}

// =============================================================================
// PROPERTY: OPTIMALITY
// =============================================================================

#[test]
fn property_no_sampled_point_beats_solution() {
    for seed in 0..20 {
        for n in [3, 5, 8] {
            let problem = budget_problem(generate_covariance(n, seed), 1.0);
            let start = DVector::from_element(n, 1.0 / n as f64);
            let solution = solve_qp(&problem, &start, &QpConfig::default()).unwrap();

            for sample in 0..50u64 {
                let raw = DVector::from_fn(n, |i, _| {
                    unit(seed * 1000 + sample, i as u64) + 1e-6
                });
                let candidate = &raw / raw.sum();
                assert!(
                    solution.objective <= problem.objective(&candidate) + 1e-12,
                    "sample {} beats solver for n={}, seed={}",
                    sample,
                    n,
                    seed
                );
            }
        }
    }
}

// =============================================================================
// PROPERTY: TARGET RETURN
// =============================================================================

#[test]
fn property_target_return_is_met() {
    for seed in 0..20 {
        for n in [3, 6, 10] {
            let mu = generate_returns(n, seed);
            let mut problem = budget_problem(generate_covariance(n, seed), 1.0);
            let range = ReturnRange::new(&mu, &problem.lower, &problem.upper).unwrap();

            for step in 1..5 {
                let target = range.min + (range.max - range.min) * f64::from(step) / 5.0;
                problem.equality_matrix = DMatrix::from_fn(2, n, |r, c| if r == 0 { 1.0 } else { mu[c] });
                problem.equality_rhs = DVector::from_vec(vec![1.0, target]);

                let start = range.point_at(target, 1e-12).unwrap();
                let solution = solve_qp(&problem, &start, &QpConfig::default()).unwrap();

                assert!(
                    (mu.dot(&solution.x) - target).abs() < 1e-8,
                    "target {} missed for n={}, seed={}",
                    target,
                    n,
                    seed
                );
                assert!((solution.x.sum() - 1.0).abs() < 1e-9);
                assert!(solution.x.iter().all(|&w| w >= 0.0));
            }
        }
    }
}
