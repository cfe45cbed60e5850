//! Mean-variance optimization and the efficient frontier.

mod frontier;
mod optimizer;

pub use frontier::{efficient_frontier, efficient_frontier_with_points, frontier_targets, FrontierPoint};
pub use optimizer::{
    OptimizationMethod, OptimizedPortfolio, PortfolioOptimizer, PortfolioPerformance, MIN_ASSETS,
};
