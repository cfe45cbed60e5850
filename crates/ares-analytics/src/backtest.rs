//! Buy-and-hold backtest with monthly contributions.
//!
//! At the first date the initial investment buys shares in proportion to
//! the target weights. On the first trading day of every later calendar
//! month the contribution buys more shares at that day's prices, again in
//! target proportions. Holdings are never rebalanced.

use ares_core::{AssetSeries, Date, PriceMatrix};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Initial investment and periodic contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    /// Amount invested on the first day.
    pub investment: f64,
    /// Amount added on the first trading day of each later month.
    pub monthly_contribution: f64,
    /// Trading days per year used for CAGR.
    pub trading_days_per_year: usize,
}

impl BacktestParams {
    /// Lump-sum backtest with no contributions.
    #[must_use]
    pub fn new(investment: f64) -> Self {
        Self {
            investment,
            monthly_contribution: 0.0,
            trading_days_per_year: 252,
        }
    }

    /// Sets the monthly contribution.
    #[must_use]
    pub fn with_monthly_contribution(mut self, amount: f64) -> Self {
        self.monthly_contribution = amount;
        self
    }

    /// Sets trading days per year.
    #[must_use]
    pub fn with_trading_days(mut self, days: usize) -> Self {
        self.trading_days_per_year = days;
        self
    }

    fn validate(&self) -> AnalyticsResult<()> {
        if !(self.investment.is_finite() && self.investment > 0.0) {
            return Err(AnalyticsError::invalid_input(format!(
                "investment must be positive, got {}",
                self.investment
            )));
        }
        if !(self.monthly_contribution.is_finite() && self.monthly_contribution >= 0.0) {
            return Err(AnalyticsError::invalid_input(format!(
                "monthly contribution must be non-negative, got {}",
                self.monthly_contribution
            )));
        }
        if self.trading_days_per_year == 0 {
            return Err(AnalyticsError::invalid_input("trading days per year must be positive"));
        }
        Ok(())
    }
}

/// Simulated growth of the portfolio and the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Date axis.
    pub dates: Vec<Date>,
    /// Portfolio value per date.
    pub portfolio_values: Vec<f64>,
    /// Benchmark value per date under the same cash flows.
    pub benchmark_values: Vec<f64>,
    /// `final / total_invested − 1`.
    pub portfolio_total_return: f64,
    /// Benchmark total return.
    pub benchmark_total_return: f64,
    /// `(final / initial)^(1/years) − 1`.
    pub portfolio_cagr: f64,
    /// Benchmark CAGR.
    pub benchmark_cagr: f64,
    /// Contribution amount, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_contribution: Option<f64>,
    /// Cash put in over the whole backtest.
    pub total_invested: f64,
    /// Largest peak-to-trough decline, in percent.
    pub max_drawdown_pct: f64,
    /// Drawdown from the running peak per date, in percent.
    pub drawdown_values: Vec<f64>,
}

/// Runs the backtest over `prices` with a benchmark aligned to the same dates.
///
/// # Errors
///
/// - `AnalyticsError::DimensionMismatch` if weights or benchmark lengths
///   disagree with `prices`
/// - `AnalyticsError::InvalidInput` for empty history or bad parameters
pub fn run_backtest(
    prices: &PriceMatrix,
    weights: &[f64],
    benchmark: &[f64],
    params: &BacktestParams,
) -> AnalyticsResult<BacktestResult> {
    params.validate()?;
    if weights.len() != prices.n_assets() {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{} weights for {} assets",
            weights.len(),
            prices.n_assets()
        )));
    }
    if benchmark.len() != prices.n_days() {
        return Err(AnalyticsError::dimension_mismatch(format!(
            "{} benchmark prices for {} days",
            benchmark.len(),
            prices.n_days()
        )));
    }
    if prices.n_days() == 0 {
        return Err(AnalyticsError::invalid_input("backtest needs at least one day"));
    }
    if benchmark.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(AnalyticsError::invalid_input("benchmark prices must be positive"));
    }

    let dates = prices.dates();
    let n_assets = prices.n_assets();
    let matrix = prices.prices();

    let mut shares = vec![0.0; n_assets];
    let mut bench_shares = 0.0;
    let mut total_invested = 0.0;
    let mut portfolio_values = Vec::with_capacity(dates.len());
    let mut benchmark_values = Vec::with_capacity(dates.len());

    for (t, date) in dates.iter().enumerate() {
        let cash = if t == 0 {
            params.investment
        } else if !date.same_month(&dates[t - 1]) {
            params.monthly_contribution
        } else {
            0.0
        };
        if cash > 0.0 {
            for (i, held) in shares.iter_mut().enumerate() {
                *held += cash * weights[i] / matrix[(t, i)];
            }
            bench_shares += cash / benchmark[t];
            total_invested += cash;
        }
        portfolio_values.push((0..n_assets).map(|i| shares[i] * matrix[(t, i)]).sum::<f64>());
        benchmark_values.push(bench_shares * benchmark[t]);
    }

    let years = (dates.len() - 1) as f64 / params.trading_days_per_year as f64;
    let drawdown_values = drawdowns(&portfolio_values);
    let max_drawdown_pct = drawdown_values.iter().copied().fold(0.0, f64::max);
    let final_portfolio = portfolio_values.last().copied().unwrap_or(0.0);
    let final_benchmark = benchmark_values.last().copied().unwrap_or(0.0);

    tracing::debug!(
        days = dates.len(),
        total_invested,
        max_drawdown_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        portfolio_total_return: final_portfolio / total_invested - 1.0,
        benchmark_total_return: final_benchmark / total_invested - 1.0,
        portfolio_cagr: cagr(final_portfolio, params.investment, years),
        benchmark_cagr: cagr(final_benchmark, params.investment, years),
        monthly_contribution: (params.monthly_contribution > 0.0).then_some(params.monthly_contribution),
        total_invested,
        max_drawdown_pct,
        drawdown_values,
        dates: dates.to_vec(),
        portfolio_values,
        benchmark_values,
    })
}

/// Reindexes a benchmark series onto `dates`.
///
/// Missing dates take the previous close; dates before the first
/// observation take the first close.
pub fn align_benchmark(dates: &[Date], benchmark: &AssetSeries) -> AnalyticsResult<Vec<f64>> {
    let points = benchmark.points();
    let first = points.first().ok_or_else(|| AnalyticsError::InsufficientData {
        ticker: benchmark.ticker().to_string(),
        available: 0,
        required: 1,
    })?;

    let mut aligned = Vec::with_capacity(dates.len());
    let mut cursor = 0;
    let mut last = first.close;
    for date in dates {
        while cursor < points.len() && points[cursor].date <= *date {
            last = points[cursor].close;
            cursor += 1;
        }
        aligned.push(last);
    }
    Ok(aligned)
}

/// Percent drawdown from the running peak.
fn drawdowns(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::MIN;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak > 0.0 {
                (peak - v) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

fn cagr(final_value: f64, initial: f64, years: f64) -> f64 {
    if years <= 0.0 || initial <= 0.0 || final_value <= 0.0 {
        return 0.0;
    }
    (final_value / initial).powf(1.0 / years) - 1.0
}
