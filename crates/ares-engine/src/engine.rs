//! The allocation engine: price retrieval, then the analytics pipeline on
//! the bounded pool under a request deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ares_analytics::backtest::align_benchmark;
use ares_analytics::optimization::{FrontierPoint, MIN_ASSETS};
use ares_analytics::AnalyticsError;
use ares_core::types::DroppedSeries;
use ares_core::{AssetSeries, EngineConfig, PriceMatrix, Ticker};
use ares_traits::{PriceHistorySource, SourceError};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::pipeline::{generate_frontier, generate_portfolio};
use crate::pool::OptimizationPool;
use crate::request::{OptimizeRequest, ValidatedRequest};
use crate::response::{BacktestReport, OptimizeResponse, RiskDetails};
use crate::settings::EngineSettings;

/// Aligned market data for one request.
#[derive(Debug, Clone)]
pub struct MarketData {
    /// Aligned prices of the usable tickers.
    pub prices: PriceMatrix,
    /// Benchmark close per date of `prices`.
    pub benchmark: Vec<f64>,
    /// Requested tickers left out, with their coverage.
    pub dropped: Vec<DroppedSeries>,
}

/// Stateless allocation service over a price source.
#[derive(Clone)]
pub struct AllocationEngine {
    source: Arc<dyn PriceHistorySource>,
    settings: Arc<EngineSettings>,
    pool: OptimizationPool,
}

impl AllocationEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns an error if `settings` fail validation.
    pub fn new(source: Arc<dyn PriceHistorySource>, settings: EngineSettings) -> EngineResult<Self> {
        settings.validate()?;
        let pool = settings
            .max_concurrent_optimizations
            .map_or_else(OptimizationPool::with_available_parallelism, OptimizationPool::new);
        tracing::info!(
            pool_size = pool.size(),
            benchmark = %settings.benchmark,
            source = ?source.source_type(),
            "allocation engine ready"
        );
        Ok(Self {
            source,
            settings: Arc::new(settings),
            pool,
        })
    }

    /// Engine settings.
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Analytics configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.settings.engine
    }

    /// The optimization pool.
    #[must_use]
    pub fn pool(&self) -> &OptimizationPool {
        &self.pool
    }

    /// Full allocation for a client request.
    pub async fn optimize(&self, request: OptimizeRequest) -> EngineResult<OptimizeResponse> {
        let span = tracing::info_span!("optimize", request_id = %Uuid::new_v4());
        async move {
            let validated = request.validate()?;
            tracing::info!(
                tickers = ?validated.tickers,
                investment = validated.params.investment,
                risk_tolerance = validated.params.risk_tolerance,
                horizon = validated.params.time_horizon_years,
                "optimization request"
            );
            self.optimize_validated(validated).await
        }
        .instrument(span)
        .await
    }

    /// Backtest of the allocation for `request`.
    pub async fn backtest(&self, request: OptimizeRequest) -> EngineResult<BacktestReport> {
        Ok(self.optimize(request).await?.backtest_report())
    }

    /// Risk analytics of the allocation for `request`.
    pub async fn risk_details(&self, request: OptimizeRequest) -> EngineResult<RiskDetails> {
        Ok(self.optimize(request).await?.risk_details())
    }

    /// Efficient frontier of `tickers` with the configured endpoint point count.
    pub async fn frontier(&self, tickers: Vec<Ticker>, time_horizon_years: u32) -> EngineResult<Vec<FrontierPoint>> {
        let span = tracing::info_span!("frontier", request_id = %Uuid::new_v4());
        async move {
            let market = self.load_market(&tickers, time_horizon_years).await?;
            let config = self.settings.engine.clone();
            let points = self.settings.frontier_endpoint_points;
            self.run_with_deadline(config.request_timeout(), move |deadline| {
                Ok(generate_frontier(&market.prices, points, &config, Some(deadline))?)
            })
            .await
        }
        .instrument(span)
        .await
    }

    async fn optimize_validated(&self, request: ValidatedRequest) -> EngineResult<OptimizeResponse> {
        let market = self.load_market(&request.tickers, request.params.time_horizon_years).await?;
        let config = self.settings.engine.clone();
        let params = request.params;
        let MarketData {
            prices,
            benchmark,
            dropped,
        } = market;

        let analysis = self
            .run_with_deadline(config.request_timeout(), move |deadline| {
                Ok(generate_portfolio(&prices, &benchmark, &params, &config, Some(deadline))?)
            })
            .await?;
        tracing::info!(
            strategy = %analysis.strategy,
            sharpe = analysis.portfolio.performance.sharpe_ratio,
            "optimization complete"
        );
        Ok(OptimizeResponse::from_analysis(analysis, &params, dropped))
    }

    /// Runs `job` on the pool; `job` receives the solver deadline.
    async fn run_with_deadline<T, F>(&self, timeout: Duration, job: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Instant) -> EngineResult<T> + Send + 'static,
    {
        let started = Instant::now();
        let deadline = started + timeout;
        let result = tokio::time::timeout(
            timeout + Duration::from_millis(50),
            self.pool.run(move || job(deadline)),
        )
        .await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(Err(e)) if e.is_deadline() => {
                tracing::warn!(elapsed_ms, error = %e, "request deadline exceeded");
                Err(EngineError::DeadlineExceeded { elapsed_ms })
            }
            Ok(inner) => inner,
            Err(_) => {
                tracing::warn!(elapsed_ms, "request deadline exceeded waiting for the pool");
                Err(EngineError::DeadlineExceeded { elapsed_ms })
            }
        }
    }

    /// Fetches and aligns the history of `tickers` and the benchmark.
    ///
    /// Tickers the source does not know are reported as dropped with zero
    /// coverage.
    pub async fn load_market(&self, tickers: &[Ticker], time_horizon_years: u32) -> EngineResult<MarketData> {
        let (start, end) = self.settings.history_window(time_horizon_years)?;
        let fetched = self.source.histories(tickers, start, end).await?;

        let mut dropped = Vec::new();
        let mut series: Vec<AssetSeries> = Vec::with_capacity(fetched.len());
        for (ticker, history) in fetched {
            match history {
                Some(s) if !s.is_empty() => series.push(s),
                _ => {
                    tracing::warn!(ticker = %ticker, "no price history, dropping ticker");
                    dropped.push(DroppedSeries {
                        ticker,
                        coverage: 0.0,
                    });
                }
            }
        }
        ensure_minimum(series.len())?;

        let aligned = PriceMatrix::align(&series, &self.settings.engine.alignment)?;
        for d in &aligned.dropped {
            tracing::warn!(ticker = %d.ticker, coverage = d.coverage, "insufficient coverage, dropping ticker");
        }
        dropped.extend(aligned.dropped);
        let prices = aligned.matrix;
        ensure_minimum(prices.n_assets())?;

        let benchmark_ticker = self.settings.benchmark_ticker()?;
        let benchmark_series = self
            .source
            .history(&benchmark_ticker, start, end)
            .await?
            .ok_or_else(|| {
                SourceError::SourceNotAvailable(format!("no history for benchmark {benchmark_ticker}"))
            })?;
        let benchmark = align_benchmark(prices.dates(), &benchmark_series)?;

        tracing::debug!(
            assets = prices.n_assets(),
            days = prices.n_days(),
            dropped = dropped.len(),
            "market data aligned"
        );
        Ok(MarketData {
            prices,
            benchmark,
            dropped,
        })
    }
}

fn ensure_minimum(available: usize) -> EngineResult<()> {
    if available < MIN_ASSETS {
        return Err(AnalyticsError::BelowMinimumAssets {
            available,
            required: MIN_ASSETS,
        }
        .into());
    }
    Ok(())
}
