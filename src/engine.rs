//! # Analytics Engine
//!
//! $$
//! \{P_i\}_{i}, P_m \mapsto (\text{stats}_i, \beta_i, \text{normality}_i, \text{frontier})
//! $$
//!
//! Single entry point running the whole per-request pipeline.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::capm::capm_regression;
use crate::capm::CapmResult;
use crate::capm::RiskFree;
use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::frontier::FrontierInputs;
use crate::frontier::FrontierResult;
use crate::frontier::FrontierSimulator;
use crate::metrics::compute_asset_statistics;
use crate::metrics::AssetStatistics;
use crate::portfolio::portfolio_returns;
use crate::portfolio::Portfolio;
use crate::series::align_returns;
use crate::series::build_return_series;
use crate::series::AlignedReturns;
use crate::series::PriceSeries;
use crate::series::ReturnSeries;
use crate::stats::normality::test_normality;
use crate::stats::normality::NormalityResult;

/// Price histories for one analysis run.
#[derive(Clone, Debug, Default)]
pub struct AnalysisRequest {
  pub assets: Vec<PriceSeries>,
  /// Market proxy for CAPM; no regressions without it.
  pub benchmark: Option<PriceSeries>,
  /// Weights of the summary portfolio; equal weights over the aligned assets when absent.
  pub weights: Option<Portfolio>,
}

/// Results for one symbol. Each part fails independently.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetReport {
  pub statistics: Result<AssetStatistics>,
  pub normality: Result<NormalityResult>,
  /// `None` when the request has no benchmark.
  pub capm: Option<Result<CapmResult>>,
}

/// Results for the aggregated portfolio.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioReport {
  pub weights: Portfolio,
  pub statistics: Result<AssetStatistics>,
  pub normality: Result<NormalityResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
  pub assets: BTreeMap<String, AssetReport>,
  pub portfolio: Result<PortfolioReport>,
  pub frontier: Result<FrontierResult>,
}

/// Runs every analysis of a request under one configuration.
#[derive(Clone, Debug)]
pub struct AnalyticsEngine {
  config: AnalyticsConfig,
}

impl AnalyticsEngine {
  /// Validate `config` and build the engine.
  pub fn new(config: AnalyticsConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &AnalyticsConfig {
    &self.config
  }

  /// Statistics of one return series under the engine configuration.
  pub fn asset_statistics(&self, returns: &ReturnSeries) -> Result<AssetStatistics> {
    compute_asset_statistics(
      returns,
      self.config.risk_free_rate,
      self.config.annualization_factor,
      &self.config.var,
    )
  }

  /// Normality verdict of one return series at the configured threshold.
  pub fn normality(&self, returns: &ReturnSeries) -> Result<NormalityResult> {
    test_normality(returns, self.config.normality_threshold)
  }

  /// Regression of `asset` on `benchmark` with the configured overlap and risk-free rate.
  pub fn capm(&self, asset: &ReturnSeries, benchmark: &ReturnSeries) -> Result<CapmResult> {
    let aligned = align_returns([asset, benchmark], self.config.min_overlap)?;
    let columns = aligned.columns();
    capm_regression(
      &columns[0],
      &columns[1],
      &RiskFree::Constant(self.config.periodic_risk_free()),
    )
  }

  /// Frontier over the aligned assets.
  pub fn frontier(&self, aligned: &AlignedReturns) -> Result<FrontierResult> {
    FrontierSimulator::new(
      FrontierInputs::from_aligned(aligned),
      self.config.frontier.clone(),
      self.config.risk_free_rate,
      self.config.annualization_factor,
    )?
    .run()
  }

  /// Run the full pipeline.
  ///
  /// Only an empty request fails as a whole; every other failure is recorded
  /// in the report next to the symbol or section it concerns.
  pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
    if request.assets.is_empty() {
      return Err(AnalyticsError::InsufficientData {
        required: 1,
        actual: 0,
      });
    }
    debug!(
      assets = request.assets.len(),
      benchmark = ?request.benchmark.as_ref().map(|b| b.symbol()),
      "analysis started"
    );

    let benchmark = request.benchmark.as_ref().map(build_return_series);
    let mut returns = Vec::with_capacity(request.assets.len());
    let mut assets = BTreeMap::new();

    for prices in &request.assets {
      let symbol = prices.symbol().to_string();
      let report = match build_return_series(prices) {
        Ok(r) => {
          let report = AssetReport {
            statistics: self.asset_statistics(&r),
            normality: self.normality(&r),
            capm: benchmark.as_ref().map(|b| match b {
              Ok(b) => self.capm(&r, b),
              Err(e) => Err(e.clone()),
            }),
          };
          returns.push(r);
          report
        }
        Err(e) => AssetReport {
          statistics: Err(e.clone()),
          normality: Err(e.clone()),
          capm: benchmark.as_ref().map(|_| Err(e)),
        },
      };
      log_failures(&symbol, &report);
      assets.insert(symbol, report);
    }

    let aligned = align_returns(&returns, self.config.min_overlap);
    if let Err(e) = &aligned {
      warn!(error = %e, "assets could not be aligned");
    }

    let portfolio = aligned.as_ref().map_err(Clone::clone).and_then(|a| self.portfolio(a, request));
    let frontier = aligned.as_ref().map_err(Clone::clone).and_then(|a| self.frontier(a));
    match &frontier {
      Ok(f) => debug!(points = f.points().len(), efficient = f.efficient_len(), "analysis finished"),
      Err(e) => warn!(error = %e, "frontier unavailable"),
    }

    Ok(AnalysisReport {
      assets,
      portfolio,
      frontier,
    })
  }

  fn portfolio(&self, aligned: &AlignedReturns, request: &AnalysisRequest) -> Result<PortfolioReport> {
    let weights = match &request.weights {
      Some(w) => w.clone(),
      None => Portfolio::equal_weight(aligned.symbols())?,
    };
    let series = portfolio_returns(aligned, &weights)?;

    Ok(PortfolioReport {
      statistics: self.asset_statistics(&series),
      normality: self.normality(&series),
      weights,
    })
  }
}

fn log_failures(symbol: &str, report: &AssetReport) {
  if let Err(e) = &report.statistics {
    warn!(symbol, error = %e, "statistics unavailable");
  }
  if let Err(e) = &report.normality {
    warn!(symbol, error = %e, "normality unavailable");
  }
  if let Some(Err(e)) = &report.capm {
    warn!(symbol, error = %e, "capm unavailable");
  }
}
