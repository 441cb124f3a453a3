//! # CAPM
//!
//! $$
//! r_{i,t} - r_{f,t} = \alpha + \beta\,(r_{m,t} - r_{f,t}) + \varepsilon_t
//! $$
//!
//! Ordinary least squares of asset excess returns on benchmark excess returns.

use serde::Serialize;

use crate::error::AnalyticsError;
use crate::error::Result;
use crate::series::align_returns;
use crate::series::ReturnSeries;
use crate::stats::moments;

/// Minimum common dates needed for a regression.
pub const MIN_REGRESSION_OBSERVATIONS: usize = 2;

/// Per-period risk-free rate.
#[derive(Clone, Debug, PartialEq)]
pub enum RiskFree {
  Constant(f64),
  /// One rate per aligned observation.
  Series(Vec<f64>),
}

impl RiskFree {
  fn at(&self, i: usize) -> f64 {
    match self {
      RiskFree::Constant(rf) => *rf,
      RiskFree::Series(rates) => rates[i],
    }
  }
}

/// Regression of one asset on the benchmark.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapmResult {
  pub beta: f64,
  /// Per-period intercept.
  pub alpha: f64,
  pub r_squared: f64,
  pub correlation: f64,
  pub observations: usize,
}

impl CapmResult {
  pub fn annualized_alpha(&self, annualization_factor: f64) -> f64 {
    self.alpha * annualization_factor
  }
}

/// Regress `asset` on `benchmark` over their common dates.
pub fn compute_capm(
  asset: &ReturnSeries,
  benchmark: &ReturnSeries,
  risk_free: &RiskFree,
) -> Result<CapmResult> {
  let aligned = align_returns([asset, benchmark], MIN_REGRESSION_OBSERVATIONS)?;
  let columns = aligned.columns();
  capm_regression(&columns[0], &columns[1], risk_free)
}

/// Regression on already aligned, equally long return slices.
pub fn capm_regression(asset: &[f64], benchmark: &[f64], risk_free: &RiskFree) -> Result<CapmResult> {
  let n = asset.len();
  if benchmark.len() != n {
    return Err(AnalyticsError::InvalidParameter(format!(
      "asset has {n} returns but benchmark has {}",
      benchmark.len()
    )));
  }
  if n < MIN_REGRESSION_OBSERVATIONS {
    return Err(AnalyticsError::InsufficientOverlap {
      required: MIN_REGRESSION_OBSERVATIONS,
      actual: n,
    });
  }
  if let RiskFree::Series(rates) = risk_free {
    if rates.len() != n {
      return Err(AnalyticsError::InvalidParameter(format!(
        "risk-free series has {} rates for {n} observations",
        rates.len()
      )));
    }
  }

  let asset_excess: Vec<f64> = (0..n).map(|i| asset[i] - risk_free.at(i)).collect();
  let bench_excess: Vec<f64> = (0..n).map(|i| benchmark[i] - risk_free.at(i)).collect();

  let bench_mean = moments::mean(&bench_excess);
  let bench_var = moments::sample_variance(&bench_excess, bench_mean);
  if !(bench_var > 0.0 && bench_var.is_finite()) {
    return Err(AnalyticsError::DegenerateRegression);
  }

  let beta = moments::sample_covariance(&asset_excess, &bench_excess) / bench_var;
  let alpha = moments::mean(&asset_excess) - beta * bench_mean;
  // A constant asset against a moving benchmark has zero correlation.
  let correlation = moments::pearson(&asset_excess, &bench_excess).unwrap_or(0.0);

  Ok(CapmResult {
    beta,
    alpha,
    r_squared: correlation * correlation,
    correlation,
    observations: n,
  })
}
