//! # Configuration
//!
//! Engine-wide settings. The annualization factor and the VaR convention are
//! required choices and have no default.

use serde::Deserialize;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::error::Result;
use crate::frontier::FrontierConfig;

/// Trading-day convention for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Calendar-day convention for daily data.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Value-at-Risk estimation method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
  /// Empirical lower-tail percentile of observed returns.
  Historical,
  /// Gaussian quantile from the sample mean and deviation.
  Parametric,
}

/// Value-at-Risk convention: one-tailed, at `confidence`, over `horizon` periods.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarConfig {
  pub method: VarMethod,
  /// Confidence level in `(0, 1)`, e.g. `0.95`.
  pub confidence: f64,
  /// Horizon in periods; the estimate is scaled by `sqrt(horizon)`.
  #[serde(default = "default_horizon")]
  pub horizon: f64,
}

fn default_horizon() -> f64 {
  1.0
}

impl VarConfig {
  pub fn historical(confidence: f64) -> Self {
    Self {
      method: VarMethod::Historical,
      confidence,
      horizon: 1.0,
    }
  }

  pub fn parametric(confidence: f64) -> Self {
    Self {
      method: VarMethod::Parametric,
      confidence,
      horizon: 1.0,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if !(self.confidence > 0.0 && self.confidence < 1.0) {
      return Err(AnalyticsError::InvalidParameter(format!(
        "VaR confidence must be in (0, 1), got {}",
        self.confidence
      )));
    }
    if !(self.horizon.is_finite() && self.horizon > 0.0) {
      return Err(AnalyticsError::InvalidParameter(format!(
        "VaR horizon must be positive, got {}",
        self.horizon
      )));
    }
    Ok(())
  }
}

/// Settings for [`crate::engine::AnalyticsEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
  /// Periods per year used to annualize returns and volatilities.
  pub annualization_factor: f64,
  /// Annual risk-free rate.
  #[serde(default)]
  pub risk_free_rate: f64,
  pub var: VarConfig,
  /// p-value threshold for both normality tests.
  #[serde(default = "default_normality_threshold")]
  pub normality_threshold: f64,
  /// Minimum number of common dates for cross-asset work.
  #[serde(default = "default_min_overlap")]
  pub min_overlap: usize,
  #[serde(default)]
  pub frontier: FrontierConfig,
}

fn default_normality_threshold() -> f64 {
  0.05
}

fn default_min_overlap() -> usize {
  2
}

impl AnalyticsConfig {
  pub fn new(annualization_factor: f64, var: VarConfig) -> Self {
    Self {
      annualization_factor,
      risk_free_rate: 0.0,
      var,
      normality_threshold: default_normality_threshold(),
      min_overlap: default_min_overlap(),
      frontier: FrontierConfig::default(),
    }
  }

  pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
    self.risk_free_rate = risk_free_rate;
    self
  }

  pub fn with_frontier(mut self, frontier: FrontierConfig) -> Self {
    self.frontier = frontier;
    self
  }

  /// Parse and validate a JSON document.
  pub fn from_json(json: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(json)
      .map_err(|e| AnalyticsError::InvalidParameter(format!("config: {e}")))?;
    config.validate()?;
    Ok(config)
  }

  /// Annual risk-free rate converted to a per-period rate.
  pub fn periodic_risk_free(&self) -> f64 {
    self.risk_free_rate / self.annualization_factor
  }

  pub fn validate(&self) -> Result<()> {
    validate_annualization_factor(self.annualization_factor)?;
    validate_risk_free(self.risk_free_rate)?;
    self.var.validate()?;
    validate_threshold(self.normality_threshold)?;
    if self.min_overlap < 2 {
      return Err(AnalyticsError::InvalidParameter(format!(
        "min_overlap must be at least 2, got {}",
        self.min_overlap
      )));
    }
    self.frontier.validate()
  }
}

pub(crate) fn validate_annualization_factor(factor: f64) -> Result<()> {
  if factor.is_finite() && factor > 0.0 {
    Ok(())
  } else {
    Err(AnalyticsError::InvalidParameter(format!(
      "annualization factor must be positive, got {factor}"
    )))
  }
}

pub(crate) fn validate_risk_free(rate: f64) -> Result<()> {
  if rate.is_finite() {
    Ok(())
  } else {
    Err(AnalyticsError::InvalidParameter(format!(
      "risk-free rate must be finite, got {rate}"
    )))
  }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
  if threshold > 0.0 && threshold < 1.0 {
    Ok(())
  } else {
    Err(AnalyticsError::InvalidParameter(format!(
      "threshold must be in (0, 1), got {threshold}"
    )))
  }
}
