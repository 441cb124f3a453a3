//! # Errors
//!
//! Value-level failures of the analytics engine. None of them is transient, so
//! nothing in the crate retries: every variant goes straight back to the caller.

use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy shared by every analytics operation.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum AnalyticsError {
  /// Too few observations for the requested statistic.
  #[error("insufficient data: {required} observations required, {actual} available")]
  InsufficientData { required: usize, actual: usize },

  /// Enough observations, but all of them are identical.
  #[error("insufficient data: all {observations} observations are identical")]
  ConstantSample { observations: usize },

  /// The common date intersection across series is too small.
  #[error("insufficient overlap: {required} common dates required, {actual} available")]
  InsufficientOverlap { required: usize, actual: usize },

  /// The regressor has zero variance, so beta cannot be estimated.
  #[error("degenerate regression: benchmark excess returns have zero variance")]
  DegenerateRegression,

  /// Covariance input is malformed, not positive semi-definite, or covers fewer than two assets.
  #[error("invalid covariance: {0}")]
  InvalidCovariance(String),

  /// Price series violates ordering or positivity constraints.
  #[error("invalid series: {0}")]
  InvalidSeries(String),

  /// Configuration or argument outside its admissible range.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),
}

impl AnalyticsError {
  /// Too few observations or a sample without spread.
  pub fn is_insufficient_data(&self) -> bool {
    matches!(
      self,
      AnalyticsError::InsufficientData { .. } | AnalyticsError::ConstantSample { .. }
    )
  }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

pub(crate) fn ensure_observations(required: usize, actual: usize) -> Result<()> {
  if actual < required {
    Err(AnalyticsError::InsufficientData { required, actual })
  } else {
    Ok(())
  }
}
