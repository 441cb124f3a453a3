//! # Portfolio
//!
//! $$
//! r_{p,t} = \sum_i w_i r_{i,t}, \qquad w_i \ge 0,\ \sum_i w_i = 1
//! $$
//!
//! Long-only weight maps and the weighted return series they induce.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AnalyticsError;
use crate::error::Result;
use crate::series::AlignedReturns;
use crate::series::ReturnSeries;

/// Tolerance on the sum of weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Symbol to non-negative weight, summing to one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Portfolio {
  weights: BTreeMap<String, f64>,
}

impl Portfolio {
  pub fn new(weights: BTreeMap<String, f64>) -> Result<Self> {
    if weights.is_empty() {
      return Err(AnalyticsError::InvalidParameter(
        "portfolio has no assets".into(),
      ));
    }
    if let Some((symbol, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
      return Err(AnalyticsError::InvalidParameter(format!(
        "weight of {symbol} must be non-negative, got {w}"
      )));
    }
    let total: f64 = weights.values().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(AnalyticsError::InvalidParameter(format!(
        "weights must sum to 1, got {total}"
      )));
    }

    Ok(Self { weights })
  }

  /// Pair `symbols` with `weights` positionally.
  pub fn from_parts<S: AsRef<str>>(symbols: &[S], weights: &[f64]) -> Result<Self> {
    if symbols.len() != weights.len() {
      return Err(AnalyticsError::InvalidParameter(format!(
        "{} symbols but {} weights",
        symbols.len(),
        weights.len()
      )));
    }
    Self::new(
      symbols
        .iter()
        .map(|s| s.as_ref().to_string())
        .zip(weights.iter().copied())
        .collect(),
    )
  }

  pub fn equal_weight<S: AsRef<str>>(symbols: &[S]) -> Result<Self> {
    let w = 1.0 / symbols.len().max(1) as f64;
    Self::from_parts(symbols, &vec![w; symbols.len()])
  }

  pub fn weight(&self, symbol: &str) -> Option<f64> {
    self.weights.get(symbol).copied()
  }

  pub fn weights(&self) -> &BTreeMap<String, f64> {
    &self.weights
  }

  pub fn symbols(&self) -> impl Iterator<Item = &str> {
    self.weights.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.weights.len()
  }

  pub fn is_empty(&self) -> bool {
    self.weights.is_empty()
  }
}

/// Weighted return series of `portfolio` over the aligned dates.
///
/// Every portfolio symbol must be a column of `aligned`.
pub fn portfolio_returns(aligned: &AlignedReturns, portfolio: &Portfolio) -> Result<ReturnSeries> {
  let mut values = vec![0.0; aligned.len()];

  for (symbol, &w) in portfolio.weights() {
    let column = aligned.column(symbol).ok_or_else(|| {
      AnalyticsError::InvalidParameter(format!("{symbol} is not part of the aligned returns"))
    })?;
    for (acc, r) in values.iter_mut().zip(column) {
      *acc += w * r;
    }
  }

  ReturnSeries::new("PORTFOLIO", aligned.dates().to_vec(), values)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::series::align_returns;
  use crate::series::tests::daily_dates;

  #[test]
  fn weights_must_be_long_only_and_sum_to_one() {
    assert!(Portfolio::from_parts(&["A", "B"], &[0.5, 0.5]).is_ok());
    assert!(Portfolio::from_parts(&["A", "B"], &[0.5, 0.5000001]).is_ok());
    assert!(Portfolio::from_parts(&["A", "B"], &[0.6, 0.5]).is_err());
    assert!(Portfolio::from_parts(&["A", "B"], &[1.5, -0.5]).is_err());
    assert!(Portfolio::from_parts::<&str>(&[], &[]).is_err());
  }

  #[test]
  fn equal_weight_portfolio_averages_columns() {
    let d = daily_dates(3);
    let a = ReturnSeries::new("A", d.clone(), vec![0.02, 0.04, -0.01]).unwrap();
    let b = ReturnSeries::new("B", d, vec![0.00, -0.02, 0.03]).unwrap();
    let aligned = align_returns([&a, &b], 2).unwrap();

    let p = Portfolio::equal_weight(aligned.symbols()).unwrap();
    let r = portfolio_returns(&aligned, &p).unwrap();

    assert_eq!(r.len(), 3);
    assert_abs_diff_eq!(r.values()[0], 0.01, epsilon = 1e-15);
    assert_abs_diff_eq!(r.values()[1], 0.01, epsilon = 1e-15);
    assert_abs_diff_eq!(r.values()[2], 0.01, epsilon = 1e-15);
  }

  #[test]
  fn unknown_symbol_is_rejected() {
    let d = daily_dates(2);
    let a = ReturnSeries::new("A", d, vec![0.02, 0.04]).unwrap();
    let aligned = align_returns([&a], 2).unwrap();
    let p = Portfolio::from_parts(&["Z"], &[1.0]).unwrap();
    assert!(portfolio_returns(&aligned, &p).is_err());
  }
}
