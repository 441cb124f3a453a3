//! # Common-Date Alignment
//!
//! $$
//! \Sigma_{ij} = \frac{1}{T-1}\sum_t (r_{i,t}-\bar r_i)(r_{j,t}-\bar r_j)
//! $$
//!
//! Cross-asset work only ever sees the dates every series has in common.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::ReturnSeries;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::stats::moments;

/// Return columns restricted to their common date intersection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignedReturns {
  dates: Vec<NaiveDate>,
  symbols: Vec<String>,
  columns: Vec<Vec<f64>>,
}

impl AlignedReturns {
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// One return vector per symbol, all of length [`Self::len`].
  pub fn columns(&self) -> &[Vec<f64>] {
    &self.columns
  }

  pub fn column(&self, symbol: &str) -> Option<&[f64]> {
    self
      .symbols
      .iter()
      .position(|s| s == symbol)
      .map(|i| self.columns[i].as_slice())
  }

  /// Number of common dates.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  pub fn n_assets(&self) -> usize {
    self.symbols.len()
  }

  /// Per-period mean return of every column.
  pub fn mean_vector(&self) -> Vec<f64> {
    self.columns.iter().map(|c| moments::mean(c)).collect()
  }

  /// Unbiased per-period sample covariance matrix.
  pub fn covariance_matrix(&self) -> Vec<Vec<f64>> {
    let k = self.columns.len();
    let mut cov = vec![vec![0.0; k]; k];

    for i in 0..k {
      for j in i..k {
        let c = moments::sample_covariance(&self.columns[i], &self.columns[j]);
        cov[i][j] = c;
        cov[j][i] = c;
      }
    }

    cov
  }

  /// Rebuild the column of `symbol` as a dated [`ReturnSeries`].
  pub fn series(&self, symbol: &str) -> Option<ReturnSeries> {
    let column = self.column(symbol)?;
    Some(ReturnSeries {
      symbol: symbol.to_string(),
      dates: self.dates.clone(),
      returns: column.to_vec(),
    })
  }
}

/// Restrict every series to the dates present in all of them.
///
/// Fails with [`AnalyticsError::InsufficientOverlap`] when fewer than
/// `min_observations` dates survive the intersection.
pub fn align_returns<'a>(
  series: impl IntoIterator<Item = &'a ReturnSeries>,
  min_observations: usize,
) -> Result<AlignedReturns> {
  if min_observations < 2 {
    return Err(AnalyticsError::InvalidParameter(format!(
      "min_observations must be at least 2, got {min_observations}"
    )));
  }

  let series: Vec<&ReturnSeries> = series.into_iter().collect();
  let Some(first) = series.first() else {
    return Err(AnalyticsError::InsufficientOverlap {
      required: min_observations,
      actual: 0,
    });
  };

  let mut common: BTreeSet<NaiveDate> = first.dates().iter().copied().collect();
  for s in &series[1..] {
    let dates: BTreeSet<NaiveDate> = s.dates().iter().copied().collect();
    common.retain(|d| dates.contains(d));
  }

  if common.len() < min_observations {
    return Err(AnalyticsError::InsufficientOverlap {
      required: min_observations,
      actual: common.len(),
    });
  }

  let dates: Vec<NaiveDate> = common.into_iter().collect();
  let columns = series
    .iter()
    .map(|s| {
      dates
        .iter()
        .filter_map(|d| s.dates().binary_search(d).ok().map(|i| s.values()[i]))
        .collect::<Vec<f64>>()
    })
    .collect();

  Ok(AlignedReturns {
    dates,
    symbols: series.iter().map(|s| s.symbol().to_string()).collect(),
    columns,
  })
}
