//! # Return Series
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Price and simple-return series keyed by calendar date, plus common-date
//! alignment for cross-asset work.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::error::Result;

pub mod align;

pub use align::align_returns;
pub use align::AlignedReturns;

/// Ordered `(date, price)` history of one symbol.
///
/// Dates are strictly increasing and every price is finite and positive.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceSeries {
  symbol: String,
  dates: Vec<NaiveDate>,
  prices: Vec<f64>,
}

impl PriceSeries {
  /// Validate and build a price series from parallel date/price vectors.
  pub fn new(symbol: impl Into<String>, dates: Vec<NaiveDate>, prices: Vec<f64>) -> Result<Self> {
    let symbol = symbol.into();
    if dates.len() != prices.len() {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: {} dates but {} prices",
        dates.len(),
        prices.len()
      )));
    }
    if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: dates not strictly increasing at {}",
        w[1]
      )));
    }
    if let Some(p) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: price {p} is not positive"
      )));
    }

    Ok(Self {
      symbol,
      dates,
      prices,
    })
  }

  /// Build from `(date, price)` pairs.
  pub fn from_pairs(
    symbol: impl Into<String>,
    points: impl IntoIterator<Item = (NaiveDate, f64)>,
  ) -> Result<Self> {
    let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = points.into_iter().unzip();
    Self::new(symbol, dates, prices)
  }

  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn prices(&self) -> &[f64] {
    &self.prices
  }

  pub fn len(&self) -> usize {
    self.prices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.prices.is_empty()
  }
}

/// Periodic simple returns, each dated at the later of its two prices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReturnSeries {
  symbol: String,
  dates: Vec<NaiveDate>,
  returns: Vec<f64>,
}

impl ReturnSeries {
  /// Wrap already computed returns. Dates must be strictly increasing.
  pub fn new(symbol: impl Into<String>, dates: Vec<NaiveDate>, returns: Vec<f64>) -> Result<Self> {
    let symbol = symbol.into();
    if dates.len() != returns.len() {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: {} dates but {} returns",
        dates.len(),
        returns.len()
      )));
    }
    if dates.windows(2).any(|w| w[1] <= w[0]) {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: dates not strictly increasing"
      )));
    }
    if returns.iter().any(|r| !r.is_finite()) {
      return Err(AnalyticsError::InvalidSeries(format!(
        "{symbol}: non-finite return"
      )));
    }

    Ok(Self {
      symbol,
      dates,
      returns,
    })
  }

  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> &[f64] {
    &self.returns
  }

  pub fn len(&self) -> usize {
    self.returns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.returns.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    self.dates.iter().copied().zip(self.returns.iter().copied())
  }
}

/// Convert a price series into simple returns.
///
/// Fails with [`AnalyticsError::InsufficientData`] for fewer than two prices.
pub fn build_return_series(prices: &PriceSeries) -> Result<ReturnSeries> {
  if prices.len() < 2 {
    return Err(AnalyticsError::InsufficientData {
      required: 2,
      actual: prices.len(),
    });
  }

  let p = prices.prices();
  let mut returns = Vec::with_capacity(p.len() - 1);
  for i in 1..p.len() {
    returns.push(p[i] / p[i - 1] - 1.0);
  }

  Ok(ReturnSeries {
    symbol: prices.symbol.clone(),
    dates: prices.dates[1..].to_vec(),
    returns,
  })
}
