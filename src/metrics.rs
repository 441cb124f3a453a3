//! # Risk/Return Metrics
//!
//! $$
//! \mathrm{SR} = \frac{(1+\bar r)^A - 1 - r_f}{s\sqrt{A}}
//! $$
//!
//! Annualized return and volatility, Sharpe ratio, Value-at-Risk and maximum
//! drawdown of a single return series.

use serde::Serialize;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::config::validate_annualization_factor;
use crate::config::validate_risk_free;
use crate::config::VarConfig;
use crate::config::VarMethod;
use crate::error::ensure_observations;
use crate::error::Result;
use crate::series::ReturnSeries;
use crate::stats::moments;

/// Summary statistics of one return series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetStatistics {
  /// Number of periodic returns.
  pub observations: usize,
  /// Mean periodic return compounded over one year.
  pub annualized_return: f64,
  /// Unbiased sample deviation scaled by `sqrt(annualization_factor)`.
  pub annualized_volatility: f64,
  /// `None` when volatility is zero.
  pub sharpe_ratio: Option<f64>,
  /// Signed return quantile at `var_confidence`; losses are negative.
  pub value_at_risk: f64,
  pub var_confidence: f64,
  /// Largest peak-to-trough decline of the compounded path, as a fraction.
  pub max_drawdown: f64,
}

/// Compute [`AssetStatistics`] for a return series.
///
/// `risk_free` is annual and must be finite. Needs at least two returns.
pub fn compute_asset_statistics(
  returns: &ReturnSeries,
  risk_free: f64,
  annualization_factor: f64,
  var: &VarConfig,
) -> Result<AssetStatistics> {
  statistics_from_slice(returns.values(), risk_free, annualization_factor, var)
}

pub(crate) fn statistics_from_slice(
  returns: &[f64],
  risk_free: f64,
  annualization_factor: f64,
  var: &VarConfig,
) -> Result<AssetStatistics> {
  ensure_observations(2, returns.len())?;
  validate_annualization_factor(annualization_factor)?;
  validate_risk_free(risk_free)?;
  var.validate()?;

  let annualized_return = annualized_return(returns, annualization_factor);
  let annualized_volatility = annualized_volatility(returns, annualization_factor);

  Ok(AssetStatistics {
    observations: returns.len(),
    annualized_return,
    annualized_volatility,
    sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility, risk_free),
    value_at_risk: value_at_risk(returns, var),
    var_confidence: var.confidence,
    max_drawdown: max_drawdown(returns),
  })
}

/// Compound the mean periodic return to an annual rate.
pub fn annualized_return(returns: &[f64], annualization_factor: f64) -> f64 {
  (1.0 + moments::mean(returns)).powf(annualization_factor) - 1.0
}

pub fn annualized_volatility(returns: &[f64], annualization_factor: f64) -> f64 {
  moments::sample_std(returns) * annualization_factor.sqrt()
}

/// Excess return per unit of volatility; `None` for zero volatility.
pub fn sharpe_ratio(annual_return: f64, annual_volatility: f64, risk_free: f64) -> Option<f64> {
  if annual_volatility > 0.0 && annual_volatility.is_finite() {
    Some((annual_return - risk_free) / annual_volatility)
  } else {
    None
  }
}

/// One-tailed Value-at-Risk as a signed return quantile over `var.horizon` periods.
pub fn value_at_risk(returns: &[f64], var: &VarConfig) -> f64 {
  let tail = 1.0 - var.confidence;
  let scale = var.horizon.sqrt();

  match var.method {
    VarMethod::Historical => {
      let mut sorted = returns.to_vec();
      sorted.sort_by(f64::total_cmp);
      moments::percentile_sorted(&sorted, tail) * scale
    }
    VarMethod::Parametric => {
      let std_normal = Normal::new(0.0, 1.0).expect("standard normal must be valid");
      let z = std_normal.inverse_cdf(tail);
      moments::mean(returns) * var.horizon + z * moments::sample_std(returns) * scale
    }
  }
}

/// Maximum drawdown of the wealth path that starts at 1 and compounds `returns`.
pub fn max_drawdown(returns: &[f64]) -> f64 {
  let mut wealth = 1.0;
  let mut peak = 1.0;
  let mut worst_ratio = 1.0_f64;

  for &r in returns {
    wealth *= 1.0 + r;
    if wealth > peak {
      peak = wealth;
    } else if peak > 0.0 {
      worst_ratio = worst_ratio.min(wealth / peak);
    }
  }

  1.0 - worst_ratio
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::series::build_return_series;
  use crate::series::tests::prices;

  #[test]
  fn constant_prices_have_no_sharpe() {
    let r = build_return_series(&prices("TS", &[30.0; 20])).unwrap();
    let stats = compute_asset_statistics(&r, 0.04, 252.0, &VarConfig::historical(0.95)).unwrap();

    assert_eq!(stats.annualized_volatility, 0.0);
    assert_eq!(stats.annualized_return, 0.0);
    assert_eq!(stats.sharpe_ratio, None);
    assert_eq!(stats.max_drawdown, 0.0);
    assert_eq!(stats.value_at_risk, 0.0);
  }

  #[test]
  fn drawdown_of_rising_path_is_zero() {
    assert_eq!(max_drawdown(&[0.01, 0.02, 0.0, 0.05]), 0.0);
  }

  #[test]
  fn drawdown_of_double_then_half_is_one_half() {
    assert_abs_diff_eq!(max_drawdown(&[1.0, -0.5]), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(max_drawdown(&[0.1, 1.0, -0.5, 0.2]), 0.5, epsilon = 1e-12);
  }

  #[test]
  fn annualization_compounds_mean_and_scales_volatility() {
    let returns = [0.01, -0.005, 0.002, 0.003];
    let mean: f64 = 0.0025;
    assert_abs_diff_eq!(
      annualized_return(&returns, 252.0),
      (1.0 + mean).powf(252.0) - 1.0,
      epsilon = 1e-12
    );
    assert_abs_diff_eq!(
      annualized_volatility(&returns, 252.0),
      moments::sample_std(&returns) * 252.0_f64.sqrt(),
      epsilon = 1e-15
    );
  }

  #[test]
  fn historical_var_is_lower_percentile() {
    let returns: Vec<f64> = (1..=100).map(|i| i as f64 / 1000.0 - 0.05).collect();
    let var = value_at_risk(&returns, &VarConfig::historical(0.95));
    // position 4.95 between -0.045 and -0.044
    assert_abs_diff_eq!(var, -0.04405, epsilon = 1e-12);

    let ten_day = VarConfig {
      horizon: 10.0,
      ..VarConfig::historical(0.95)
    };
    assert_abs_diff_eq!(value_at_risk(&returns, &ten_day), var * 10.0_f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn parametric_var_uses_gaussian_quantile() {
    let returns = [0.01, -0.01, 0.02, -0.02];
    let var = value_at_risk(&returns, &VarConfig::parametric(0.95));
    let sd = moments::sample_std(&returns);
    assert_abs_diff_eq!(var, -1.6448536269514729 * sd, epsilon = 1e-9);
  }

  #[test]
  fn single_return_is_insufficient() {
    let r = build_return_series(&prices("EDN", &[10.0, 11.0])).unwrap();
    assert!(compute_asset_statistics(&r, 0.0, 252.0, &VarConfig::historical(0.95)).is_err());
  }

  #[test]
  fn non_finite_risk_free_is_rejected() {
    let r = build_return_series(&prices("BMA", &[10.0, 11.0, 10.5, 10.8])).unwrap();
    for rate in [f64::NAN, f64::INFINITY] {
      assert!(matches!(
        compute_asset_statistics(&r, rate, 252.0, &VarConfig::historical(0.95)),
        Err(crate::error::AnalyticsError::InvalidParameter(_))
      ));
    }
  }
}
