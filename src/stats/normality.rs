//! # Normality
//!
//! $$
//! JB = \frac{n}{6}\left(S^2 + \frac{K^2}{4}\right)
//! $$
//!
//! Jarque-Bera and Shapiro-Wilk tests combined into one verdict, plus the
//! histogram-versus-normal diagnostic used for distribution charts.

use serde::Serialize;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::config::validate_threshold;
use crate::error::ensure_observations;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::series::ReturnSeries;
use crate::stats::moments;

pub mod jarque_bera;
pub mod shapiro_wilk;

pub use jarque_bera::jarque_bera_test;
pub use jarque_bera::JarqueBeraResult;
pub use shapiro_wilk::shapiro_wilk_test;
pub use shapiro_wilk::ShapiroWilkResult;

/// Default p-value threshold.
pub const DEFAULT_NORMALITY_THRESHOLD: f64 = 0.05;

/// Outcome of both normality tests on one sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalityResult {
  pub observations: usize,
  pub jarque_bera_statistic: f64,
  pub jarque_bera_p: f64,
  pub shapiro_wilk_statistic: f64,
  pub shapiro_wilk_p: f64,
  /// Bias-corrected sample skewness.
  pub skewness: f64,
  pub excess_kurtosis: f64,
  /// Threshold used by [`NormalityResult::is_normal`].
  pub threshold: f64,
}

impl NormalityResult {
  /// Both p-values exceed the threshold given to [`test_normality`].
  pub fn is_normal(&self) -> bool {
    self.is_normal_at(self.threshold)
  }

  pub fn is_normal_at(&self, threshold: f64) -> bool {
    self.jarque_bera_p > threshold && self.shapiro_wilk_p > threshold
  }
}

/// Run Jarque-Bera and Shapiro-Wilk on a return series.
///
/// Fails with [`AnalyticsError::InsufficientData`] for fewer than three
/// returns and [`AnalyticsError::ConstantSample`] for a sample without spread.
pub fn test_normality(returns: &ReturnSeries, threshold: f64) -> Result<NormalityResult> {
  normality_from_slice(returns.values(), threshold)
}

pub(crate) fn normality_from_slice(sample: &[f64], threshold: f64) -> Result<NormalityResult> {
  validate_threshold(threshold)?;
  ensure_observations(3, sample.len())?;
  ensure_spread(sample)?;

  let jb = jarque_bera_test(sample);
  let sw = shapiro_wilk_test(sample);

  Ok(NormalityResult {
    observations: sample.len(),
    jarque_bera_statistic: jb.statistic,
    jarque_bera_p: jb.p_value,
    shapiro_wilk_statistic: sw.statistic,
    shapiro_wilk_p: sw.p_value,
    skewness: jb.skewness,
    excess_kurtosis: jb.excess_kurtosis,
    threshold,
  })
}

fn ensure_spread(sample: &[f64]) -> Result<()> {
  let first = sample[0];
  let (m2, _, _) = moments::central_moments(sample);
  if sample.iter().all(|&x| x == first) || !(m2 > 0.0) {
    return Err(AnalyticsError::ConstantSample {
      observations: sample.len(),
    });
  }
  Ok(())
}

/// Observed histogram next to the counts a fitted normal would produce.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistogramFit {
  /// `bins + 1` ascending bin edges spanning the sample range.
  pub edges: Vec<f64>,
  pub counts: Vec<usize>,
  /// Expected counts under `N(mean, std_dev^2)`.
  pub expected: Vec<f64>,
  pub mean: f64,
  /// Unbiased sample deviation.
  pub std_dev: f64,
}

impl HistogramFit {
  pub fn bin_width(&self) -> f64 {
    self.edges[1] - self.edges[0]
  }
}

/// Bin the returns into `bins` equal-width bins and fit a normal.
pub fn histogram_fit(returns: &ReturnSeries, bins: usize) -> Result<HistogramFit> {
  if bins == 0 {
    return Err(AnalyticsError::InvalidParameter(
      "histogram needs at least one bin".into(),
    ));
  }
  let sample = returns.values();
  ensure_observations(2, sample.len())?;

  let lo = sample.iter().copied().fold(f64::INFINITY, f64::min);
  let hi = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  let mean = moments::mean(sample);
  let std_dev = moments::sample_std(sample);
  if !(hi > lo) || !(std_dev > 0.0) {
    return Err(AnalyticsError::ConstantSample {
      observations: sample.len(),
    });
  }

  let width = (hi - lo) / bins as f64;
  let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

  let mut counts = vec![0usize; bins];
  for &x in sample {
    // Right-most edge is inclusive.
    let idx = (((x - lo) / width) as usize).min(bins - 1);
    counts[idx] += 1;
  }

  let fitted = Normal::new(mean, std_dev)
    .map_err(|e| AnalyticsError::InvalidParameter(format!("normal fit: {e}")))?;
  let n = sample.len() as f64;
  let expected = edges
    .windows(2)
    .map(|e| n * (fitted.cdf(e[1]) - fitted.cdf(e[0])))
    .collect();

  Ok(HistogramFit {
    edges,
    counts,
    expected,
    mean,
    std_dev,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rand_distr::Distribution;
  use rand_distr::Normal as NormalDistr;

  use super::*;
  use crate::series::tests::daily_dates;

  fn series(values: Vec<f64>) -> ReturnSeries {
    ReturnSeries::new("X", daily_dates(values.len()), values).unwrap()
  }

  fn normal_returns(n: usize, seed: u64) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = NormalDistr::new(0.0005, 0.02).unwrap();
    series((0..n).map(|_| dist.sample(&mut rng)).collect())
  }

  /// Daily returns placed exactly on the quantiles of `N(0.0005, 0.02^2)`.
  fn quantile_returns(n: usize) -> ReturnSeries {
    let std_normal = Normal::new(0.0, 1.0).unwrap();
    series(
      (1..=n)
        .map(|i| 0.0005 + 0.02 * std_normal.inverse_cdf((i as f64 - 0.5) / n as f64))
        .collect(),
    )
  }

  #[test]
  fn normal_returns_pass_both_tests() {
    let res = test_normality(&quantile_returns(250), DEFAULT_NORMALITY_THRESHOLD).unwrap();
    assert_eq!(res.observations, 250);
    assert!(res.jarque_bera_p > 0.9, "{res:?}");
    assert!(res.shapiro_wilk_p > 0.9, "{res:?}");
    assert!(res.shapiro_wilk_statistic > 0.999, "{res:?}");
    assert!(res.is_normal());

    let sampled = test_normality(&normal_returns(750, 5), DEFAULT_NORMALITY_THRESHOLD).unwrap();
    assert!(sampled.skewness.abs() < 0.3, "{sampled:?}");
    assert!(sampled.excess_kurtosis.abs() < 0.6, "{sampled:?}");
    assert!(sampled.shapiro_wilk_statistic > 0.99, "{sampled:?}");
  }

  #[test]
  fn two_clusters_pass_jarque_bera_but_fail_shapiro_wilk() {
    let low = (0..15).map(|i| -0.02 + 0.0002 * i as f64);
    let high = (0..15).map(|i| 0.02 - 0.0002 * i as f64);
    let res = test_normality(&series(low.chain(high).collect()), 0.05).unwrap();

    // JB = 4.957, p = 0.0839; W = 0.6800, p = 8.1e-7
    assert_abs_diff_eq!(res.jarque_bera_statistic, 4.957095, epsilon = 1e-4);
    assert!(res.jarque_bera_p > 0.05, "{res:?}");
    assert!(res.shapiro_wilk_p < 1e-5, "{res:?}");
    assert!(!res.is_normal());
    assert!(res.is_normal_at(1e-7));
  }

  #[test]
  fn is_normal_requires_both_p_values_above_threshold() {
    let res = NormalityResult {
      observations: 100,
      jarque_bera_statistic: 1.0,
      jarque_bera_p: 0.4,
      shapiro_wilk_statistic: 0.97,
      shapiro_wilk_p: 0.03,
      skewness: 0.1,
      excess_kurtosis: 0.2,
      threshold: 0.05,
    };
    assert!(!res.is_normal());
    assert!(res.is_normal_at(0.01));
    assert!(!res.is_normal_at(0.5));
  }

  #[test]
  fn too_short_or_flat_samples_fail() {
    assert_eq!(
      test_normality(&series(vec![0.01, 0.02]), 0.05),
      Err(AnalyticsError::InsufficientData {
        required: 3,
        actual: 2
      })
    );
    let flat = test_normality(&series(vec![0.01; 10]), 0.05).unwrap_err();
    assert_eq!(flat, AnalyticsError::ConstantSample { observations: 10 });
    assert!(flat.is_insufficient_data());
    assert_eq!(
      flat.to_string(),
      "insufficient data: all 10 observations are identical"
    );
    assert!(matches!(
      test_normality(&normal_returns(50, 1), 1.5),
      Err(AnalyticsError::InvalidParameter(_))
    ));
  }

  #[test]
  fn histogram_counts_cover_sample() {
    let returns = normal_returns(400, 9);
    let fit = histogram_fit(&returns, 20).unwrap();

    assert_eq!(fit.edges.len(), 21);
    assert_eq!(fit.counts.iter().sum::<usize>(), 400);
    let expected_total: f64 = fit.expected.iter().sum();
    assert!(expected_total > 380.0 && expected_total <= 400.0);
    assert_abs_diff_eq!(fit.bin_width() * 20.0, fit.edges[20] - fit.edges[0], epsilon = 1e-12);
  }

  #[test]
  fn histogram_rejects_zero_bins() {
    assert!(histogram_fit(&normal_returns(10, 2), 0).is_err());
  }

  #[test]
  fn histogram_of_flat_sample_reports_its_length() {
    assert_eq!(
      histogram_fit(&series(vec![0.003; 6]), 10),
      Err(AnalyticsError::ConstantSample { observations: 6 })
    );
  }
}
