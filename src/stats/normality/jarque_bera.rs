use statrs::distribution::ChiSquared;
use statrs::distribution::ContinuousCDF;

use crate::stats::moments;

/// Result of the Jarque-Bera normality test.
#[derive(Debug, Clone, Copy)]
pub struct JarqueBeraResult {
  /// JB test statistic.
  pub statistic: f64,
  /// p-value under chi-square(2) asymptotics.
  pub p_value: f64,
  /// Bias-corrected sample skewness.
  pub skewness: f64,
  /// Sample excess kurtosis.
  pub excess_kurtosis: f64,
}

/// Bias-corrected Fisher-Pearson skewness `G1` and excess kurtosis `g2`.
///
/// Callers guarantee `n >= 3` and a positive second moment.
pub(crate) fn shape_moments(sample: &[f64]) -> (f64, f64) {
  let n = sample.len() as f64;
  let (m2, m3, m4) = moments::central_moments(sample);

  let g1 = m3 / m2.powf(1.5);
  let skewness = g1 * (n * (n - 1.0)).sqrt() / (n - 2.0);
  let excess_kurtosis = m4 / (m2 * m2) - 3.0;
  (skewness, excess_kurtosis)
}

/// Jarque-Bera test for normality, `JB = n/6 (S^2 + K^2/4)`.
///
/// Callers guarantee `n >= 3` and a positive second moment.
pub fn jarque_bera_test(sample: &[f64]) -> JarqueBeraResult {
  let n = sample.len() as f64;
  let (skewness, excess_kurtosis) = shape_moments(sample);
  let statistic = (n / 6.0) * (skewness * skewness + 0.25 * excess_kurtosis * excess_kurtosis);

  let chi2 = ChiSquared::new(2.0).expect("chi-square df=2 must be valid");
  let p_value = chi2.sf(statistic).clamp(0.0, 1.0);

  JarqueBeraResult {
    statistic,
    p_value,
    skewness,
    excess_kurtosis,
  }
}
