//! Shapiro-Wilk W test after Royston (1995), algorithm AS R94.
//!
//! Coefficients come from Blom scores `m_i = Φ⁻¹((i - 3/8)/(n + 1/4))` with
//! polynomial corrections for the two outermost weights. The p-value is exact
//! for `n = 3`, uses Royston's gamma-transformed approximation for
//! `4 <= n <= 11` and a log-normal approximation of `ln(1 - W)` for `n >= 12`.
//! Royston validated the approximation up to `n = 5000`; larger samples reuse
//! the `n >= 12` branch.

use std::f64::consts::FRAC_PI_3;
use std::f64::consts::PI;

use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

/// Sample size up to which the p-value approximation was validated.
pub const SHAPIRO_WILK_VALIDATED_N: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const G: [f64; 2] = [-2.273, 0.459];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// Result of the Shapiro-Wilk normality test.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroWilkResult {
  /// W statistic in `(0, 1]`.
  pub statistic: f64,
  /// Upper-tail p-value (small W indicates non-normality).
  pub p_value: f64,
}

fn poly(coeffs: &[f64], x: f64) -> f64 {
  coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Positive weights `a_1..a_{n/2}` applied to `x_(n+1-i) - x_(i)`.
fn coefficients(n: usize, std_normal: &Normal) -> Vec<f64> {
  let half = n / 2;
  if n == 3 {
    return vec![std::f64::consts::FRAC_1_SQRT_2];
  }

  let an = n as f64;
  let m: Vec<f64> = (1..=half)
    .map(|i| -std_normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
    .collect();
  let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
  let ssumm2 = summ2.sqrt();
  let rsn = 1.0 / an.sqrt();

  let mut a = vec![0.0; half];
  let a1 = poly(&C1, rsn) + m[0] / ssumm2;
  a[0] = a1;

  let (first_plain, fac) = if n > 5 {
    let a2 = poly(&C2, rsn) + m[1] / ssumm2;
    a[1] = a2;
    let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
      / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
      .sqrt();
    (2, fac)
  } else {
    let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
    (1, fac)
  };

  for i in first_plain..half {
    a[i] = m[i] / fac;
  }
  a
}

fn p_value(w: f64, n: usize, std_normal: &Normal) -> f64 {
  if n == 3 {
    let p = 6.0 / PI * ((w.sqrt()).asin() - FRAC_PI_3);
    return p.clamp(0.0, 1.0);
  }

  let an = n as f64;
  let w1 = (1.0 - w).ln();
  let (y, m, s) = if n <= 11 {
    let gamma = poly(&G, an);
    if w1 >= gamma {
      return 1e-99;
    }
    (-(gamma - w1).ln(), poly(&C3, an), poly(&C4, an).exp())
  } else {
    let ln_n = an.ln();
    (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
  };

  std_normal.sf((y - m) / s).clamp(0.0, 1.0)
}

/// Shapiro-Wilk test on an unsorted sample.
///
/// Callers guarantee `n >= 3` and a positive range.
pub fn shapiro_wilk_test(sample: &[f64]) -> ShapiroWilkResult {
  let n = sample.len();
  let mut sorted = sample.to_vec();
  sorted.sort_by(f64::total_cmp);

  let std_normal = Normal::new(0.0, 1.0).expect("standard normal must be valid");
  let a = coefficients(n, &std_normal);

  let mean = sorted.iter().sum::<f64>() / n as f64;
  let ss = sorted.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
  let b = a
    .iter()
    .enumerate()
    .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
    .sum::<f64>();

  let statistic = (b * b / ss).clamp(0.0, 1.0);
  ShapiroWilkResult {
    statistic,
    p_value: p_value(statistic, n, &std_normal),
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rand_distr::Distribution;
  use rand_distr::Exp1;
  use rand_distr::StandardNormal;

  use super::*;

  #[test]
  fn three_points_equally_spaced_is_perfect_fit() {
    let res = shapiro_wilk_test(&[1.0, 2.0, 3.0]);
    assert_abs_diff_eq!(res.statistic, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(res.p_value, 1.0, epsilon = 1e-9);
  }

  #[test]
  fn three_point_p_value_is_exact() {
    let res = shapiro_wilk_test(&[0.0, 0.0, 1.0]);
    // W = 0.75, the smallest attainable value for n = 3
    assert_abs_diff_eq!(res.statistic, 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(res.p_value, 0.0, epsilon = 1e-9);
  }

  #[test]
  fn coefficients_are_normalised() {
    let std_normal = Normal::new(0.0, 1.0).unwrap();
    for n in [4, 5, 6, 11, 12, 50, 500] {
      let a = coefficients(n, &std_normal);
      let norm = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
      assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-9);
      assert!(a.windows(2).all(|w| w[0] >= w[1]), "n={n}: {a:?}");
    }
  }

  #[test]
  fn accepts_normal_sample() {
    let mut rng = StdRng::seed_from_u64(42);
    let x: Vec<f64> = (0..500).map(|_| StandardNormal.sample(&mut rng)).collect();
    let res = shapiro_wilk_test(&x);
    assert!(res.statistic > 0.98, "{res:?}");
    assert!(res.p_value > 0.01, "{res:?}");
  }

  #[test]
  fn rejects_exponential_sample() {
    let mut rng = StdRng::seed_from_u64(11);
    let x: Vec<f64> = (0..300).map(|_| Exp1.sample(&mut rng)).collect();
    let res = shapiro_wilk_test(&x);
    assert!(res.p_value < 0.001, "{res:?}");
  }

  #[test]
  fn matches_reference_values() {
    // AS R94 reference values, the routine behind R's shapiro.test
    let weights = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
    let cases: [(&[f64], f64, f64); 3] = [
      (&[2.1, 3.4, 1.9, 5.6, 4.4], 0.932085, 0.610656),
      (&weights, 0.788815, 0.006704),
      (
        &[
          0.012, -0.004, 0.021, -0.015, 0.003, 0.008, -0.027, 0.011, 0.006, -0.002, 0.017, -0.009,
          0.001, 0.014, -0.011, 0.004, -0.006, 0.019, -0.001, 0.009,
        ],
        0.973041,
        0.817348,
      ),
    ];

    for (sample, w, p) in cases {
      let res = shapiro_wilk_test(sample);
      assert_abs_diff_eq!(res.statistic, w, epsilon = 1e-4);
      assert_abs_diff_eq!(res.p_value, p, epsilon = 1e-4);
    }
  }

  #[test]
  fn reference_values_with_ties_and_outliers() {
    let sample = [
      148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0, 148.0, 149.0,
      150.0, 151.0, 170.0, 171.0, 180.0, 200.0, 210.0,
    ];
    let res = shapiro_wilk_test(&sample);
    assert_abs_diff_eq!(res.statistic, 0.860046, epsilon = 1e-4);
    assert_abs_diff_eq!(res.p_value, 0.007891, epsilon = 1e-4);
  }

  #[test]
  fn small_sample_p_value_is_in_unit_interval() {
    let res = shapiro_wilk_test(&[0.3, -1.2, 0.8, 0.1, -0.4, 2.5, -0.9]);
    assert!(res.statistic > 0.0 && res.statistic <= 1.0);
    assert!(res.p_value > 0.0 && res.p_value <= 1.0);
  }
}
