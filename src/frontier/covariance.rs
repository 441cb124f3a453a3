use nalgebra::DMatrix;
use nalgebra::SymmetricEigen;

use crate::error::AnalyticsError;
use crate::error::Result;

/// Relative tolerance for symmetry and for negative eigenvalues.
const PSD_TOLERANCE: f64 = 1e-10;

/// Check that `cov` is a finite, symmetric, positive semi-definite `k x k`
/// matrix with `k = n_assets >= 2`.
pub(crate) fn validate_covariance(cov: &[Vec<f64>], n_assets: usize) -> Result<()> {
  if n_assets < 2 {
    return Err(AnalyticsError::InvalidCovariance(format!(
      "frontier needs at least 2 assets, got {n_assets}"
    )));
  }
  if cov.len() != n_assets || cov.iter().any(|row| row.len() != n_assets) {
    return Err(AnalyticsError::InvalidCovariance(format!(
      "expected a {n_assets}x{n_assets} matrix"
    )));
  }
  if cov.iter().flatten().any(|v| !v.is_finite()) {
    return Err(AnalyticsError::InvalidCovariance(
      "non-finite entry".into(),
    ));
  }

  let scale = (0..n_assets)
    .map(|i| cov[i][i].abs())
    .fold(0.0, f64::max)
    .max(f64::MIN_POSITIVE);
  let tol = PSD_TOLERANCE * scale;

  for i in 0..n_assets {
    if cov[i][i] < 0.0 {
      return Err(AnalyticsError::InvalidCovariance(format!(
        "negative variance {} for asset {i}",
        cov[i][i]
      )));
    }
    for j in (i + 1)..n_assets {
      if (cov[i][j] - cov[j][i]).abs() > tol {
        return Err(AnalyticsError::InvalidCovariance(format!(
          "not symmetric at ({i}, {j})"
        )));
      }
    }
  }

  let m = DMatrix::from_fn(n_assets, n_assets, |i, j| 0.5 * (cov[i][j] + cov[j][i]));
  let min_eigen = SymmetricEigen::new(m).eigenvalues.min();
  if min_eigen < -tol {
    return Err(AnalyticsError::InvalidCovariance(format!(
      "not positive semi-definite, smallest eigenvalue {min_eigen:e}"
    )));
  }

  Ok(())
}

/// `w' Σ w`, clamped at zero against rounding.
pub(crate) fn quadratic_form(cov: &[Vec<f64>], w: &[f64]) -> f64 {
  let mut acc = 0.0;
  for (i, row) in cov.iter().enumerate() {
    let mut inner = 0.0;
    for (j, c) in row.iter().enumerate() {
      inner += c * w[j];
    }
    acc += w[i] * inner;
  }
  acc.max(0.0)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn accepts_valid_and_singular_psd_matrices() {
    assert!(validate_covariance(&[vec![0.04, 0.006], vec![0.006, 0.01]], 2).is_ok());
    // perfectly correlated, rank one
    assert!(validate_covariance(&[vec![0.04, 0.02], vec![0.02, 0.01]], 2).is_ok());
    assert!(validate_covariance(&[vec![0.0, 0.0], vec![0.0, 0.0]], 2).is_ok());
  }

  #[test]
  fn rejects_indefinite_asymmetric_and_misshaped() {
    let indefinite = [vec![1.0, 2.0], vec![2.0, 1.0]];
    assert!(matches!(
      validate_covariance(&indefinite, 2),
      Err(AnalyticsError::InvalidCovariance(_))
    ));
    assert!(validate_covariance(&[vec![1.0, 0.5], vec![0.2, 1.0]], 2).is_err());
    assert!(validate_covariance(&[vec![-0.01, 0.0], vec![0.0, 0.01]], 2).is_err());
    assert!(validate_covariance(&[vec![1.0, 0.0]], 2).is_err());
    assert!(validate_covariance(&[vec![0.04]], 1).is_err());
  }

  #[test]
  fn quadratic_form_matches_two_asset_variance() {
    let cov = [vec![0.04, 0.006], vec![0.006, 0.01]];
    let w = [0.25, 0.75];
    let expected = 0.0625 * 0.04 + 0.5625 * 0.01 + 2.0 * 0.25 * 0.75 * 0.006;
    assert_abs_diff_eq!(quadratic_form(&cov, &w), expected, epsilon = 1e-15);
  }
}
