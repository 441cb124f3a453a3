//! Sample moments and order statistics shared by the metric, regression and
//! normality modules. All estimators assume finite input.

pub fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

/// Unbiased (n-1) sample variance around a precomputed mean.
pub fn sample_variance(xs: &[f64], mean: f64) -> f64 {
  if xs.len() < 2 {
    return 0.0;
  }

  let mut acc = 0.0;
  for &x in xs {
    let d = x - mean;
    acc += d * d;
  }
  acc / (xs.len() - 1) as f64
}

pub fn sample_std(xs: &[f64]) -> f64 {
  sample_variance(xs, mean(xs)).sqrt()
}

/// Unbiased sample covariance of two equally long slices.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = mean(&x[..n]);
  let my = mean(&y[..n]);
  let mut acc = 0.0;
  for i in 0..n {
    acc += (x[i] - mx) * (y[i] - my);
  }
  acc / (n - 1) as f64
}

/// Pearson correlation, `None` when either side has no spread.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
  let n = x.len().min(y.len());
  if n < 2 {
    return None;
  }

  let mx = mean(&x[..n]);
  let my = mean(&y[..n]);

  let mut cov = 0.0;
  let mut sx = 0.0;
  let mut sy = 0.0;

  for i in 0..n {
    let dx = x[i] - mx;
    let dy = y[i] - my;
    cov += dx * dy;
    sx += dx * dx;
    sy += dy * dy;
  }

  let denom = (sx * sy).sqrt();
  if denom <= 0.0 || !denom.is_finite() {
    None
  } else {
    Some((cov / denom).clamp(-1.0, 1.0))
  }
}

/// Central moments `(m2, m3, m4)` with the biased `1/n` normalisation.
pub fn central_moments(xs: &[f64]) -> (f64, f64, f64) {
  let n = xs.len() as f64;
  let mean = mean(xs);

  let mut m2 = 0.0;
  let mut m3 = 0.0;
  let mut m4 = 0.0;
  for &x in xs {
    let d = x - mean;
    let d2 = d * d;
    m2 += d2;
    m3 += d2 * d;
    m4 += d2 * d2;
  }
  (m2 / n, m3 / n, m4 / n)
}

/// Percentile of an ascending slice with linear interpolation between order
/// statistics (`q` in `[0, 1]`).
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
  match sorted.len() {
    0 => f64::NAN,
    1 => sorted[0],
    n => {
      let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
      let lo = pos.floor() as usize;
      let hi = pos.ceil() as usize;
      let frac = pos - lo as f64;
      sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
  }
}
