//! # Efficient Frontier
//!
//! $$
//! \mu_p = A\,\mathbf{w}^\top\mu, \qquad \sigma_p = \sqrt{A\,\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Monte Carlo frontier: random long-only portfolios are scored on annualized
//! return and volatility, then filtered to the non-dominated set.
//!
//! A run moves through four phases. [`FrontierSimulator::new`] validates the
//! inputs (configured), [`FrontierSimulator::sample`] draws every portfolio in
//! seeded chunks and concatenates them in chunk order (sampling, aggregated),
//! and [`FrontierResult::from_population`] extracts the efficient set and the
//! summary portfolios (filtered).

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::validate_annualization_factor;
use crate::config::validate_risk_free;
use crate::error::AnalyticsError;
use crate::error::Result;
use crate::metrics::sharpe_ratio;
use crate::portfolio::Portfolio;
use crate::series::AlignedReturns;

mod covariance;
mod efficient;
pub mod sampling;

pub use sampling::SamplingLaw;

use covariance::quadratic_form;
use covariance::validate_covariance;

/// Sampling settings of a frontier run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
  /// Number of random portfolios.
  pub simulations: usize,
  /// Seed of the whole run; results are a pure function of it.
  pub seed: u64,
  pub sampling: SamplingLaw,
  /// Draws per independently seeded chunk.
  pub chunk_size: usize,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      simulations: 10_000,
      seed: 42,
      sampling: SamplingLaw::Dirichlet,
      chunk_size: 1024,
    }
  }
}

impl FrontierConfig {
  pub fn validate(&self) -> Result<()> {
    if self.simulations == 0 {
      return Err(AnalyticsError::InvalidParameter(
        "frontier needs at least one simulation".into(),
      ));
    }
    if self.chunk_size == 0 {
      return Err(AnalyticsError::InvalidParameter(
        "chunk_size must be positive".into(),
      ));
    }
    Ok(())
  }
}

/// Per-period moments of the asset universe.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierInputs {
  pub symbols: Vec<String>,
  pub mean_returns: Vec<f64>,
  pub covariance: Vec<Vec<f64>>,
}

impl FrontierInputs {
  /// Unnamed assets are labelled `asset_0`, `asset_1`, ...
  pub fn new(mean_returns: Vec<f64>, covariance: Vec<Vec<f64>>) -> Self {
    let symbols = (0..mean_returns.len()).map(|i| format!("asset_{i}")).collect();
    Self {
      symbols,
      mean_returns,
      covariance,
    }
  }

  /// Sample means and covariance of aligned returns.
  pub fn from_aligned(aligned: &AlignedReturns) -> Self {
    Self {
      symbols: aligned.symbols().to_vec(),
      mean_returns: aligned.mean_vector(),
      covariance: aligned.covariance_matrix(),
    }
  }
}

/// One sampled portfolio.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrontierPoint {
  /// Weights in the asset order of [`FrontierInputs`].
  pub weights: Vec<f64>,
  pub expected_return: f64,
  pub expected_volatility: f64,
  /// `None` when the portfolio has zero volatility.
  pub sharpe_ratio: Option<f64>,
}

impl FrontierPoint {
  /// `self` is at least as good on both axes and strictly better on one.
  pub fn dominates(&self, other: &FrontierPoint) -> bool {
    self.expected_return >= other.expected_return
      && self.expected_volatility <= other.expected_volatility
      && (self.expected_return > other.expected_return
        || self.expected_volatility < other.expected_volatility)
  }
}

/// Sampled population with its efficient subset and summary portfolios.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrontierResult {
  symbols: Vec<String>,
  points: Vec<FrontierPoint>,
  /// Indices into `points`, ascending in volatility.
  efficient: Vec<usize>,
  max_sharpe: Option<usize>,
  min_volatility: usize,
  max_return: usize,
}

impl FrontierResult {
  /// Filter a non-empty population.
  pub fn from_population(symbols: Vec<String>, points: Vec<FrontierPoint>) -> Result<Self> {
    if points.is_empty() {
      return Err(AnalyticsError::InsufficientData {
        required: 1,
        actual: 0,
      });
    }

    let efficient = efficient::efficient_indices(&points);
    let min_volatility = argmax_by(&points, |p| -p.expected_volatility);
    let max_return = argmax_by(&points, |p| p.expected_return);
    let max_sharpe = points
      .iter()
      .enumerate()
      .filter_map(|(i, p)| p.sharpe_ratio.map(|s| (i, s)))
      .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
        Some((_, b)) if b >= s => best,
        _ => Some((i, s)),
      })
      .map(|(i, _)| i);

    Ok(Self {
      symbols,
      points,
      efficient,
      max_sharpe,
      min_volatility,
      max_return,
    })
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Every sampled portfolio in draw order.
  pub fn points(&self) -> &[FrontierPoint] {
    &self.points
  }

  /// Non-dominated portfolios, ascending in volatility.
  pub fn efficient_points(&self) -> impl Iterator<Item = &FrontierPoint> {
    self.efficient.iter().map(|&i| &self.points[i])
  }

  pub fn efficient_len(&self) -> usize {
    self.efficient.len()
  }

  /// `None` when no portfolio has a defined Sharpe ratio.
  pub fn max_sharpe_point(&self) -> Option<&FrontierPoint> {
    self.max_sharpe.map(|i| &self.points[i])
  }

  pub fn min_volatility_point(&self) -> &FrontierPoint {
    &self.points[self.min_volatility]
  }

  pub fn max_return_point(&self) -> &FrontierPoint {
    &self.points[self.max_return]
  }

  /// Symbol-keyed weights of `point`.
  pub fn portfolio(&self, point: &FrontierPoint) -> Result<Portfolio> {
    Portfolio::from_parts(&self.symbols, &point.weights)
  }
}

fn argmax_by(points: &[FrontierPoint], key: impl Fn(&FrontierPoint) -> f64) -> usize {
  let mut best = 0;
  for (i, p) in points.iter().enumerate().skip(1) {
    if key(p) > key(&points[best]) {
      best = i;
    }
  }
  best
}

/// Validated frontier run.
#[derive(Clone, Debug)]
pub struct FrontierSimulator {
  inputs: FrontierInputs,
  config: FrontierConfig,
  risk_free: f64,
  annualization_factor: f64,
}

impl FrontierSimulator {
  /// `risk_free` is annual; the inputs are per period.
  pub fn new(
    inputs: FrontierInputs,
    config: FrontierConfig,
    risk_free: f64,
    annualization_factor: f64,
  ) -> Result<Self> {
    let k = inputs.mean_returns.len();
    if inputs.symbols.len() != k {
      return Err(AnalyticsError::InvalidParameter(format!(
        "{} symbols for {k} mean returns",
        inputs.symbols.len()
      )));
    }
    if inputs.mean_returns.iter().any(|m| !m.is_finite()) {
      return Err(AnalyticsError::InvalidParameter(
        "mean returns must be finite".into(),
      ));
    }
    validate_covariance(&inputs.covariance, k)?;
    config.validate()?;
    validate_annualization_factor(annualization_factor)?;
    validate_risk_free(risk_free)?;

    debug!(
      assets = k,
      simulations = config.simulations,
      seed = config.seed,
      sampling = ?config.sampling,
      "frontier configured"
    );

    Ok(Self {
      inputs,
      config,
      risk_free,
      annualization_factor,
    })
  }

  pub fn config(&self) -> &FrontierConfig {
    &self.config
  }

  /// Score one weight vector of length `k`.
  fn evaluate(&self, weights: Vec<f64>) -> FrontierPoint {
    let a = self.annualization_factor;
    let mean: f64 = weights
      .iter()
      .zip(&self.inputs.mean_returns)
      .map(|(w, m)| w * m)
      .sum();
    let expected_return = mean * a;
    let expected_volatility = (quadratic_form(&self.inputs.covariance, &weights) * a).sqrt();

    FrontierPoint {
      weights,
      expected_return,
      expected_volatility,
      sharpe_ratio: sharpe_ratio(expected_return, expected_volatility, self.risk_free),
    }
  }

  /// Draw the whole population in draw order.
  pub fn sample(&self) -> Vec<FrontierPoint> {
    let n = self.config.simulations;
    let chunk_size = self.config.chunk_size;
    let n_chunks = n.div_ceil(chunk_size);

    let chunks: Vec<Vec<FrontierPoint>> = (0..n_chunks)
      .into_par_iter()
      .map(|c| {
        let len = chunk_size.min(n - c * chunk_size);
        self.sample_chunk(c, len)
      })
      .collect();

    let points: Vec<FrontierPoint> = chunks.into_iter().flatten().collect();
    debug!(points = points.len(), chunks = n_chunks, "frontier sampled");
    points
  }

  fn sample_chunk(&self, chunk: usize, len: usize) -> Vec<FrontierPoint> {
    let k = self.inputs.mean_returns.len();
    let mut rng = StdRng::seed_from_u64(sampling::chunk_seed(self.config.seed, chunk));
    let mut out = Vec::with_capacity(len);

    for _ in 0..len {
      let mut w = vec![0.0; k];
      self.config.sampling.draw(&mut rng, &mut w);
      out.push(self.evaluate(w));
    }
    out
  }

  /// Sample and filter.
  pub fn run(&self) -> Result<FrontierResult> {
    let result = FrontierResult::from_population(self.inputs.symbols.clone(), self.sample())?;
    debug!(efficient = result.efficient_len(), "frontier filtered");
    Ok(result)
  }
}

/// Monte Carlo frontier with the default sampling law.
///
/// `mean_returns` and `covariance` are per period, `risk_free` is annual.
pub fn simulate_frontier(
  mean_returns: &[f64],
  covariance: &[Vec<f64>],
  simulations: usize,
  risk_free: f64,
  annualization_factor: f64,
  seed: u64,
) -> Result<FrontierResult> {
  let config = FrontierConfig {
    simulations,
    seed,
    ..FrontierConfig::default()
  };
  FrontierSimulator::new(
    FrontierInputs::new(mean_returns.to_vec(), covariance.to_vec()),
    config,
    risk_free,
    annualization_factor,
  )?
  .run()
}
