use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Exp1;
use serde::Deserialize;
use serde::Serialize;

/// Law used to draw long-only weight vectors on the unit simplex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingLaw {
  /// Normalised i.i.d. Exp(1) variates, i.e. Dirichlet(1, ..., 1): uniform on the simplex.
  #[default]
  Dirichlet,
  /// Normalised i.i.d. U(0, 1) variates. Concentrates mass toward the
  /// centre of the simplex and under-samples the vertices.
  UniformNormalized,
}

impl SamplingLaw {
  /// Fill `out` with non-negative weights summing to one.
  pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [f64]) {
    loop {
      for w in out.iter_mut() {
        *w = match self {
          SamplingLaw::Dirichlet => Exp1.sample(rng),
          SamplingLaw::UniformNormalized => rng.random::<f64>(),
        };
      }

      let total: f64 = out.iter().sum();
      if total > 0.0 && total.is_finite() {
        for w in out.iter_mut() {
          *w /= total;
        }
        return;
      }
    }
  }
}

/// Seed of chunk `chunk` derived from the run seed.
pub(crate) fn chunk_seed(seed: u64, chunk: usize) -> u64 {
  seed ^ (chunk as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
