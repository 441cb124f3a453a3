use std::hint::black_box;

use adr_analytics::frontier::FrontierConfig;
use adr_analytics::frontier::FrontierInputs;
use adr_analytics::frontier::FrontierSimulator;
use adr_analytics::frontier::SamplingLaw;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;

const A: f64 = 252.0;

fn inputs(k: usize) -> FrontierInputs {
  let mean = (0..k).map(|i| (0.04 + 0.01 * i as f64) / A).collect();
  let cov = (0..k)
    .map(|i| {
      (0..k)
        .map(|j| {
          let si = 0.15 + 0.02 * i as f64;
          let sj = 0.15 + 0.02 * j as f64;
          let rho = if i == j { 1.0 } else { 0.3 };
          rho * si * sj / A
        })
        .collect()
    })
    .collect();
  FrontierInputs::new(mean, cov)
}

fn bench_frontier(c: &mut Criterion) {
  let mut group = c.benchmark_group("Frontier");

  for k in [2usize, 5, 15] {
    for law in [SamplingLaw::Dirichlet, SamplingLaw::UniformNormalized] {
      let config = FrontierConfig {
        simulations: 10_000,
        sampling: law,
        ..FrontierConfig::default()
      };
      let sim = FrontierSimulator::new(inputs(k), config, 0.02, A).unwrap();
      group.bench_with_input(BenchmarkId::new(format!("{law:?}"), k), &sim, |b, sim| {
        b.iter(|| black_box(sim.run().unwrap()))
      });
    }
  }

  group.finish();
}

criterion_group!(benches, bench_frontier);
criterion_main!(benches);
