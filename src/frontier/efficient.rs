use super::FrontierPoint;

/// Indices of non-dominated points, ascending in volatility.
///
/// Sorting by volatility (ties: higher return first) lets a single sweep keep
/// every point whose return beats everything less volatile. Exact duplicates
/// of the last kept point do not dominate it and are kept too.
pub(crate) fn efficient_indices(points: &[FrontierPoint]) -> Vec<usize> {
  let mut order: Vec<usize> = (0..points.len()).collect();
  order.sort_by(|&a, &b| {
    let (pa, pb) = (&points[a], &points[b]);
    pa.expected_volatility
      .total_cmp(&pb.expected_volatility)
      .then(pb.expected_return.total_cmp(&pa.expected_return))
  });

  let mut kept: Vec<usize> = Vec::new();
  let mut best_return = f64::NEG_INFINITY;
  let mut best_volatility = f64::NEG_INFINITY;
  for i in order {
    let p = &points[i];
    let tie = p.expected_return == best_return && p.expected_volatility == best_volatility;
    if p.expected_return > best_return || tie {
      best_return = p.expected_return;
      best_volatility = p.expected_volatility;
      kept.push(i);
    }
  }
  kept
}
