//! Choosing which variables trade places in a pivot.

use log::trace;

/// Scale of the perturbation added to the right-hand side in the ratio test.
const PERTURBATION_SCALE: f64 = 1e100;

/// Bland's rule: the smallest nonbasic index with a positive reduced cost.
///
/// `nonbasic` must be sorted ascending. Returns `None` when no reduced cost
/// exceeds `tolerance`, i.e. the dictionary is optimal.
pub fn select_entering(reduced_costs: &[f64], nonbasic: &[usize], tolerance: f64) -> Option<usize> {
    nonbasic.iter().copied().find(|&j| reduced_costs[j] > tolerance)
}

/// Ratio test for the entering column.
///
/// Every row gets the ratio `e_i / (b_i + ε)` where `ε` is the largest
/// positive `b_i` scaled down by 1e100, so degenerate rows (`b_i = 0`) rank
/// first instead of dividing by zero. The row with the largest ratio leaves,
/// ties going to the first row. Returns the leaving variable (`basic[row]`),
/// or `None` if no ratio is positive and the entering direction is unbounded.
pub fn select_leaving(entering_column: &[f64], rhs: &[f64], basic: &[usize]) -> Option<usize> {
    debug_assert_eq!(entering_column.len(), rhs.len());
    debug_assert_eq!(basic.len(), rhs.len());

    let largest = rhs.iter().copied().filter(|&b| b > 0.0).reduce(f64::max);
    let epsilon = largest.unwrap_or(1.0) / PERTURBATION_SCALE;

    let mut best: Option<(usize, f64)> = None;
    for (row, (&e, &b)) in entering_column.iter().zip(rhs).enumerate() {
        let ratio = e / (b + epsilon);
        // NaN never compares greater, so it can't be picked.
        if ratio > 0.0 && best.is_none_or(|(_, r)| ratio > r) {
            best = Some((row, ratio));
        }
    }

    trace!("ratio test: epsilon = {:e}, chosen row = {:?}", epsilon, best);
    best.map(|(row, _)| basic[row])
}
