//! Log-space arithmetic and small numeric helpers shared by the algorithms.

/// Allowed deviation from 1.0 when checking that a probability vector sums
/// to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Occupancy denominators below this are treated as "state never visited";
/// the corresponding parameters keep their prior values.
pub const MIN_OCCUPANCY: f64 = 1e-300;

/// Numerically stable `ln(exp(a) + exp(b))`.
#[inline]
pub fn log_add(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// Log-sum-exp over an iterator of log values. Empty input yields `-inf`.
pub fn log_sum_exp<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(f64::NEG_INFINITY, log_add)
}

/// Index and value of the maximum, preferring the lowest index on ties.
///
/// Returns `(0, -inf)` when every value is `-inf` (or the slice is empty).
#[inline]
pub fn argmax_lowest(values: &[f64]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best {
            best = v;
            best_idx = idx;
        }
    }
    (best_idx, best)
}
