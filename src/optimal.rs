//! Bucket and hash function selection for a target false positive rate.
//!
//! The rates below are looked up, not derived: row `b` holds the false
//! positive rates for `b` buckets (bits) per element, column `j` the rate
//! when `j` hash functions are used. Rows 0 and 1 and column 0 are dummies.
//!
//! See "Bloom Filters - the math" (Cao, summary cache) for the source figures.

use tracing::trace;

/// Fewest buckets per element ever selected.
pub const MIN_BUCKETS: usize = 2;
/// Most buckets per element ever selected.
pub const MAX_BUCKETS: usize = 15;
/// Fewest hash functions ever selected.
pub const MIN_K: usize = 1;
/// Most hash functions ever selected.
pub const MAX_K: usize = 8;

/// Hash function count with the lowest rate for a given bucket count.
static OPTIMAL_K_PER_BUCKETS: [usize; MAX_BUCKETS + 1] = [
    1, // dummy for 0 buckets per element
    1, // dummy for 1 bucket per element
    1, 2, 3, 3, 4, 5, 5, 6, 7, 8, 8, 8, 8, 8,
];

static FALSE_POSITIVE_RATES: [&[f64]; MAX_BUCKETS + 1] = [
    &[1.0],      // dummy for 0 buckets per element
    &[1.0, 1.0], // dummy for 1 bucket per element
    &[1.0, 0.393, 0.400],
    &[1.0, 0.283, 0.237, 0.253],
    &[1.0, 0.221, 0.155, 0.147, 0.160],
    &[1.0, 0.181, 0.109, 0.092, 0.092, 0.101],
    &[1.0, 0.154, 0.0804, 0.0609, 0.0561, 0.0578, 0.0638],
    &[1.0, 0.133, 0.0618, 0.0423, 0.0359, 0.0347, 0.0364],
    &[1.0, 0.118, 0.0489, 0.0306, 0.024, 0.0217, 0.0216, 0.0229],
    &[1.0, 0.105, 0.0397, 0.0228, 0.0166, 0.0141, 0.0133, 0.0135, 0.0145],
    &[1.0, 0.0952, 0.0329, 0.0174, 0.0118, 0.00943, 0.00844, 0.00819, 0.00846],
    &[1.0, 0.0869, 0.0276, 0.0136, 0.00864, 0.0065, 0.00552, 0.00513, 0.00509],
    &[1.0, 0.08, 0.0236, 0.0108, 0.00646, 0.00459, 0.00371, 0.00329, 0.00314],
    &[1.0, 0.074, 0.0203, 0.00875, 0.00492, 0.00332, 0.00255, 0.00217, 0.00199],
    &[1.0, 0.0689, 0.0177, 0.00718, 0.00381, 0.00244, 0.00179, 0.00146, 0.00129],
    &[1.0, 0.0645, 0.0156, 0.00596, 0.003, 0.00183, 0.00128, 0.001, 0.000852],
];

/// A `(buckets per element, hash function count)` pair picked by [`compute_optimal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BloomSpec {
    pub buckets_per_element: usize,
    pub k: usize,
}

impl BloomSpec {
    /// Tabulated false positive rate of this pair.
    pub fn error_rate(&self) -> f64 {
        false_positive_rate(self.buckets_per_element, self.k).unwrap_or(1.0)
    }
}

/// Looks up the tabulated rate for `buckets` per element and `k` hash functions.
///
/// Returns `None` for cells the table does not list.
pub fn false_positive_rate(buckets: usize, k: usize) -> Option<f64> {
    FALSE_POSITIVE_RATES.get(buckets)?.get(k).copied()
}

/// Returns the rate-minimizing hash function count for `buckets` per element.
pub fn optimal_k(buckets: usize) -> Option<usize> {
    OPTIMAL_K_PER_BUCKETS.get(buckets).copied()
}

#[inline]
fn rate(buckets: usize, k: usize) -> f64 {
    FALSE_POSITIVE_RATES[buckets][k]
}

/// Picks the smallest buckets per element that keeps the tabulated false
/// positive rate at or below `max_false_positive_prob`, then the smallest `k`
/// that still does so for that bucket count.
///
/// Space wins over hashing: buckets are minimized first, `k` only afterwards.
///
/// Total over its input. A ceiling at or above the loosest rate yields
/// `(MIN_BUCKETS, 1)`; one below the tightest rate (zero, negatives included)
/// is clamped to `(MAX_BUCKETS, MAX_K)`, whose real rate then exceeds the request.
pub fn compute_optimal(max_false_positive_prob: f64) -> BloomSpec {
    let mut buckets = MIN_BUCKETS;
    let mut k = OPTIMAL_K_PER_BUCKETS[buckets];

    if max_false_positive_prob >= rate(MIN_BUCKETS, MIN_K) {
        trace!(max_false_positive_prob, "loosest spec suffices");
        return BloomSpec {
            buckets_per_element: buckets,
            k,
        };
    }

    if max_false_positive_prob < rate(MAX_BUCKETS, MAX_K) {
        trace!(max_false_positive_prob, "unreachable rate, clamping to largest spec");
        return BloomSpec {
            buckets_per_element: MAX_BUCKETS,
            k: MAX_K,
        };
    }

    while rate(buckets, k) > max_false_positive_prob {
        buckets += 1;
        k = OPTIMAL_K_PER_BUCKETS[buckets];
    }

    // buckets are fixed now, fewer hashes cost nothing in space
    while k > MIN_K && rate(buckets, k - 1) <= max_false_positive_prob {
        k -= 1;
    }

    trace!(max_false_positive_prob, buckets, k, "searched spec");
    BloomSpec {
        buckets_per_element: buckets,
        k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(buckets_per_element: usize, k: usize) -> BloomSpec {
        BloomSpec {
            buckets_per_element,
            k,
        }
    }

    #[test]
    fn test_table_shape() {
        for (buckets, row) in FALSE_POSITIVE_RATES.iter().enumerate().skip(MIN_BUCKETS) {
            let k = OPTIMAL_K_PER_BUCKETS[buckets];
            assert!(k < row.len(), "optimal k missing from row {buckets}");
            assert_eq!(1.0, row[0]);
        }
        for buckets in MIN_BUCKETS + 1..=MAX_BUCKETS {
            for j in MIN_K..FALSE_POSITIVE_RATES[buckets - 1].len() {
                assert!(rate(buckets, j) <= rate(buckets - 1, j));
            }
        }
    }

    #[test]
    fn test_trivial_cases() {
        assert_eq!(spec(2, 1), compute_optimal(1.0));
        assert_eq!(spec(2, 1), compute_optimal(0.393));
        assert_eq!(spec(2, 1), compute_optimal(2.5));
        assert_eq!(spec(15, 8), compute_optimal(0.000_000_1));
        assert_eq!(spec(15, 8), compute_optimal(0.0));
        assert_eq!(spec(15, 8), compute_optimal(-1.0));
    }

    #[test]
    fn test_nan_falls_back_to_smallest_spec() {
        assert_eq!(spec(2, 1), compute_optimal(f64::NAN));
    }

    #[test]
    fn test_searched_specs() {
        // 7 buckets reach 0.0347 at k = 5, then k relaxes to 3 (0.0423)
        assert_eq!(spec(7, 3), compute_optimal(0.05));
        assert_eq!(spec(10, 5), compute_optimal(0.01));
        assert_eq!(spec(3, 1), compute_optimal(0.3));
        assert_eq!(spec(15, 8), compute_optimal(0.000852));
        assert_eq!(spec(15, 7), compute_optimal(0.001));
    }

    #[test]
    fn test_error_rate_lookup() {
        assert_eq!(0.0423, spec(7, 3).error_rate());
        assert_eq!(Some(0.000852), false_positive_rate(15, 8));
        assert_eq!(None, false_positive_rate(2, 3));
        assert_eq!(None, false_positive_rate(16, 1));
        assert_eq!(Some(5), optimal_k(8));
        assert_eq!(None, optimal_k(16));
    }

    proptest! {
        #[test]
        fn prop_tighter_rate_never_needs_less_space(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (tight, loose) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(
                compute_optimal(tight).buckets_per_element
                    >= compute_optimal(loose).buckets_per_element
            );
        }

        #[test]
        fn prop_reachable_rate_is_met(p in 0.000852f64..=1.0) {
            let chosen = compute_optimal(p);
            prop_assert!(chosen.error_rate() <= p);
        }

        #[test]
        fn prop_spec_within_bounds(p in proptest::num::f64::ANY) {
            let chosen = compute_optimal(p);
            prop_assert!((MIN_BUCKETS..=MAX_BUCKETS).contains(&chosen.buckets_per_element));
            prop_assert!((MIN_K..=MAX_K).contains(&chosen.k));
        }
    }
}
