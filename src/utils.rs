use crate::FilterError::{self, CapacityOverflow};

/// Bits added on top of `num_elements * buckets_per_element`.
///
/// Empirical headroom for tiny filters, not derived from any formula.
pub const CAPACITY_PADDING_BITS: usize = 20;

/// Number of bits backing a filter for `num_elements` at `buckets_per_element`.
pub fn bit_count_for(num_elements: usize, buckets_per_element: usize) -> Result<usize, FilterError> {
    num_elements
        .checked_mul(buckets_per_element)
        .and_then(|bits| bits.checked_add(CAPACITY_PADDING_BITS))
        .ok_or(CapacityOverflow {
            num_elements,
            buckets_per_element,
        })
}

/// Like [`bit_count_for`], saturating at `usize::MAX` instead of failing.
pub fn saturating_bit_count_for(num_elements: usize, buckets_per_element: usize) -> usize {
    num_elements
        .saturating_mul(buckets_per_element)
        .saturating_add(CAPACITY_PADDING_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_count_for() {
        assert_eq!(90, bit_count_for(10, 7).unwrap());
        assert_eq!(20, bit_count_for(0, 15).unwrap());
        assert!(bit_count_for(usize::MAX, 2).is_err());
        assert!(bit_count_for(usize::MAX / 2, 2).is_err());
    }

    #[test]
    fn test_saturating_bit_count_for() {
        assert_eq!(1_020, saturating_bit_count_for(100, 10));
        assert_eq!(usize::MAX, saturating_bit_count_for(usize::MAX, 2));
    }
}
