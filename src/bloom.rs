use bitvec::{bitvec, prelude::*};
use rand::{thread_rng, Rng};
use std::hash::Hasher;
use tracing::debug;
use twox_hash::XxHash32;

use crate::optimal::{compute_optimal, BloomSpec};
use crate::utils::{bit_count_for, saturating_bit_count_for};
use crate::Filter;
use crate::FilterError;
use crate::FilterError::InvalidParameter;

/// A Bloom filter is a space-efficient probabilistic data structure to test
/// whether an item is a member of a set.
///
/// It never returns false negatives but may return false positives.
/// Items can only be added, not deleted, and bits are never cleared.
///
/// The filter is sized for the `num_elements` given at construction. Adding
/// more items is allowed but silently pushes the false positive rate above
/// the requested ceiling; keeping within capacity is up to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilter {
    filter: BitVec,
    bit_count: usize,
    spec: BloomSpec,
    seeds: Vec<u32>,
    records: u64,
}

impl Filter for BloomFilter {
    /// Adds the `item` to the `BloomFilter`.
    ///
    /// Every call counts towards [`Filter::size`], duplicates included.
    fn add(&mut self, item: impl AsRef<[u8]>) -> &mut Self {
        let bytes = item.as_ref();
        for &seed in &self.seeds {
            let idx = self.position(seed, bytes);
            self.filter.set(idx, true);
        }
        self.records += 1;

        self
    }

    /// *Indicates* whether `item` is in the `BloomFilter`.
    ///
    /// Never yields false negatives.
    fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let bytes = item.as_ref();
        self.seeds
            .iter()
            .all(|&seed| self.filter[self.position(seed, bytes)])
    }

    /// Returns the number of `add` calls made so far.
    fn size(&self) -> u64 {
        self.records
    }

    /// Returns an *approximation* of the number of distinct elements added.
    fn count_approx(&self) -> usize {
        let num_truthy_bits = self.filter.count_ones();
        approximate_elems(self.bit_count, self.spec.k, num_truthy_bits).round() as usize
    }

    fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Returns the tabulated error rate of the chosen buckets and hash function count.
    fn error_rate(&self) -> f64 {
        self.spec.error_rate()
    }

    fn hash_fn_count(&self) -> usize {
        self.spec.k
    }
}

impl BloomFilter {
    /// Constructs a new `BloomFilter` with randomly seeded hash functions.
    ///
    /// * `num_elements`: Intended elements the Bloom filter shall be able to hold
    /// * `max_false_positive_prob`: The Bloom filter's acceptable false positive rate
    ///
    /// Never fails; out of range rates are clamped by [`compute_optimal`].
    /// A bit count beyond the address space panics on allocation, use
    /// [`BloomFilter::try_new`] to get an error instead.
    pub fn new(num_elements: usize, max_false_positive_prob: f64) -> BloomFilter {
        Self::with_rng(num_elements, max_false_positive_prob, &mut thread_rng())
    }

    /// Same as [`BloomFilter::new`], drawing the hash seeds from `rng`.
    pub fn with_rng<R: Rng>(
        num_elements: usize,
        max_false_positive_prob: f64,
        rng: &mut R,
    ) -> BloomFilter {
        let spec = compute_optimal(max_false_positive_prob);
        let bit_count = saturating_bit_count_for(num_elements, spec.buckets_per_element);
        Self::build(spec, bit_count, rng)
    }

    /// Constructs a new `BloomFilter`, rejecting parameters outside the
    /// domain the filter is designed for.
    ///
    /// Fails if `num_elements` is 0, if `max_false_positive_prob` is not in
    /// `(0.0, 1.0]`, or if the bit count overflows.
    pub fn try_new(
        num_elements: usize,
        max_false_positive_prob: f64,
    ) -> Result<BloomFilter, FilterError> {
        if num_elements < 1 {
            return Err(InvalidParameter {
                expected: "1 <= num_elements",
                found: num_elements.to_string(),
            });
        }
        if !(max_false_positive_prob > 0.0 && max_false_positive_prob <= 1.0) {
            return Err(InvalidParameter {
                expected: "0.0 < max false positive probability <= 1.0",
                found: max_false_positive_prob.to_string(),
            });
        }

        let spec = compute_optimal(max_false_positive_prob);
        let bit_count = bit_count_for(num_elements, spec.buckets_per_element)?;

        Ok(Self::build(spec, bit_count, &mut thread_rng()))
    }

    fn build<R: Rng>(spec: BloomSpec, bit_count: usize, rng: &mut R) -> BloomFilter {
        let seeds = draw_seeds(spec.k, rng);
        debug!(
            bit_count,
            buckets_per_element = spec.buckets_per_element,
            k = spec.k,
            "constructing Bloom filter"
        );

        BloomFilter {
            filter: bitvec![usize, Lsb0; 0; bit_count],
            bit_count,
            spec,
            seeds,
            records: 0,
        }
    }

    /// Returns the buckets (bits) reserved per planned element.
    pub fn buckets_per_element(&self) -> usize {
        self.spec.buckets_per_element
    }

    /// Returns the seeds of the hash functions, one per function.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Returns `true` if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Maps `bytes` to a bit index using the hash function keyed by `seed`.
    #[inline]
    fn position(&self, seed: u32, bytes: &[u8]) -> usize {
        (u64::from(hash32(seed, bytes)) % self.bit_count as u64) as usize
    }
}

/// XXH32 of `bytes` under `seed`.
fn hash32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = XxHash32::with_seed(seed);
    hasher.write(bytes);
    hasher.finish() as u32
}

/// Draws `k` pairwise distinct seeds. Equal seeds would collapse hash functions.
fn draw_seeds<R: Rng>(k: usize, rng: &mut R) -> Vec<u32> {
    let mut seeds = Vec::with_capacity(k);
    while seeds.len() < k {
        let seed = rng.gen::<u32>();
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    seeds
}

/// Approximates the number of items in the filter
fn approximate_elems(bits: usize, hash_fns_count: usize, num_truthy_bits: usize) -> f64 {
    let m = bits as f64;
    let x = num_truthy_bits as f64;
    let k = hash_fns_count as f64;

    -1.0 * (m * (1.0 - x / m).ln()) / k
}
