//! # Strainer
//!
//! A Bloom filter sized from a table of known false positive rates.
//! It can claim that a given entry is
//!
//! * definitely not represented in a set of entries, or
//! * might be represented in the set.
//!
//! ## Strainer in Action
//!
//! ```rust
//! use strainer::{BloomFilter, Filter};
//!
//! fn main() {
//!     // The number of items the `BloomFilter` is planned for.
//!     // Adding more silently raises the false positive rate.
//!     let capacity = 10_000;
//!     // The false positive ceiling while no more than `capacity` items are stored
//!     let max_fp = 0.01;
//!     let mut bloom = BloomFilter::new(capacity, max_fp);
//!
//!     // Anything that is `AsRef<[u8]>` can be added
//!     bloom.add("stilton");
//!     bloom.add(String::from("colby"));
//!     bloom.add(b"parmesan");
//!     bloom.add("stilton");
//!
//!     // Added items are always found
//!     assert!(bloom.contains("stilton"));
//!     assert!(bloom.contains("colby"));
//!     assert!(bloom.contains(b"parmesan"));
//!
//!     // `size` counts `add` calls, duplicates included
//!     assert_eq!(4, bloom.size());
//!
//!     // An estimate of the distinct items is available as well
//!     println!("Approximately {} distinct items", bloom.count_approx());
//!
//!     println!("Number of bits for the actual filter: {}", bloom.bit_count());
//!     println!("Number of hash functions used: {}", bloom.hash_fn_count());
//!     println!("Tabulated error rate: {}", bloom.error_rate());
//! }
//! ```
//!
//! A `BloomFilter` is not synchronized. Share it behind a lock or keep one per thread.

use thiserror::Error;

/// An error returned when constructing a filter with checked parameters.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// A method is called with invalid parameters.
    #[error("invalid parameters (expected {expected:?}, found: {found:?})")]
    InvalidParameter {
        /// Expected parameter
        expected: &'static str,
        /// Provided parameter
        found: String,
    },
    /// The bit count does not fit into a `usize`.
    #[error("{num_elements} elements at {buckets_per_element} bits each overflow the bit count")]
    CapacityOverflow {
        num_elements: usize,
        buckets_per_element: usize,
    },
}

/// Probabilistic set membership over byte strings.
pub trait Filter {
    fn add(&mut self, item: impl AsRef<[u8]>) -> &mut Self;
    fn contains(&self, item: impl AsRef<[u8]>) -> bool;
    fn size(&self) -> u64;
    fn count_approx(&self) -> usize;
    fn bit_count(&self) -> usize;
    fn error_rate(&self) -> f64;
    fn hash_fn_count(&self) -> usize;
}

pub mod bloom;
pub mod optimal;
pub mod utils;

pub use bloom::BloomFilter;
pub use optimal::{compute_optimal, BloomSpec};
