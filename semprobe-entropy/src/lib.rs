// semprobe-entropy/src/lib.rs
#![no_std]

extern crate alloc; 

#[cfg(feature = "std")]
extern crate std;

pub mod entropy;
pub mod similarity;
pub mod statistics;
pub mod clustering;
pub mod scoring;

/// Common type definitions
pub type InformationScore = f64;

pub use clustering::{first_match_sweep, is_partition, seed_sweep, Cluster};
pub use scoring::{divergence_from_uniform, uniform_divergence};
pub use similarity::{cosine_similarity, lexical_ratio};
