// semprobe-entropy/src/entropy/mod.rs
use libm::log;

use crate::statistics::cluster_probabilities;

/// Calculates the Shannon entropy of a cluster-size distribution.
/// 
/// Returns the entropy in nats. Unlike the uniform-reference divergence in
/// [`crate::scoring`], this value still moves when every cluster has the same
/// size, which makes it a useful companion diagnostic.
pub fn shannon_entropy(sizes: &[usize]) -> f64 {
    let mut entropy = 0.0;

    for p in cluster_probabilities(sizes) {
        if p > 0.0 {
            entropy -= p * log(p);
        }
    }

    entropy
}
