extern crate alloc;
use alloc::vec::Vec;
use libm::sqrt;

/// Converts cluster sizes into empirical probabilities `p_i = c_i / n`.
///
/// Returns an empty vector when the sizes sum to zero.
pub fn cluster_probabilities(sizes: &[usize]) -> Vec<f64> {
    let total: usize = sizes.iter().sum();
    if total == 0 {
        return Vec::new();
    }

    let total = total as f64;
    sizes.iter().map(|&size| size as f64 / total).collect()
}

/// Summary statistics for a set of scores collected across ResponseSets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    /// The arithmetic mean of the scores.
    pub mean: f64,
    /// The population standard deviation of the scores.
    pub std_dev: f64,
}

/// Calculates mean and standard deviation for a slice of values.
///
/// Used to summarize per-query scores over a whole experiment run.
pub fn compute_stats(values: &[f64]) -> ScoreStats {
    if values.is_empty() {
        return ScoreStats { mean: 0.0, std_dev: 0.0 };
    }

    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;

    let variance = values.iter()
        .map(|value| {
            let diff = mean - value;
            diff * diff
        })
        .sum::<f64>() / len;

    ScoreStats {
        mean,
        std_dev: sqrt(variance),
    }
}
