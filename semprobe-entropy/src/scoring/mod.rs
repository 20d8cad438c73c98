// semprobe-entropy/src/scoring/mod.rs
//! The mutual-information-style score.
//!
//! The score is the Kullback-Leibler divergence of the empirical cluster
//! distribution from a uniform distribution, `sum p_i * ln(p_i / (1 / support))`.
//! The estimator uses `support = k`, the number of clusters observed. That
//! choice makes the score `0` whenever all clusters share the same size, no
//! matter how many there are: three singleton clusters score exactly like one
//! cluster of three. It is equal to `ln(k) - H(p)`, so it depends on the
//! clustering threshold through `k`.
//!
//! The behaviour is kept for compatibility with earlier result files. Whether
//! the reference should instead be the repeat count `n` or the size of the
//! answer space is an open question; [`divergence_from_uniform`] takes the
//! support explicitly so the dependency stays visible.

use libm::log;

use crate::statistics::cluster_probabilities;
use crate::InformationScore;

/// Divergence of the cluster-size distribution from a uniform distribution
/// over `support` outcomes. Zero-probability clusters are skipped.
///
/// Returns `0.0` for an empty distribution or a zero support.
pub fn divergence_from_uniform(sizes: &[usize], support: usize) -> InformationScore {
    if support == 0 {
        return 0.0;
    }
    let reference = 1.0 / support as f64;

    cluster_probabilities(sizes)
        .into_iter()
        .filter(|&p| p > 0.0)
        .map(|p| p * log(p / reference))
        .sum()
}

/// The estimator's score: divergence against a uniform reference over the
/// `k` observed clusters.
pub fn uniform_divergence(sizes: &[usize]) -> InformationScore {
    divergence_from_uniform(sizes, sizes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::shannon_entropy;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_single_cluster_scores_zero() {
        assert_eq!(uniform_divergence(&[3]), 0.0);
        assert_eq!(uniform_divergence(&[1]), 0.0);
    }

    #[test]
    fn test_empty_distribution_scores_zero() {
        assert_eq!(uniform_divergence(&[]), 0.0);
        assert_eq!(divergence_from_uniform(&[2, 1], 0), 0.0);
    }

    // Equal-size clusters always score 0 because the reference is 1/k.
    // All-distinct answers are indistinguishable from unanimous ones here.
    #[test]
    fn test_equal_size_clusters_score_zero_regardless_of_k() {
        assert_eq!(uniform_divergence(&[1, 1, 1]), 0.0);
        assert_eq!(uniform_divergence(&[5, 5]), 0.0);
        assert_eq!(uniform_divergence(&[1; 10]), 0.0);
    }

    #[test]
    fn test_skewed_clusters() {
        // 2/3 ln(4/3) + 1/3 ln(2/3)
        assert!((uniform_divergence(&[2, 1]) - 0.056_633_012_265_132_43).abs() < EPSILON);
        assert!((uniform_divergence(&[8, 1, 1]) - 0.459_580_429_017_932_95).abs() < EPSILON);
    }

    #[test]
    fn test_score_equals_log_k_minus_entropy() {
        for sizes in [&[7usize, 2, 1][..], &[4, 4, 1, 1][..], &[9, 1][..]] {
            let expected = log(sizes.len() as f64) - shannon_entropy(sizes);
            assert!((uniform_divergence(sizes) - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn test_alternative_support_changes_the_score() {
        // Against a reference over n = 3 answers, three singletons still
        // score 0, but one cluster of three scores ln(3).
        assert!((divergence_from_uniform(&[3], 3) - log(3.0)).abs() < EPSILON);
        assert!(divergence_from_uniform(&[1, 1, 1], 3).abs() < EPSILON);
    }
}
