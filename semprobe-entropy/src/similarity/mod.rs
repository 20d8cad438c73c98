//! Pairwise similarity measures used by the clustering sweeps.
//!
//! Two scales live here and they are deliberately not unified:
//! [`lexical_ratio`] reports a percentage in `[0, 100]`, while
//! [`cosine_similarity`] reports a cosine in `[-1, 1]`. Callers validate
//! thresholds against the scale of the metric they picked.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;
use libm::sqrt;

/// Normalized Indel similarity between two strings, in `[0, 100]`.
///
/// The distance counts the insertions and deletions needed to turn `a` into
/// `b` (`len_a + len_b - 2 * lcs`), and the ratio is
/// `100 * (1 - distance / (len_a + len_b))`. Lengths are measured in Unicode
/// scalar values. Two empty strings are identical and score `100`.
pub fn lexical_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let lcs = longest_common_subsequence(&a, &b);
    let distance = total - 2 * lcs;

    100.0 * (1.0 - distance as f64 / total as f64)
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        core::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Cosine similarity between two embedding vectors, in `[-1, 1]`.
///
/// Returns `0.0` when the vectors differ in length or either has zero norm.
/// Identical non-zero vectors score exactly `1.0`, and rounding never
/// pushes the result outside `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    if a == b {
        return 1.0;
    }

    (dot / (sqrt(norm_a) * sqrt(norm_b))).clamp(-1.0, 1.0)
}
