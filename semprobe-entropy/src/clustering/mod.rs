//! Greedy single-pass clustering sweeps over a ResponseSet.
//!
//! Both sweeps work on indices and take the similarity decision as a closure,
//! so the same code serves edit-distance ratios, embedding cosines or exact
//! string equality. Clusters come back in creation order and each one keeps
//! its members in insertion order; `members[0]` is the representative.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

/// A non-empty group of response indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub members: Vec<usize>,
}

impl Cluster {
    /// Starts a cluster with `index` as its representative.
    pub fn seeded(index: usize) -> Self {
        Self { members: vec![index] }
    }

    /// The first-inserted member.
    pub fn representative(&self) -> usize {
        self.members[0]
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Lexical assignment rule.
///
/// Each candidate, in input order, is compared against the representative of
/// every existing cluster in creation order and joins the **first** one for
/// which `similar(representative, candidate)` holds. Otherwise it seeds a new
/// cluster. First match wins, not best match.
pub fn first_match_sweep<F>(n: usize, mut similar: F) -> Vec<Cluster>
where
    F: FnMut(usize, usize) -> bool,
{
    let mut clusters: Vec<Cluster> = Vec::new();

    for candidate in 0..n {
        let matched = clusters
            .iter()
            .position(|cluster| similar(cluster.representative(), candidate));

        match matched {
            Some(idx) => clusters[idx].members.push(candidate),
            None => clusters.push(Cluster::seeded(candidate)),
        }
    }

    clusters
}

/// Seed assignment rule.
///
/// The next unused index seeds a cluster, then every later unused index `j`
/// with `similar(seed, j)` is pulled in and marked used. Similarity is only
/// ever evaluated against the seed, and a consumed index never joins a later
/// cluster.
pub fn seed_sweep<F>(n: usize, mut similar: F) -> Vec<Cluster>
where
    F: FnMut(usize, usize) -> bool,
{
    let mut used = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut cluster = Cluster::seeded(seed);

        for candidate in (seed + 1)..n {
            if used[candidate] {
                continue;
            }
            if similar(seed, candidate) {
                used[candidate] = true;
                cluster.members.push(candidate);
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// Sizes of the clusters, in cluster order.
pub fn cluster_sizes(clusters: &[Cluster]) -> Vec<usize> {
    clusters.iter().map(Cluster::size).collect()
}

/// True when `clusters` cover `0..n` exactly once each with no empty cluster.
pub fn is_partition(clusters: &[Cluster], n: usize) -> bool {
    let mut seen = vec![false; n];
    for cluster in clusters {
        if cluster.members.is_empty() {
            return false;
        }
        for &member in &cluster.members {
            if member >= n || seen[member] {
                return false;
            }
            seen[member] = true;
        }
    }
    seen.into_iter().all(|s| s)
}
