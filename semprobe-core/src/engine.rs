// semprobe-core/src/engine.rs
//! Defines the core ClusteringEngine trait and related data structures.
//!
//! The `ClusteringEngine` trait provides a pluggable interface for different
//! ways of deciding when two responses "say the same thing" (edit distance,
//! embeddings, exact equality). Every engine returns a partition of the
//! ResponseSet; the shared `estimate` method turns that partition into an
//! information score, so all strategies feed the same estimator.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::{Deserialize, Serialize};

use semprobe_entropy::clustering::{cluster_sizes, is_partition, Cluster};
use semprobe_entropy::entropy::shannon_entropy;
use semprobe_entropy::statistics::cluster_probabilities;
use semprobe_entropy::uniform_divergence;

use crate::errors::ProbeError;

/// A group of responses judged equivalent by an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCluster {
    /// The first-inserted member.
    pub representative: String,
    /// Member texts in insertion order; `members[0] == representative`.
    pub members: Vec<String>,
    /// Positions of the members in the ResponseSet.
    pub indices: Vec<usize>,
}

impl ResponseCluster {
    /// Materializes an index cluster against the responses it was built from.
    pub fn from_indices(cluster: &Cluster, responses: &[String]) -> Self {
        let members: Vec<String> = cluster.members.iter()
            .map(|&i| responses[i].clone())
            .collect();
        Self {
            representative: responses[cluster.representative()].clone(),
            members,
            indices: cluster.members.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.indices.len()
    }
}

/// The result of clustering and scoring one ResponseSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationEstimate {
    /// `Σ p_i · ln(p_i / (1/k))`, always `>= 0`.
    pub score: f64,
    pub clusters: Vec<ResponseCluster>,
    pub cluster_sizes: Vec<usize>,
    pub probabilities: Vec<f64>,
    /// Shannon entropy of the cluster distribution, in nats.
    pub entropy: f64,
    /// Number of responses scored.
    pub total: usize,
}

impl InformationEstimate {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// Scores an already computed partition.
///
/// Fails with `InvalidInput` when there is nothing to score, so the
/// estimator never divides by zero, or when the clusters do not hold every
/// index in `0..total` exactly once.
pub fn estimate_from_clusters(
    clusters: Vec<ResponseCluster>,
    total: usize,
) -> Result<InformationEstimate, ProbeError> {
    if total == 0 || clusters.is_empty() {
        return Err(ProbeError::InvalidInput(
            "cannot estimate information for an empty response set".to_string(),
        ));
    }

    let sizes: Vec<usize> = clusters.iter().map(ResponseCluster::size).collect();
    let covered: usize = sizes.iter().sum();
    if covered != total {
        return Err(ProbeError::InvalidInput(format!(
            "clusters cover {} responses but the set has {}",
            covered, total
        )));
    }
    let index_clusters: Vec<Cluster> = clusters.iter()
        .map(|c| Cluster { members: c.indices.clone() })
        .collect();
    if !is_partition(&index_clusters, total) {
        return Err(ProbeError::InvalidInput(format!(
            "clusters do not partition indices 0..{}",
            total
        )));
    }

    let probabilities = cluster_probabilities(&sizes);
    let score = uniform_divergence(&sizes);
    let entropy = shannon_entropy(&sizes);

    debug!("Scored {} responses in {} clusters: sizes={:?}, score={:.4}", total, sizes.len(), sizes, score);

    Ok(InformationEstimate {
        score,
        clusters,
        cluster_sizes: sizes,
        probabilities,
        entropy,
        total,
    })
}

/// Converts index clusters into response clusters.
pub fn materialize(clusters: &[Cluster], responses: &[String]) -> Vec<ResponseCluster> {
    debug!("Cluster sizes: {:?}", cluster_sizes(clusters));
    clusters.iter()
        .map(|c| ResponseCluster::from_indices(c, responses))
        .collect()
}

/// A trait that defines the core functionality of a clustering engine.
///
/// This trait decouples the experiment driver from the specific similarity
/// metric, allowing engines to be used interchangeably.
pub trait ClusteringEngine: Send + Sync {
    /// Short identifier of the strategy, e.g. `"lexical"`.
    fn name(&self) -> &'static str;

    /// The similarity threshold on the engine's own scale.
    fn threshold(&self) -> f64;

    /// Partitions `responses` into clusters.
    ///
    /// Every index appears in exactly one cluster. Clusters are returned in
    /// creation order. An empty input yields an empty list.
    fn cluster(&self, responses: &[String]) -> Result<Vec<ResponseCluster>, ProbeError>;

    /// Clusters and scores a completed ResponseSet.
    fn estimate(&self, responses: &[String]) -> Result<InformationEstimate, ProbeError> {
        if responses.is_empty() {
            return Err(ProbeError::InvalidInput(
                "response set is empty; nothing to cluster".to_string(),
            ));
        }
        let clusters = self.cluster(responses)?;
        estimate_from_clusters(clusters, responses.len())
    }
}
