// semprobe-core/src/engines/exact_engine.rs
//! A `ClusteringEngine` that groups responses only when they are identical.
//! License: MIT OR Apache-2.0

use semprobe_entropy::first_match_sweep;

use crate::engine::{materialize, ClusteringEngine, ResponseCluster};
use crate::errors::ProbeError;

/// Counts distinct response strings. Clusters appear in order of first
/// occurrence.
#[derive(Debug, Clone, Default)]
pub struct ExactEngine;

impl ExactEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ClusteringEngine for ExactEngine {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn threshold(&self) -> f64 {
        100.0
    }

    fn cluster(&self, responses: &[String]) -> Result<Vec<ResponseCluster>, ProbeError> {
        let clusters = first_match_sweep(responses.len(), |rep, candidate| {
            responses[rep] == responses[candidate]
        });
        Ok(materialize(&clusters, responses))
    }
}
