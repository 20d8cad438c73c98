// semprobe-core/src/engines/lexical_engine.rs
//! A `ClusteringEngine` that groups responses by fuzzy edit-distance ratio.
//! License: MIT OR Apache-2.0

use log::{debug, trace};

use semprobe_entropy::{first_match_sweep, lexical_ratio};

use crate::config::{validate_lexical_threshold, LexicalConfig};
use crate::engine::{materialize, ClusteringEngine, ResponseCluster};
use crate::errors::ProbeError;

/// Clusters responses by comparing each one to the representative of every
/// existing cluster in creation order. The first cluster whose
/// representative scores at or above the threshold takes the response.
#[derive(Debug, Clone)]
pub struct LexicalEngine {
    threshold: f64,
}

impl LexicalEngine {
    /// Creates an engine with a percentage threshold in `[0, 100]`.
    pub fn new(threshold: f64) -> Result<Self, ProbeError> {
        validate_lexical_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn from_config(config: &LexicalConfig) -> Result<Self, ProbeError> {
        Self::new(config.effective_threshold())
    }
}

impl ClusteringEngine for LexicalEngine {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn cluster(&self, responses: &[String]) -> Result<Vec<ResponseCluster>, ProbeError> {
        let clusters = first_match_sweep(responses.len(), |rep, candidate| {
            let ratio = lexical_ratio(&responses[rep], &responses[candidate]);
            trace!("lexical ratio({}, {}) = {:.2}", rep, candidate, ratio);
            ratio >= self.threshold
        });
        debug!("Lexical engine formed {} clusters from {} responses", clusters.len(), responses.len());
        Ok(materialize(&clusters, responses))
    }
}
