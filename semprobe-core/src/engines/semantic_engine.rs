// semprobe-core/src/engines/semantic_engine.rs
//! A `ClusteringEngine` that groups responses by embedding cosine similarity.
//! License: MIT OR Apache-2.0

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use semprobe_entropy::{cosine_similarity, seed_sweep};

use crate::config::{validate_semantic_threshold, SemanticConfig};
use crate::embedding::{build_embedder, Embedder};
use crate::engine::{materialize, ClusteringEngine, ResponseCluster};
use crate::errors::ProbeError;

/// Clusters responses around seeds. The next unclustered response becomes a
/// seed and absorbs every later unclustered response whose cosine similarity
/// to the seed is at least the threshold.
///
/// All responses are embedded in one call before clustering. If the
/// embedder fails, the whole ResponseSet fails; no partial clusters are
/// produced.
pub struct SemanticEngine {
    threshold: f64,
    embedder: Arc<dyn Embedder>,
}

impl fmt::Debug for SemanticEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticEngine")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl SemanticEngine {
    /// Creates an engine with a cosine threshold in `[-1, 1]`.
    pub fn new(threshold: f64, embedder: Arc<dyn Embedder>) -> Result<Self, ProbeError> {
        validate_semantic_threshold(threshold)?;
        Ok(Self { threshold, embedder })
    }

    pub fn from_config(config: &SemanticConfig) -> Result<Self, ProbeError> {
        let embedder: Arc<dyn Embedder> = Arc::from(build_embedder(&config.embedding)?);
        Self::new(config.effective_threshold(), embedder)
    }
}

impl ClusteringEngine for SemanticEngine {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn cluster(&self, responses: &[String]) -> Result<Vec<ResponseCluster>, ProbeError> {
        if responses.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed(responses)?;
        if embeddings.len() != responses.len() {
            return Err(ProbeError::InvalidInput(format!(
                "embedder returned {} vectors for {} responses",
                embeddings.len(),
                responses.len()
            )));
        }

        let clusters = seed_sweep(responses.len(), |seed, candidate| {
            // Identical texts have cosine 1 whatever the embedder returns.
            if responses[seed] == responses[candidate] {
                return true;
            }
            let similarity = cosine_similarity(&embeddings[seed], &embeddings[candidate]);
            trace!("cosine({}, {}) = {:.4}", seed, candidate, similarity);
            similarity >= self.threshold
        });
        debug!("Semantic engine formed {} clusters from {} responses", clusters.len(), responses.len());
        Ok(materialize(&clusters, responses))
    }
}
