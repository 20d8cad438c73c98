// semprobe-core/src/headless.rs
//! `headless.rs`
//! Convenience wrappers for using the clustering engines without the
//! experiment driver. Provides helpers for a full, one-shot estimate over an
//! already collected ResponseSet.

use log::debug;

use crate::config::{ClusteringConfig, ClusteringStrategy};
use crate::engine::{ClusteringEngine, InformationEstimate};
use crate::engines::exact_engine::ExactEngine;
use crate::engines::lexical_engine::LexicalEngine;
use crate::engines::semantic_engine::SemanticEngine;
use crate::errors::ProbeError;

/// Instantiates the engine selected by `config.strategy` behind the
/// `ClusteringEngine` trait.
pub fn build_engine(config: &ClusteringConfig) -> Result<Box<dyn ClusteringEngine>, ProbeError> {
    let engine: Box<dyn ClusteringEngine> = match config.strategy {
        ClusteringStrategy::Lexical => Box::new(LexicalEngine::from_config(&config.lexical)?),
        ClusteringStrategy::Semantic => Box::new(SemanticEngine::from_config(&config.semantic)?),
        ClusteringStrategy::Exact => Box::new(ExactEngine::new()),
    };
    debug!("Built {} engine (threshold {})", engine.name(), engine.threshold());
    Ok(engine)
}

/// Clusters and scores `responses` in one call.
pub fn headless_estimate(
    config: &ClusteringConfig,
    responses: &[String],
) -> Result<InformationEstimate, ProbeError> {
    build_engine(config)?.estimate(responses)
}

/// Splits raw text into responses.
///
/// With no delimiter, every non-blank line is one response. With a
/// delimiter, the text is split on it (the `AllResponses` column of the CSV
/// report uses `|`). Responses are trimmed and blanks dropped.
pub fn split_responses(text: &str, delimiter: Option<&str>) -> Vec<String> {
    let pieces: Box<dyn Iterator<Item = &str>> = match delimiter {
        Some(d) if !d.is_empty() => Box::new(text.split(d)),
        _ => Box::new(text.lines()),
    };
    pieces
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
