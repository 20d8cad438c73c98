//! Configuration management for `semprobe-core`.
//!
//! This module defines the explicit configuration object handed to the
//! experiment driver: model provider settings, experiment parameters, the
//! clustering strategy and its thresholds, the prompt template and the fixed
//! query and distractor sets. It handles YAML (de)serialization and provides
//! utilities for loading, merging, and validating these configs.
//!
//! Only the driver and the engine constructors read this module. The
//! clustering and scoring code receives plain data (responses and a
//! threshold).
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::ProbeError;

/// Default lexical threshold, a percentage on the `[0, 100]` ratio scale.
pub const DEFAULT_LEXICAL_THRESHOLD: f64 = 85.0;
/// Default semantic threshold, a cosine on the `[-1, 1]` scale.
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.7;
pub const DEFAULT_REPEAT_COUNT: usize = 10;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1200;
pub const DEFAULT_DISTRACTOR_ITERATION: usize = 1;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 256;
/// CSV destination used when a configuration does not name one.
pub const DEFAULT_OUTPUT_FILE: &str = "semprobe_mi_estimate.csv";

/// Which clustering engine turns a ResponseSet into clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringStrategy {
    /// Fuzzy edit-distance ratio against each cluster's representative.
    #[default]
    Lexical,
    /// Cosine similarity of sentence embeddings against each cluster's seed.
    Semantic,
    /// Exact string equality.
    Exact,
}

impl ClusteringStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringStrategy::Lexical => "lexical",
            ClusteringStrategy::Semantic => "semantic",
            ClusteringStrategy::Exact => "exact",
        }
    }
}

impl fmt::Display for ClusteringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Full URL of the chat completions endpoint.
    pub api_url: String,
    pub model: String,
    pub temperature: f64,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Sent as a system message ahead of every prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Upper bound on reply length. Omitted from requests when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 1.0,
            api_key_env: "SEMPROBE_API_KEY".to_string(),
            timeout_secs: 60,
            system_prompt: None,
            max_tokens: None,
        }
    }
}

impl ProviderConfig {
    /// Reads the API key from the environment variable named in `api_key_env`.
    pub fn api_key(&self) -> Result<String, ProbeError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ProbeError::InvalidConfiguration(format!(
                "API key not found: set the '{}' environment variable",
                self.api_key_env
            ))),
        }
    }
}

/// Parameters of the sequential query loop.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentSettings {
    /// Number of sequential queries per question (the ResponseSet length).
    pub repeat_count: usize,
    /// Fixed pause after every model call.
    pub request_delay_ms: u64,
    /// Where the CSV report is written.
    pub output_file: Option<PathBuf>,
    /// When set, a failed model call is recorded as this response and the
    /// loop continues. When unset, the failure aborts that query only.
    pub error_placeholder: Option<String>,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            repeat_count: DEFAULT_REPEAT_COUNT,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            output_file: Some(PathBuf::from(DEFAULT_OUTPUT_FILE)),
            error_placeholder: None,
        }
    }
}

/// Settings specific to the lexical engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Percentage in `[0, 100]` (default: 85).
    pub threshold: Option<f64>,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self { threshold: Some(DEFAULT_LEXICAL_THRESHOLD) }
    }
}

impl LexicalConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_LEXICAL_THRESHOLD)
    }
}

/// Where sentence embeddings come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// Local feature hashing; deterministic and offline.
    #[default]
    Hashing,
    /// An OpenAI-compatible `/embeddings` endpoint.
    Http,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    /// Vector size for the hashing provider (default: 256).
    pub dimension: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Hashing,
            api_url: None,
            model: None,
            api_key_env: None,
            dimension: Some(DEFAULT_EMBEDDING_DIMENSION),
            timeout_secs: None,
        }
    }
}

/// Settings specific to the semantic engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Cosine similarity in `[-1, 1]` (default: 0.7).
    pub threshold: Option<f64>,
    pub embedding: EmbeddingConfig,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            threshold: Some(DEFAULT_SEMANTIC_THRESHOLD),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl SemanticConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_SEMANTIC_THRESHOLD)
    }
}

/// Container for the strategy choice and all engine-specific settings.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub strategy: ClusteringStrategy,
    pub lexical: LexicalConfig,
    pub semantic: SemanticConfig,
}

impl ClusteringConfig {
    /// The threshold of the active strategy, on that strategy's own scale.
    /// Exact matching has no threshold and reports `100`.
    pub fn active_threshold(&self) -> f64 {
        match self.strategy {
            ClusteringStrategy::Lexical => self.lexical.effective_threshold(),
            ClusteringStrategy::Semantic => self.semantic.effective_threshold(),
            ClusteringStrategy::Exact => 100.0,
        }
    }

    /// Overrides the threshold of the active strategy.
    pub fn set_active_threshold(&mut self, threshold: f64) {
        match self.strategy {
            ClusteringStrategy::Lexical => self.lexical.threshold = Some(threshold),
            ClusteringStrategy::Semantic => self.semantic.threshold = Some(threshold),
            ClusteringStrategy::Exact => {
                warn!("Exact clustering has no threshold; ignoring {}", threshold);
            }
        }
    }
}

/// Which earlier answers are folded into the next prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptHistory {
    /// Only the most recent response.
    #[default]
    Last,
    /// Every response collected so far for the query.
    All,
    /// No answers in the prompt text. Earlier prompts and answers are sent
    /// as alternating user and assistant turns instead.
    Conversation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// TinyTemplate source. `None` selects the built-in template.
    pub template: Option<String>,
    pub history: PromptHistory,
    /// Zero-based iteration at which distractors are injected.
    pub distractor_iteration: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: None,
            history: PromptHistory::Last,
            distractor_iteration: DEFAULT_DISTRACTOR_ITERATION,
        }
    }
}

/// Represents the top-level configuration structure for semprobe.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub provider: ProviderConfig,
    pub experiment: ExperimentSettings,
    pub clustering: ClusteringConfig,
    pub prompt: PromptConfig,
    /// The fixed questions, processed in order.
    pub queries: Vec<String>,
    /// Planted wrong answers keyed by exact query text. Read-only during a run.
    pub distractors: BTreeMap<String, Vec<String>>,
}

impl ProbeConfig {
    /// Loads a configuration from a YAML file and validates it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ProbeConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!("Loaded {} queries from file {}.", config.queries.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in configuration from the embedded YAML.
    pub fn load_default_config() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let default_yaml = include_str!("../config/default_probe.yaml");
        let config: ProbeConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default configuration")?;

        debug!("Loaded {} default queries.", config.queries.len());
        Ok(config)
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, ProbeError> {
        serde_yml::to_string(self).map_err(|e| ProbeError::SerializationError(e.to_string()))
    }

    /// Checks every range constraint and reports all violations at once.
    ///
    /// Thresholds are rejected, never clamped. In particular a semantic
    /// threshold written on the lexical percentage scale (e.g. `85`) is an
    /// error rather than being silently rescaled.
    pub fn validate(&self) -> Result<(), ProbeError> {
        let mut errors = Vec::new();

        if self.experiment.repeat_count == 0 {
            errors.push("experiment.repeat_count must be at least 1.".to_string());
        }

        if let Err(e) = validate_lexical_threshold(self.clustering.lexical.effective_threshold()) {
            errors.push(e.to_string());
        }
        if let Err(e) = validate_semantic_threshold(self.clustering.semantic.effective_threshold()) {
            errors.push(e.to_string());
        }

        if !self.provider.temperature.is_finite() || self.provider.temperature < 0.0 {
            errors.push(format!(
                "provider.temperature must be a non-negative number, got {}.",
                self.provider.temperature
            ));
        }

        if self.provider.max_tokens == Some(0) {
            errors.push("provider.max_tokens must be greater than 0.".to_string());
        }
        if self.provider.system_prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
            errors.push("provider.system_prompt must not be blank; remove it to send no system message.".to_string());
        }

        let embedding = &self.clustering.semantic.embedding;
        if embedding.provider == EmbeddingProviderKind::Http && embedding.api_url.is_none() {
            errors.push("clustering.semantic.embedding.api_url is required for the http provider.".to_string());
        }
        if embedding.dimension == Some(0) {
            errors.push("clustering.semantic.embedding.dimension must be greater than 0.".to_string());
        }

        if let Some(template) = &self.prompt.template {
            if let Err(e) = crate::prompt::PromptBuilder::check_template(template) {
                errors.push(e.to_string());
            }
        }

        if self.queries.iter().any(|q| q.trim().is_empty()) {
            errors.push("queries must not contain empty strings.".to_string());
        }

        if self.experiment.repeat_count > 0
            && !self.distractors.is_empty()
            && self.prompt.distractor_iteration >= self.experiment.repeat_count
        {
            warn!(
                "prompt.distractor_iteration ({}) is never reached with repeat_count {}; distractors will not be injected.",
                self.prompt.distractor_iteration, self.experiment.repeat_count
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::InvalidConfiguration(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }

    /// Distractor keys that do not match any configured query.
    pub fn orphan_distractors(&self) -> Vec<&str> {
        self.distractors
            .keys()
            .filter(|key| !self.queries.iter().any(|q| q == *key))
            .map(String::as_str)
            .collect()
    }
}

/// Rejects lexical thresholds outside the `[0, 100]` percentage scale.
pub fn validate_lexical_threshold(threshold: f64) -> Result<(), ProbeError> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err(ProbeError::InvalidConfiguration(format!(
            "lexical threshold must be a percentage in [0, 100], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Rejects semantic thresholds outside the `[-1, 1]` cosine scale.
pub fn validate_semantic_threshold(threshold: f64) -> Result<(), ProbeError> {
    if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
        let hint = if threshold > 1.0 && threshold <= 100.0 {
            " (this looks like a lexical percentage; semantic thresholds are cosine similarities)"
        } else {
            ""
        };
        return Err(ProbeError::InvalidConfiguration(format!(
            "semantic threshold must be a cosine similarity in [-1, 1], got {}{}",
            threshold, hint
        )));
    }
    Ok(())
}

/// Overlays a user configuration on the defaults.
///
/// Every section of the user configuration replaces the default section.
/// Sections and fields missing from the user file were already filled by
/// serde with the same values the built-in YAML uses, so an absent section
/// behaves like the built-in one. User queries replace the default queries
/// when non-empty, and in that case only the user's distractors apply.
/// Otherwise distractors are merged per query with the user's entries winning.
pub fn merge_config(default_config: ProbeConfig, user_config: Option<ProbeConfig>) -> ProbeConfig {
    let Some(user_cfg) = user_config else {
        debug!("merge_config called without a user config; using defaults.");
        return default_config;
    };

    debug!(
        "Merging user config ({} queries, {} distractor sets) over defaults ({} queries).",
        user_cfg.queries.len(),
        user_cfg.distractors.len(),
        default_config.queries.len()
    );

    let (queries, distractors) = if user_cfg.queries.is_empty() {
        let mut distractors = default_config.distractors;
        for (query, answers) in user_cfg.distractors {
            distractors.insert(query, answers);
        }
        (default_config.queries, distractors)
    } else {
        (user_cfg.queries, user_cfg.distractors)
    };

    ProbeConfig {
        provider: user_cfg.provider,
        experiment: user_cfg.experiment,
        clustering: user_cfg.clustering,
        prompt: user_cfg.prompt,
        queries,
        distractors,
    }
}

/// Locations searched for a named configuration, in priority order.
pub fn config_candidate_paths(name: &str) -> Vec<PathBuf> {
    let base_dirs = vec![
        dirs::home_dir().map(|p| p.join(".semprobe")),
        dirs::config_dir().map(|p| p.join("semprobe")),
        Some(PathBuf::from("./config")),
    ];

    base_dirs.into_iter()
        .flatten()
        .map(|dir| dir.join(format!("{}.yaml", name)))
        .collect()
}

/// Loads a configuration given either a file path or a bare name looked up
/// in [`config_candidate_paths`].
pub fn load_config_by_name(name_or_path: &str) -> Result<ProbeConfig> {
    debug!("Attempting to load configuration from: '{}'", name_or_path);

    let path = Path::new(name_or_path);
    let path_to_load = if path.is_file() {
        path.to_path_buf()
    } else {
        config_candidate_paths(name_or_path)
            .into_iter()
            .find(|p| p.exists())
            .with_context(|| format!(
                "Configuration '{}' not found. It is not a valid file path, and was not found in expected locations.",
                name_or_path
            ))?
    };

    ProbeConfig::load_from_file(path_to_load)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProbeConfig::load_default_config().unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.queries.len(), 8);
        assert_eq!(config.experiment.repeat_count, 10);
        assert_eq!(config.clustering.strategy, ClusteringStrategy::Lexical);
        assert_eq!(config.clustering.active_threshold(), 85.0);
        assert!(config.orphan_distractors().is_empty());
    }

    #[test]
    fn test_semantic_percentage_threshold_is_rejected() {
        let err = validate_semantic_threshold(85.0).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("lexical percentage"));
    }

    #[test]
    fn test_threshold_ranges() {
        assert!(validate_lexical_threshold(0.0).is_ok());
        assert!(validate_lexical_threshold(100.0).is_ok());
        assert!(validate_lexical_threshold(-1.0).is_err());
        assert!(validate_lexical_threshold(100.5).is_err());
        assert!(validate_lexical_threshold(f64::NAN).is_err());
        assert!(validate_semantic_threshold(-1.0).is_ok());
        assert!(validate_semantic_threshold(1.0).is_ok());
        assert!(validate_semantic_threshold(-1.5).is_err());
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut config = ProbeConfig::default();
        config.experiment.repeat_count = 0;
        config.clustering.lexical.threshold = Some(150.0);
        config.clustering.semantic.threshold = Some(85.0);

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("repeat_count"));
        assert!(message.contains("lexical threshold"));
        assert!(message.contains("semantic threshold"));
    }

    #[test]
    fn test_set_active_threshold_targets_the_strategy() {
        let mut clustering = ClusteringConfig::default();
        clustering.set_active_threshold(60.0);
        assert_eq!(clustering.lexical.threshold, Some(60.0));

        clustering.strategy = ClusteringStrategy::Semantic;
        clustering.set_active_threshold(0.9);
        assert_eq!(clustering.semantic.threshold, Some(0.9));
        assert_eq!(clustering.active_threshold(), 0.9);
    }

    #[test]
    fn test_orphan_distractors() {
        let mut config = ProbeConfig::default();
        config.queries = vec!["Q1".to_string()];
        config.distractors.insert("Q1".to_string(), vec!["x".to_string()]);
        config.distractors.insert("Q2".to_string(), vec!["y".to_string()]);
        assert_eq!(config.orphan_distractors(), vec!["Q2"]);
    }
}
