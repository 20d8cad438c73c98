// semprobe-core/src/lib.rs
//! # Semprobe Core Library
//!
//! `semprobe-core` measures how consistently a language model answers the
//! same question. It samples a ResponseSet of answers per query, groups
//! equivalent answers into clusters and summarizes the cluster-size
//! distribution as a single information score.
//!
//! ## Modules
//!
//! * `config`: The explicit `ProbeConfig` (provider, experiment, clustering, prompt, queries).
//! * `engine`: Defines the `ClusteringEngine` trait and the estimate it produces.
//! * `engines`: Concrete engines: lexical (edit-distance ratio), semantic (embedding cosine) and exact.
//! * `embedding`: The `Embedder` capability injected into the semantic engine.
//! * `gateway`: The `ChatModel` capability and an OpenAI-compatible HTTP client.
//! * `prompt`: Renders the per-iteration prompt with distractors and earlier answers.
//! * `experiment`: The sequential sample-then-score driver.
//! * `report`: CSV and JSON writers for experiment reports.
//! * `headless`: Convenience wrappers for one-shot scoring of collected responses.
//! * `errors`: The `ProbeError` enum.
//!
//! ## Usage Example
//!
//! ```rust
//! use semprobe_core::{headless_estimate, ClusteringConfig};
//!
//! let responses: Vec<String> = ["London.", "London.", "Paris is the capital."]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! // Lexical clustering at the default 85% threshold.
//! let estimate = headless_estimate(&ClusteringConfig::default(), &responses).unwrap();
//! assert_eq!(estimate.cluster_sizes, vec![2, 1]);
//! assert!(estimate.score > 0.0);
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`ProbeError`]. Loading configuration files
//! returns `anyhow::Result` with file context attached.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod embedding;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod experiment;
pub mod gateway;
pub mod headless;
pub mod prompt;
pub mod report;

/// Re-exports the configuration types and helpers.
pub use config::{
    config_candidate_paths,
    load_config_by_name,
    merge_config,
    ClusteringConfig,
    ClusteringStrategy,
    EmbeddingConfig,
    EmbeddingProviderKind,
    ExperimentSettings,
    LexicalConfig,
    ProbeConfig,
    PromptConfig,
    PromptHistory,
    ProviderConfig,
    SemanticConfig,
};

pub use errors::ProbeError;

pub use engine::{ClusteringEngine, InformationEstimate, ResponseCluster};
pub use engines::exact_engine::ExactEngine;
pub use engines::lexical_engine::LexicalEngine;
pub use engines::semantic_engine::SemanticEngine;

pub use embedding::{build_embedder, Embedder, HashingEmbedder, HttpEmbedder};
pub use gateway::{ChatCompletionsClient, ChatMessage, ChatModel, ChatRole};
pub use prompt::{PromptBuilder, DEFAULT_TEMPLATE};

pub use experiment::{ExperimentReport, ExperimentRunner, QueryOutcome, QueryResult};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{build_engine, headless_estimate, split_responses};

/// The score type produced by the estimator.
pub use semprobe_entropy::InformationScore;
