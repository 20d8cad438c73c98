// semprobe-core/src/experiment.rs
//! The sequential experiment driver.
//!
//! For each query the driver samples `repeat_count` answers one after the
//! other. Each prompt depends on the answers already collected, so the loop
//! is strictly ordered and never parallelized. Once a ResponseSet is
//! complete it is handed to the clustering engine for scoring.
//!
//! A failure while sampling or scoring one query is recorded as a failed
//! outcome for that query only; the remaining queries still run.
//!
//! Every message exchanged for a query is kept as its transcript: the
//! system prompt once, then one user and one assistant turn per iteration.
//! In conversation mode the transcript so far is also what the model sees.
//!
//! License: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use semprobe_entropy::statistics::{compute_stats, ScoreStats};

use crate::config::{ExperimentSettings, ProbeConfig, PromptHistory};
use crate::engine::{ClusteringEngine, InformationEstimate};
use crate::errors::ProbeError;
use crate::gateway::{ChatMessage, ChatModel, ChatRole};
use crate::headless::build_engine;
use crate::prompt::PromptBuilder;

/// A query whose ResponseSet was collected and scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    /// Responses in sampling order.
    pub responses: Vec<String>,
    pub estimate: InformationEstimate,
    /// Calls that failed and were recorded as the error placeholder.
    pub failed_calls: usize,
    /// Hex SHA-256 of the ResponseSet, see [`response_set_digest`].
    pub digest: String,
    /// Messages in the order they were exchanged.
    #[serde(default)]
    pub transcript: Vec<ChatMessage>,
}

/// Fingerprints a ResponseSet so identical sets can be spotted across runs.
/// Responses are hashed in order, each followed by a NUL byte.
pub fn response_set_digest(responses: &[String]) -> String {
    let mut hasher = Sha256::new();
    for response in responses {
        hasher.update(response.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Completed(QueryResult),
    Failed { query: String, error: String },
}

impl QueryOutcome {
    pub fn query(&self) -> &str {
        match self {
            QueryOutcome::Completed(result) => &result.query,
            QueryOutcome::Failed { query, .. } => query,
        }
    }
}

/// Everything produced by one run over a query list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub strategy: String,
    pub threshold: f64,
    pub repeat_count: usize,
    pub outcomes: Vec<QueryOutcome>,
}

impl ExperimentReport {
    pub fn completed(&self) -> impl Iterator<Item = &QueryResult> {
        self.outcomes.iter().filter_map(|o| match o {
            QueryOutcome::Completed(result) => Some(result),
            QueryOutcome::Failed { .. } => None,
        })
    }

    /// `(query, error)` pairs for the queries that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            QueryOutcome::Failed { query, error } => Some((query.as_str(), error.as_str())),
            QueryOutcome::Completed(_) => None,
        })
    }

    /// True when there was at least one query and none completed.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.completed().next().is_none()
    }

    /// Mean and standard deviation of the scores of completed queries.
    pub fn score_stats(&self) -> ScoreStats {
        let scores: Vec<f64> = self.completed().map(|r| r.estimate.score).collect();
        compute_stats(&scores)
    }
}

/// Drives the sample-then-score loop for a list of queries.
pub struct ExperimentRunner {
    model: Box<dyn ChatModel>,
    engine: Box<dyn ClusteringEngine>,
    prompts: PromptBuilder,
    distractors: BTreeMap<String, Vec<String>>,
    settings: ExperimentSettings,
    system_prompt: Option<String>,
}

impl ExperimentRunner {
    pub fn new(
        model: Box<dyn ChatModel>,
        engine: Box<dyn ClusteringEngine>,
        prompts: PromptBuilder,
        distractors: BTreeMap<String, Vec<String>>,
        settings: ExperimentSettings,
    ) -> Result<Self, ProbeError> {
        if settings.repeat_count == 0 {
            return Err(ProbeError::InvalidConfiguration(
                "experiment.repeat_count must be at least 1".to_string(),
            ));
        }
        Ok(Self { model, engine, prompts, distractors, settings, system_prompt: None })
    }

    /// Sends `system_prompt` as a system message ahead of every prompt.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Builds the engine and prompt builder from `config` around `model`.
    pub fn from_config(config: &ProbeConfig, model: Box<dyn ChatModel>) -> Result<Self, ProbeError> {
        config.validate()?;
        let engine = build_engine(&config.clustering)?;
        let prompts = PromptBuilder::from_config(&config.prompt)?;
        Self::new(model, engine, prompts, config.distractors.clone(), config.experiment.clone())
            .map(|runner| runner.with_system_prompt(config.provider.system_prompt.clone()))
    }

    pub fn engine(&self) -> &dyn ClusteringEngine {
        self.engine.as_ref()
    }

    pub fn settings(&self) -> &ExperimentSettings {
        &self.settings
    }

    fn distractors_for(&self, query: &str) -> &[String] {
        self.distractors.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The messages sent for one iteration. Outside conversation mode only
    /// the system message is carried over from the transcript.
    fn messages_for(&self, transcript: &[ChatMessage], prompt: &str) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = match self.prompts.history() {
            PromptHistory::Conversation => transcript.to_vec(),
            PromptHistory::Last | PromptHistory::All => transcript
                .iter()
                .filter(|m| m.role == ChatRole::System)
                .cloned()
                .collect(),
        };
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Samples `repeat_count` responses for `query` in order, then scores them.
    pub fn run_query(&self, query: &str) -> Result<QueryResult, ProbeError> {
        let repeat_count = self.settings.repeat_count;
        let delay = Duration::from_millis(self.settings.request_delay_ms);
        let distractors = self.distractors_for(query);

        let mut responses: Vec<String> = Vec::with_capacity(repeat_count);
        let mut transcript: Vec<ChatMessage> = Vec::with_capacity(2 * repeat_count + 1);
        if let Some(system_prompt) = &self.system_prompt {
            transcript.push(ChatMessage::system(system_prompt.clone()));
        }
        let mut failed_calls = 0;

        for iteration in 0..repeat_count {
            let prompt = self.prompts.build(query, &responses, distractors, iteration)?;
            let messages = self.messages_for(&transcript, &prompt);

            let response = match self.model.chat(&messages) {
                Ok(response) => response,
                Err(e) => match &self.settings.error_placeholder {
                    Some(placeholder) => {
                        warn!("Iteration {} of '{}' failed ({}); recording '{}'", iteration, query, e, placeholder);
                        failed_calls += 1;
                        placeholder.clone()
                    }
                    None => return Err(e),
                },
            };

            debug!("Response {}/{}: {}", iteration + 1, repeat_count, response);
            transcript.push(ChatMessage::user(prompt));
            transcript.push(ChatMessage::assistant(response.clone()));
            responses.push(response);

            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        let estimate = self.engine.estimate(&responses)?;
        info!(
            "'{}': {} clusters, score {:.4}, entropy {:.4}",
            query,
            estimate.cluster_count(),
            estimate.score,
            estimate.entropy
        );

        Ok(QueryResult {
            query: query.to_string(),
            digest: response_set_digest(&responses),
            responses,
            estimate,
            failed_calls,
            transcript,
        })
    }

    /// Runs every query independently and collects the outcomes in order.
    pub fn run(&self, queries: &[String]) -> ExperimentReport {
        self.run_with_progress(queries, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_outcome` with the zero-based
    /// query position as soon as each query finishes.
    pub fn run_with_progress<F>(&self, queries: &[String], mut on_outcome: F) -> ExperimentReport
    where
        F: FnMut(usize, &QueryOutcome),
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting run {} with {} queries ({} engine, threshold {})",
            run_id, queries.len(), self.engine.name(), self.engine.threshold());

        for key in self.distractors.keys() {
            if !queries.iter().any(|q| q == key) {
                warn!("Distractors configured for unknown query: '{}'", key);
            }
        }

        let mut outcomes = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            info!("Query {}/{}: {}", i + 1, queries.len(), query);
            let outcome = match self.run_query(query) {
                Ok(result) => QueryOutcome::Completed(result),
                Err(e) => {
                    error!("Query '{}' failed: {}", query, e);
                    QueryOutcome::Failed { query: query.clone(), error: e.to_string() }
                }
            };
            on_outcome(i, &outcome);
            outcomes.push(outcome);
        }

        let finished_at = Utc::now();
        info!("Run {} finished in {}s", run_id, (finished_at - started_at).num_seconds());

        ExperimentReport {
            run_id,
            started_at,
            finished_at,
            strategy: self.engine.name().to_string(),
            threshold: self.engine.threshold(),
            repeat_count: self.settings.repeat_count,
            outcomes,
        }
    }
}
