// semprobe-core/src/embedding.rs
//! Sentence embedding providers for semantic clustering.
//!
//! The semantic engine never loads a model itself. It is handed an
//! [`Embedder`] at construction, so a run can use a remote
//! OpenAI-compatible embeddings endpoint, the offline [`HashingEmbedder`],
//! or a test double returning fixed vectors.
//!
//! License: MIT OR Apache-2.0

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{EmbeddingConfig, EmbeddingProviderKind, DEFAULT_EMBEDDING_DIMENSION};
use crate::errors::ProbeError;

/// Turns texts into fixed-length vectors, one per input, in input order.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProbeError>;
}

/// Deterministic, offline embeddings built by SHA-256 feature hashing.
///
/// Half of the vector holds lower-cased word tokens, the other half holds
/// character trigrams of the normalized text. The result is L2-normalized,
/// so identical texts have cosine similarity `1.0` and texts sharing no
/// token or trigram have `0.0`.
///
/// Text with no alphanumeric token (empty, whitespace, punctuation) gets a
/// single feature hashed from its trimmed raw form, so it never maps to the
/// zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSION)
    }
}

impl HashingEmbedder {
    /// Creates an embedder producing vectors of `dimension` (at least 2).
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(2) }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embeds a single text.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if words.is_empty() {
            let raw = format!("\u{0}{}", text.trim());
            embedding[hash_to_index(&raw, self.dimension)] = 1.0;
            return embedding;
        }

        let word_dim = self.dimension / 2;
        for word in &words {
            embedding[hash_to_index(word, word_dim)] += 1.0;
        }

        let trigram_dim = self.dimension - word_dim;
        let joined: Vec<char> = words.join(" ").chars().collect();
        for window in joined.windows(3) {
            let trigram: String = window.iter().collect();
            embedding[word_dim + hash_to_index(&trigram, trigram_dim)] += 0.5;
        }

        normalize(&mut embedding);
        embedding
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProbeError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Hashes a string to an index in `[0, max_index)`.
fn hash_to_index(input: &str, max_index: usize) -> usize {
    if max_index == 0 {
        return 0;
    }
    let hash_bytes = Sha256::digest(input.as_bytes());
    let hash_val = u32::from_be_bytes([hash_bytes[0], hash_bytes[1], hash_bytes[2], hash_bytes[3]]) as usize;
    hash_val % max_index
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

#[derive(Serialize)]
struct EmbeddingApiRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// Any transport error, non-success status or malformed body is reported as
/// `DependencyUnavailable`. There are no retries.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let auth_value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| ProbeError::InvalidConfiguration("Invalid embedding API key format".to_string()))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ProbeError::DependencyUnavailable(format!("Failed to create embedding HTTP client: {e}")))?;

        Ok(Self { client, url: url.into(), model: model.into() })
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProbeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Requesting {} embeddings from {}", texts.len(), self.url);

        let response = self.client
            .post(&self.url)
            .json(&EmbeddingApiRequest { model: &self.model, input: texts })
            .send()
            .map_err(|e| ProbeError::DependencyUnavailable(format!("embedding service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProbeError::DependencyUnavailable(format!(
                "embedding service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: EmbeddingApiResponse = response
            .json()
            .map_err(|e| ProbeError::DependencyUnavailable(format!("malformed embedding response: {e}")))?;

        let mut data = parsed.data;
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Builds the embedder selected by the configuration.
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>, ProbeError> {
    match config.provider {
        EmbeddingProviderKind::Hashing => {
            let dimension = config.dimension.unwrap_or(DEFAULT_EMBEDDING_DIMENSION);
            debug!("Using hashing embedder with dimension {}", dimension);
            Ok(Box::new(HashingEmbedder::new(dimension)))
        }
        EmbeddingProviderKind::Http => {
            let url = config.api_url.clone().ok_or_else(|| {
                ProbeError::InvalidConfiguration("embedding api_url is required for the http provider".to_string())
            })?;
            let model = config.model.clone().unwrap_or_else(|| "text-embedding-3-small".to_string());
            let api_key = match &config.api_key_env {
                Some(var) => match std::env::var(var) {
                    Ok(key) => Some(key),
                    Err(_) => {
                        warn!("Embedding API key variable '{}' is not set; sending requests without auth", var);
                        None
                    }
                },
                None => None,
            };
            let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(30));
            Ok(Box::new(HttpEmbedder::new(url, model, api_key, timeout)?))
        }
    }
}
