//! Sentence embedding: trait + backends.
//!
//! The pipeline treats embedding as an opaque capability: a batch of
//! normalized sentences goes in, one fixed-dimension vector per sentence
//! comes out, in input order, with nothing dropped. Two backends:
//!
//! - [`OllamaEmbedder`]: HTTP adapter for an Ollama embedding model.
//! - [`HashedEmbedder`]: deterministic offline bag-of-words embedder built
//!   from seeded per-token random vectors. No model, no network; used by
//!   tests and `--offline` mode.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EmbedError;

/// An order-preserving batch embedding capability.
///
/// Implementations must return exactly one vector per input string, in input
/// order, and must be deterministic for a fixed model version. Inputs may be
/// empty strings (sentences whose normalization removed every token); those
/// still get a vector so indices stay aligned.
pub trait Embedder: Send + Sync {
    /// Embed a batch of normalized sentences.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

// ---------------------------------------------------------------------------
// Ollama HTTP adapter
// ---------------------------------------------------------------------------

/// Configuration for the Ollama embedding client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Embedding model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "nomic-embed-text".into(),
            timeout_secs: 120,
        }
    }
}

/// Embedding client for the Ollama `/api/embed` endpoint.
pub struct OllamaEmbedder {
    config: OllamaConfig,
}

impl OllamaEmbedder {
    /// Create a new embedding client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        Self { config }
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.config.model,
            "input": texts,
        });
        let body_str = serde_json::to_string(&body).map_err(|e| EmbedError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(|e: ureq::Error| EmbedError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| EmbedError::ParseError {
            message: e.to_string(),
        })?;
        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| EmbedError::ParseError {
                message: e.to_string(),
            })?;

        let vectors: Vec<Vec<f32>> = json["embeddings"]
            .as_array()
            .ok_or_else(|| EmbedError::ParseError {
                message: "missing 'embeddings' field".into(),
            })?
            .iter()
            .map(|row| {
                row.as_array()
                    .ok_or_else(|| EmbedError::ParseError {
                        message: "embedding row is not an array".into(),
                    })
                    .map(|vals| {
                        vals.iter()
                            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                            .collect()
                    })
            })
            .collect::<Result<_, _>>()?;

        // The backend contract is one vector per input; anything else would
        // desynchronize ranking indices from the sentence sequence.
        if vectors.len() != texts.len() {
            return Err(EmbedError::LengthMismatch {
                sent: texts.len(),
                received: vectors.len(),
            });
        }
        Ok(vectors)
    }
}

// ---------------------------------------------------------------------------
// Deterministic offline embedder
// ---------------------------------------------------------------------------

/// Offline bag-of-words embedder using seeded per-token random vectors.
///
/// Each token deterministically maps to a dense vector via a `StdRng` seeded
/// from the token's hash, so the same token always yields the same vector.
/// A sentence's embedding is the L2-normalized sum of its token vectors;
/// sentences sharing tokens land near each other, which is all the cluster
/// and ranking stages need. An empty sentence maps to the zero vector.
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    /// Default embedding dimension.
    pub const DEFAULT_DIMENSION: usize = 128;

    /// Create a hashed embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Deterministic dense vector for one token.
    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        (0..self.dimension).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

impl Embedder for HashedEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let vectors = texts
            .iter()
            .map(|text| {
                let mut sum = vec![0.0f32; self.dimension];
                for token in text.split_whitespace() {
                    for (acc, v) in sum.iter_mut().zip(self.token_vector(token)) {
                        *acc += v;
                    }
                }
                let norm: f32 = sum.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for v in &mut sum {
                        *v /= norm;
                    }
                }
                sum
            })
            .collect();
        Ok(vectors)
    }
}
