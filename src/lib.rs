//! # précis
//!
//! Extractive-then-abstractive text summarization: cluster a document's
//! sentences by embedding similarity, pick the most central sentences of
//! each cluster with weighted PageRank, then hand the extractive draft to a
//! language model for a final rewrite returned as `{title, summary}`.
//!
//! ## Pipeline
//!
//! - **Normalizer** (`sentence`): boundary-aware splitting + stop-word stripping
//! - **Embedder** (`embed`): pluggable batch embedding (Ollama HTTP or offline hashed)
//! - **Cluster selector** (`cluster`): seeded k-means + silhouette-scored K search
//! - **Ranker** (`rank`): cosine-similarity graph + weighted PageRank centrality
//! - **Assembler** (`draft`): draft assembly + encoding-artifact cleanup
//! - **Refinement** (`refine`): one completion call + resilient JSON extraction
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use precis::embed::HashedEmbedder;
//! use precis::refine::{CompletionConfig, OpenAiCompatClient};
//! use precis::summarizer::{Summarizer, SummarizerConfig};
//!
//! let summarizer = Summarizer::new(
//!     Arc::new(HashedEmbedder::default()),
//!     SummarizerConfig::default(),
//! );
//! let client = OpenAiCompatClient::new(CompletionConfig::default());
//! let summary = summarizer.summarize("Some long document text...", &client).unwrap();
//! println!("{}: {}", summary.title, summary.summary);
//! ```

pub mod cluster;
pub mod document;
pub mod draft;
pub mod embed;
pub mod error;
pub mod rank;
pub mod refine;
pub mod sentence;
pub mod summarizer;
