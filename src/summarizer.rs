//! Summarizer facade: the end-to-end pipeline.
//!
//! Owns the process-wide read-only collaborators (the embedding backend and
//! stage configs) and runs the strictly linear flow per request:
//! normalize → embed → select clusters → rank per cluster → assemble draft
//! → refine. No mutable state is shared between requests, so one
//! `Summarizer` can serve concurrent callers.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cluster::{ClusterConfig, select_clusters};
use crate::draft;
use crate::embed::Embedder;
use crate::error::{EmbedError, SummarizeError, SummarizeResult};
use crate::rank::{RankConfig, rank_cluster, ranked_texts};
use crate::refine::{Completion, RefinedSummary, refine};
use crate::sentence;

/// Configuration for the summarization pipeline.
#[derive(Debug, Clone, Default)]
pub struct SummarizerConfig {
    /// Cluster-count selection settings.
    pub cluster: ClusterConfig,
    /// Centrality ranking settings.
    pub rank: RankConfig,
}

/// The summarization pipeline, constructed once and reused across requests.
pub struct Summarizer {
    embedder: Arc<dyn Embedder>,
    config: SummarizerConfig,
}

impl Summarizer {
    /// Create a summarizer over the given embedding backend.
    pub fn new(embedder: Arc<dyn Embedder>, config: SummarizerConfig) -> Self {
        Self { embedder, config }
    }

    /// Build the extractive draft for a document: cluster its sentences,
    /// rank each cluster by centrality, and assemble the cleaned draft.
    pub fn extractive_draft(&self, text: &str) -> SummarizeResult<String> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let sentences = sentence::sentences(text);
        if sentences.is_empty() {
            return Err(SummarizeError::EmptyInput);
        }
        debug!(count = sentences.len(), "split document into sentences");

        let normalized: Vec<String> =
            sentences.iter().map(|s| s.normalized.clone()).collect();
        let vectors = self.embedder.embed(&normalized)?;
        // Defend the index alignment even against a misbehaving backend.
        if vectors.len() != sentences.len() {
            return Err(EmbedError::LengthMismatch {
                sent: sentences.len(),
                received: vectors.len(),
            }
            .into());
        }

        let assignment = select_clusters(&vectors, &self.config.cluster)?;
        info!(
            sentences = sentences.len(),
            clusters = assignment.k,
            score = assignment.score,
            "clustered document"
        );

        let mut cluster_sentences: Vec<Vec<String>> = Vec::with_capacity(assignment.k);
        for member_indices in assignment.members() {
            let members: Vec<&sentence::Sentence> =
                member_indices.iter().map(|&i| &sentences[i]).collect();
            let member_vectors: Vec<&[f32]> =
                member_indices.iter().map(|&i| vectors[i].as_slice()).collect();
            let ranked = rank_cluster(&member_vectors, &self.config.rank);
            cluster_sentences.push(ranked_texts(&members, &ranked));
        }

        Ok(draft::assemble(&cluster_sentences))
    }

    /// Run the full pipeline: extractive draft, then one abstractive
    /// refinement call, returning the `{title, summary}` artifact.
    pub fn summarize(
        &self,
        text: &str,
        completion: &dyn Completion,
    ) -> SummarizeResult<RefinedSummary> {
        let draft = self.extractive_draft(text)?;
        debug!(draft_len = draft.len(), "assembled extractive draft");
        let summary = refine(completion, &draft)?;
        info!(title = %summary.title, "refinement complete");
        Ok(summary)
    }
}
