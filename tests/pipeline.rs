//! End-to-end pipeline tests.
//!
//! These run the full flow offline: the deterministic hashed embedder stands
//! in for the embedding model and a canned completion stands in for the
//! language model, so the tests exercise every stage boundary without a
//! network.

use std::sync::Arc;

use precis::cluster::{ClusterConfig, select_clusters};
use precis::embed::{Embedder, HashedEmbedder};
use precis::error::{RefineError, SummarizeError};
use precis::refine::{Completion, RefinedSummary};
use precis::sentence;
use precis::summarizer::{Summarizer, SummarizerConfig};

fn summarizer() -> Summarizer {
    Summarizer::new(
        Arc::new(HashedEmbedder::default()),
        SummarizerConfig::default(),
    )
}

/// Completion stub that replies with fixed text, recording nothing.
struct CannedCompletion(&'static str);

impl Completion for CannedCompletion {
    fn complete(&self, _prompt: &str) -> Result<String, RefineError> {
        Ok(self.0.to_string())
    }
}

/// Embedder stub that drops the last vector, violating the length contract.
struct TruncatingEmbedder(HashedEmbedder);

impl Embedder for TruncatingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, precis::error::EmbedError> {
        let mut vectors = self.0.embed(texts)?;
        vectors.pop();
        Ok(vectors)
    }
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn near_duplicates_cluster_apart_from_unrelated_sentence() {
    // Two near-duplicate sentences and one unrelated: the vectors should
    // split into 2 groups with the duplicates together.
    let doc = "The quantum computer factors large numbers quickly. \
               The quantum computer factors large integers rapidly. \
               My grandmother bakes sourdough bread on Sundays.";
    let sentences = sentence::sentences(doc);
    assert_eq!(sentences.len(), 3);

    let normalized: Vec<String> = sentences.iter().map(|s| s.normalized.clone()).collect();
    let vectors = HashedEmbedder::default().embed(&normalized).unwrap();
    let assignment = select_clusters(&vectors, &ClusterConfig::default()).unwrap();

    assert_eq!(assignment.k, 2);
    assert_eq!(assignment.labels[0], assignment.labels[1]);
    assert_ne!(assignment.labels[0], assignment.labels[2]);
}

#[test]
fn full_pipeline_returns_refined_summary() {
    let doc = "Solar panels convert sunlight into electricity using photovoltaic cells. \
               Solar panels turn sunlight into electric power with photovoltaic cells. \
               Wind turbines capture kinetic energy from moving air masses. \
               Hydroelectric dams generate power from falling water. \
               The championship game went into double overtime last night.";
    let client = CannedCompletion(
        r#"Here is the JSON: {"title":"Renewable Energy","summary":"An overview of renewable sources."}"#,
    );
    let summary = summarizer().summarize(doc, &client).unwrap();
    assert_eq!(
        summary,
        RefinedSummary {
            title: "Renewable Energy".into(),
            summary: "An overview of renewable sources.".into(),
        }
    );
}

#[test]
fn draft_sentences_come_from_the_document() {
    let doc = "Compilers translate source code into machine instructions. \
               Interpreters execute source code statement by statement. \
               Linkers combine object files into a single executable. \
               Fresh basil elevates a simple tomato pasta.";
    let draft = summarizer().extractive_draft(doc).unwrap();
    assert!(!draft.is_empty());
    assert!(!draft.contains("  "));
    assert_eq!(draft, draft.trim());
    // Every draft sentence is a verbatim span of the source document.
    for piece in draft.split(". ") {
        let piece = piece.trim_end_matches('.');
        assert!(doc.contains(piece), "draft invented text: {piece}");
    }
}

#[test]
fn pipeline_is_deterministic_end_to_end() {
    let doc = "Bees pollinate flowering crops across the valley. \
               Hives collapse when pesticide exposure rises. \
               Beekeepers monitor colony health through winter. \
               The orchestra tuned their instruments before the concert. \
               Violinists practiced difficult passages backstage.";
    let s = summarizer();
    let a = s.extractive_draft(doc).unwrap();
    let b = s.extractive_draft(doc).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[test]
fn empty_document_fails_with_input_error() {
    let client = CannedCompletion("{}");
    let err = summarizer().summarize("", &client).unwrap_err();
    assert!(matches!(err, SummarizeError::EmptyInput));
}

#[test]
fn reply_without_json_fails_with_refine_error() {
    let doc = "Glaciers carve valleys over millennia. \
               Rivers deposit sediment across floodplains. \
               The stadium roared when the home team scored.";
    let client = CannedCompletion("I'm sorry, I cannot produce a summary.");
    let err = summarizer().summarize(doc, &client).unwrap_err();
    assert!(matches!(
        err,
        SummarizeError::Refine(RefineError::NoJsonObject)
    ));
}

#[test]
fn short_circuiting_embedder_fails_with_length_mismatch() {
    let doc = "Tectonic plates drift a few centimeters per year. \
               Earthquakes release strain along fault lines. \
               Volcanoes form above subduction zones.";
    let s = Summarizer::new(
        Arc::new(TruncatingEmbedder(HashedEmbedder::default())),
        SummarizerConfig::default(),
    );
    let err = s.extractive_draft(doc).unwrap_err();
    assert!(matches!(
        err,
        SummarizeError::Embed(precis::error::EmbedError::LengthMismatch { .. })
    ));
}

#[test]
fn repeated_identical_sentences_fail_as_degenerate() {
    let doc = "The same sentence repeats verbatim here. \
               The same sentence repeats verbatim here. \
               The same sentence repeats verbatim here. \
               The same sentence repeats verbatim here.";
    let err = summarizer().extractive_draft(doc).unwrap_err();
    assert!(matches!(
        err,
        SummarizeError::Cluster(precis::error::ClusterError::Degenerate)
    ));
}
