//! Rich diagnostic error types for the précis pipeline.
//!
//! Each pipeline stage defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so callers can tell apart
//! input errors, embedding failures, clustering failures, and refinement
//! failures and decide retry vs. user-facing reporting.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for a summarization request.
///
/// Each variant wraps a stage-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller. Every failure mode
/// is distinguishable by kind; no stage substitutes a default summary.
#[derive(Debug, Error, Diagnostic)]
pub enum SummarizeError {
    #[error("document is empty or contains only whitespace")]
    #[diagnostic(
        code(precis::input::empty),
        help("Provide a document with at least one sentence of text.")
    )]
    EmptyInput,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Refine(#[from] RefineError),
}

/// Convenience alias for pipeline results.
pub type SummarizeResult<T> = Result<T, SummarizeError>;

// ---------------------------------------------------------------------------
// Document extraction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error("I/O error reading {path}: {source}")]
    #[diagnostic(
        code(precis::document::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {extension}")]
    #[diagnostic(
        code(precis::document::unsupported),
        help("Supported formats are plain text (.txt, .md) and PDF (.pdf).")
    )]
    UnsupportedFormat { extension: String },

    #[error("failed to parse {format} document: {message}")]
    #[diagnostic(
        code(precis::document::parse),
        help("The file may be corrupt, encrypted, or not the format its extension claims.")
    )]
    ParseError { format: String, message: String },

    #[error("document {path} produced no text")]
    #[diagnostic(
        code(precis::document::empty),
        help("Scanned-image PDFs carry no extractable text; run OCR first.")
    )]
    EmptyDocument { path: String },
}

// ---------------------------------------------------------------------------
// Embedding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EmbedError {
    #[error("embedding request failed: {message}")]
    #[diagnostic(
        code(precis::embed::request_failed),
        help("Check that the embedding server is running and the model is pulled.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse embedding response: {message}")]
    #[diagnostic(
        code(precis::embed::parse_error),
        help("The embedding server returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("embedding count mismatch: sent {sent} sentences, got {received} vectors")]
    #[diagnostic(
        code(precis::embed::length_mismatch),
        help(
            "The embedding backend must return exactly one vector per input, \
             in input order. A mismatch means the ranking indices would no \
             longer line up with the original sentences, so the request is \
             aborted rather than degraded."
        )
    )]
    LengthMismatch { sent: usize, received: usize },
}

// ---------------------------------------------------------------------------
// Clustering errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClusterError {
    #[error("no sentence vectors to cluster")]
    #[diagnostic(
        code(precis::cluster::no_input),
        help("The normalizer produced zero sentences; the document may be empty.")
    )]
    NoInput,

    #[error("clustering is degenerate: every candidate K collapsed to a single cluster")]
    #[diagnostic(
        code(precis::cluster::degenerate),
        help(
            "All sentence vectors are (near-)identical, so no candidate \
             partition could be quality-scored. This usually means the \
             document repeats one sentence."
        )
    )]
    Degenerate,

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(precis::cluster::dim_mismatch),
        help("All sentence vectors must come from the same embedding model.")
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Refinement errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RefineError {
    #[error("completion request failed: {message}")]
    #[diagnostic(
        code(precis::refine::request_failed),
        help("Check the completion endpoint URL, API key, and network connectivity.")
    )]
    RequestFailed { message: String },

    #[error("completion response carried no message content")]
    #[diagnostic(
        code(precis::refine::empty_reply),
        help("The completion service replied without a `choices[0].message.content` field.")
    )]
    EmptyReply,

    #[error("no JSON object found in completion reply")]
    #[diagnostic(
        code(precis::refine::no_json),
        help(
            "The model was instructed to return a JSON object with `title` \
             and `summary` keys but its reply contains no opening brace. \
             Retry policy belongs to the caller; nothing is retried here."
        )
    )]
    NoJsonObject,

    #[error("failed to parse JSON object in completion reply: {message}")]
    #[diagnostic(
        code(precis::refine::bad_json),
        help("The extracted span was not valid JSON or lacked the expected keys.")
    )]
    BadJson { message: String },
}
