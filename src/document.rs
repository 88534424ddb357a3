//! Document-to-text extraction.
//!
//! Upstream collaborator for the pipeline: turns a file into the plain-text
//! document the summarizer consumes. Plain text and Markdown are read as-is;
//! PDF goes through `pdf-extract`. Anything else is an unsupported file
//! type, reported as a typed error rather than guessed at.

use std::path::Path;

use crate::error::DocumentError;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
}

/// Detect the document format from a file extension.
pub fn detect_format(path: &Path) -> Result<DocumentFormat, DocumentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "txt" | "md" | "text" => Ok(DocumentFormat::PlainText),
        "pdf" => Ok(DocumentFormat::Pdf),
        _ => Err(DocumentError::UnsupportedFormat { extension }),
    }
}

/// Extract plain text from a document file.
///
/// Fails fast on unsupported extensions, unreadable files, parse errors,
/// and documents that yield no text at all.
pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    let format = detect_format(path)?;
    let text = match format {
        DocumentFormat::PlainText => {
            std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
                path: path.display().to_string(),
                source: e,
            })?
        }
        DocumentFormat::Pdf => {
            let data = std::fs::read(path).map_err(|e| DocumentError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            pdf_extract::extract_text_from_mem(&data).map_err(|e| DocumentError::ParseError {
                format: "pdf".into(),
                message: e.to_string(),
            })?
        }
    };

    if text.trim().is_empty() {
        return Err(DocumentError::EmptyDocument {
            path: path.display().to_string(),
        });
    }
    Ok(text)
}
