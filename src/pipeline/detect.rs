//! Format detection: classify an upload by declared content-type and
//! filename extension.
//!
//! Detection deliberately does **not** sniff the byte stream. The two
//! declared signals are corroborating: an explicit content-type match wins,
//! the filename extension is the fallback, and anything else is rejected
//! before a single byte is parsed. Content sniffing would let a mislabelled
//! blob reach a format parser that was never meant for it; rejecting early
//! keeps the extraction stage's preconditions simple.

use crate::error::Doc2QuizError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The three supported document formats.
///
/// A tagged variant rather than a trait hierarchy: each format dispatches
/// to one pure extraction function in [`crate::pipeline::extract`], which
/// keeps format-specific logic isolated and independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::PlainText => "plain text",
        };
        f.write_str(s)
    }
}

/// MIME type of a DOCX main document.
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Classify an upload into a [`DocumentFormat`].
///
/// Precedence: explicit content-type match first, filename-extension
/// fallback second. Comparison is case-insensitive and ignores MIME
/// parameters (`text/plain; charset=utf-8` matches `text/plain`).
///
/// # Errors
/// [`Doc2QuizError::UnsupportedFormat`] when neither signal matches a
/// known pattern.
pub fn detect(content_type: &str, filename: &str) -> Result<DocumentFormat, Doc2QuizError> {
    if let Some(format) = match_content_type(content_type) {
        debug!("Detected {} from content-type '{}'", format, content_type);
        return Ok(format);
    }

    if let Some(format) = match_extension(filename) {
        debug!("Detected {} from filename '{}'", format, filename);
        return Ok(format);
    }

    Err(Doc2QuizError::UnsupportedFormat {
        content_type: content_type.to_string(),
        filename: filename.to_string(),
    })
}

/// Match the declared content-type, ignoring case and parameters.
fn match_content_type(content_type: &str) -> Option<DocumentFormat> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/pdf" => Some(DocumentFormat::Pdf),
        DOCX_MIME => Some(DocumentFormat::Docx),
        "text/plain" => Some(DocumentFormat::PlainText),
        _ => None,
    }
}

/// Match the filename extension, ignoring case.
fn match_extension(filename: &str) -> Option<DocumentFormat> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(DocumentFormat::Pdf),
        "docx" => Some(DocumentFormat::Docx),
        "txt" | "text" => Some(DocumentFormat::PlainText),
        _ => None,
    }
}
