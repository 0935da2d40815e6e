//! Text extraction: produce plain UTF-8 text from a classified document.
//!
//! One contract, three pure functions. [`extract`] dispatches on the
//! [`DocumentFormat`] tag decided by the detection stage; an unknown format
//! can never reach this module. Each function takes the raw bytes and
//! returns linear text:
//!
//! * **PDF** — parse the binary object structure with `lopdf`, walk the
//!   page tree in document order, join each page's text runs with single
//!   spaces and pages with a newline, percent-decoding URI-escaped runs.
//! * **DOCX** — open the zip package and pull the raw text of
//!   `word/document.xml` only; no headers, footers, or embedded objects.
//! * **Plain text** — strict UTF-8 decode of the bytes.
//!
//! Extraction never touches the source bytes and performs no I/O beyond
//! the in-memory parse; cleanup of any backing storage belongs to the
//! document's owner.

use crate::error::Doc2QuizError;
use crate::pipeline::detect::DocumentFormat;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::Read;
use tracing::debug;

/// Text extracted from one document. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Linearised document text.
    pub text: String,
    /// The format it came from.
    pub format: DocumentFormat,
}

/// Extract text from `bytes` according to the detected `format`.
///
/// # Errors
/// [`Doc2QuizError::Extraction`] tagged with the failing format and the
/// underlying parser's message.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<ExtractedText, Doc2QuizError> {
    let text = match format {
        DocumentFormat::Pdf => extract_pdf(bytes)?,
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::PlainText => extract_plain_text(bytes)?,
    };
    debug!("Extracted {} chars from {} document", text.chars().count(), format);
    Ok(ExtractedText { text, format })
}

// ── PDF ──────────────────────────────────────────────────────────────────

fn pdf_error(e: impl std::fmt::Display) -> Doc2QuizError {
    Doc2QuizError::Extraction {
        format: DocumentFormat::Pdf,
        detail: e.to_string(),
    }
}

/// Decode the PDF object structure and linearise the page text.
///
/// Pages come back from `lopdf` in document order; within a page the
/// extracted runs are normalised to single spaces, and pages are joined
/// with a newline so downstream truncation keeps whole early pages.
fn extract_pdf(bytes: &[u8]) -> Result<String, Doc2QuizError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(pdf_error)?;

    let pages = doc.get_pages();
    let mut out = String::new();
    for (i, (&page_no, _)) in pages.iter().enumerate() {
        let page_text = doc.extract_text(&[page_no]).map_err(pdf_error)?;
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&normalise_page_runs(&page_text));
    }
    Ok(out)
}

/// A whitespace-delimited token made only of literal characters and valid
/// `%XX` escapes, with at least one escape present. Only such tokens are
/// percent-decoded, so ordinary text containing `%` ("50% of cases") is
/// never corrupted.
static RE_URI_ESCAPED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[^%\s]|%[0-9A-Fa-f]{2})*$").unwrap());

/// Join a page's text runs with single spaces, decoding URI-escaped runs.
fn normalise_page_runs(page_text: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for token in page_text.split_whitespace() {
        if token.contains('%') && RE_URI_ESCAPED_TOKEN.is_match(token) {
            tokens.push(percent_decode(token));
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens.join(" ")
}

/// Decode `%XX` escapes in a token already validated by
/// [`RE_URI_ESCAPED_TOKEN`]. Non-UTF-8 decoded bytes fall back lossily.
fn percent_decode(token: &str) -> String {
    let src = token.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'%' && i + 2 < src.len() {
            let hex = &token[i + 1..i + 3];
            // Validated by the regex; parse cannot fail here.
            if let Ok(b) = u8::from_str_radix(hex, 16) {
                bytes.push(b);
                i += 3;
                continue;
            }
        }
        bytes.push(src[i]);
        i += 1;
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

// ── DOCX ─────────────────────────────────────────────────────────────────

fn docx_error(e: impl std::fmt::Display) -> Doc2QuizError {
    Doc2QuizError::Extraction {
        format: DocumentFormat::Docx,
        detail: e.to_string(),
    }
}

/// Pull the raw text of the main document part out of the DOCX package.
///
/// Only `word/document.xml` is read: text lives in `<w:t>` runs, paragraphs
/// end with a newline, and tabs/breaks become a space. Formatting,
/// headers/footers, and embedded objects are deliberately ignored.
fn extract_docx(bytes: &[u8]) -> Result<String, Doc2QuizError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor).map_err(docx_error)?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(docx_error)?
        .read_to_string(&mut xml)
        .map_err(docx_error)?;

    let mut reader = Reader::from_str(&xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().map_err(docx_error)? {
            Event::Start(ref e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(ref e) if e.name().as_ref() == b"w:t" => in_text_run = false,
            Event::Text(ref t) if in_text_run => {
                out.push_str(&t.unescape().map_err(docx_error)?);
            }
            Event::End(ref e) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Event::Empty(ref e) if matches!(e.name().as_ref(), b"w:tab" | b"w:br") => {
                out.push(' ');
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

// ── Plain text ───────────────────────────────────────────────────────────

/// Strict UTF-8 decode. Invalid encoding is an extraction failure, not a
/// lossy best effort: a quiz generated from mojibake helps nobody.
fn extract_plain_text(bytes: &[u8]) -> Result<String, Doc2QuizError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Doc2QuizError::Extraction {
        format: DocumentFormat::PlainText,
        detail: e.to_string(),
    })
}
