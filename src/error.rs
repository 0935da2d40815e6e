//! Error types for the doc2quiz library.
//!
//! Three layers reflect the three places a run can go wrong:
//!
//! * [`Doc2QuizError`] — the single caller-visible error returned by the
//!   top-level `generate*` functions. Every variant maps to the pipeline
//!   [`Stage`] that could not be completed (see [`Doc2QuizError::stage`]),
//!   so callers always know *where* a run died, not just why.
//!
//! * [`GenerationError`] — everything that can go wrong during the one
//!   outbound model call: timeout, non-success status, transport failure,
//!   a response envelope missing the expected fields, or cancellation.
//!
//! * [`ParseError`] — shape violations in the model's textual output.
//!   The parser validates structure only; it never judges whether a quiz
//!   question is factually sensible.
//!
//! A failure is always fatal to its run and never to the process; no
//! variant here is retried internally.

use crate::pipeline::detect::DocumentFormat;
use std::path::PathBuf;
use thiserror::Error;

/// The stages of a pipeline run, in execution order.
///
/// One run walks `Received → Detected → Extracted → PromptBuilt →
/// ModelInvoked → Parsed → Completed`; a failure absorbs the run from
/// whichever transition was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The uploaded document has been received; nothing has run yet.
    Received,
    /// Format detection succeeded.
    Detected,
    /// Text extraction succeeded.
    Extracted,
    /// The instruction prompt has been built.
    PromptBuilt,
    /// The outbound model call returned.
    ModelInvoked,
    /// The model output parsed into a valid quiz.
    Parsed,
    /// The run finished (quiz returned or persisted).
    Completed,
}

impl Stage {
    /// The next stage in the linear transition table.
    ///
    /// `Completed` is terminal and maps to itself.
    pub fn next(self) -> Stage {
        match self {
            Stage::Received => Stage::Detected,
            Stage::Detected => Stage::Extracted,
            Stage::Extracted => Stage::PromptBuilt,
            Stage::PromptBuilt => Stage::ModelInvoked,
            Stage::ModelInvoked => Stage::Parsed,
            Stage::Parsed => Stage::Completed,
            Stage::Completed => Stage::Completed,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Detected => "detected",
            Stage::Extracted => "extracted",
            Stage::PromptBuilt => "prompt_built",
            Stage::ModelInvoked => "model_invoked",
            Stage::Parsed => "parsed",
            Stage::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// All errors returned by the doc2quiz library.
#[derive(Debug, Error)]
pub enum Doc2QuizError {
    // ── Detection errors ──────────────────────────────────────────────────
    /// Neither the declared content-type nor the filename extension matched
    /// a supported format.
    #[error("Unsupported document format: content-type '{content_type}', filename '{filename}'\nSupported formats: PDF, DOCX, plain text.")]
    UnsupportedFormat {
        content_type: String,
        filename: String,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Format-specific extraction failed; `detail` carries the underlying
    /// parser's message.
    #[error("Failed to extract text from {format} document: {detail}")]
    Extraction {
        format: DocumentFormat,
        detail: String,
    },

    // ── Generation errors ─────────────────────────────────────────────────
    /// No API credential was supplied and none was found in the environment.
    #[error("Quiz model is not configured: {hint}")]
    ModelNotConfigured { hint: String },

    /// The outbound model call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    // ── Parse errors ──────────────────────────────────────────────────────
    /// The model's output failed shape validation.
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The persistence collaborator rejected the write.
    #[error("Failed to persist quiz: {detail}")]
    Store { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input document from disk.
    #[error("Failed to read input file '{path}': {detail}")]
    InputRead { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2QuizError {
    /// The pipeline stage this error prevented the run from completing.
    ///
    /// The mapping is total and deterministic, which lets tests check the
    /// orchestrator's failure isolation mechanically: an unsupported `.exe`
    /// upload must report `Stage::Detected`, a model timeout must report
    /// `Stage::ModelInvoked`, and so on.
    pub fn stage(&self) -> Stage {
        match self {
            Doc2QuizError::UnsupportedFormat { .. } => Stage::Detected,
            Doc2QuizError::Extraction { .. } => Stage::Extracted,
            Doc2QuizError::ModelNotConfigured { .. } | Doc2QuizError::Generation(_) => {
                Stage::ModelInvoked
            }
            Doc2QuizError::Parse(_) => Stage::Parsed,
            Doc2QuizError::Store { .. } => Stage::Completed,
            Doc2QuizError::InputRead { .. }
            | Doc2QuizError::InvalidConfig(_)
            | Doc2QuizError::Internal(_) => Stage::Received,
        }
    }
}

/// Failures of the single outbound generation call.
///
/// No variant is retried — retries, if desired, are the caller's
/// responsibility (e.g. re-upload).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The call exceeded the configured timeout.
    #[error("Quiz generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The endpoint answered with a non-success status.
    #[error("Quiz generation failed with HTTP {status}: {detail}")]
    HttpStatus { status: u16, detail: String },

    /// The response body did not expose `candidates[0].content.parts[0].text`.
    #[error("Model response envelope is malformed: {detail}")]
    MalformedEnvelope { detail: String },

    /// The request never completed (connection refused, DNS, TLS, ...).
    #[error("Transport error calling the generation endpoint: {detail}")]
    Transport { detail: String },

    /// The run was cancelled while the call was in flight.
    #[error("Quiz generation was cancelled")]
    Cancelled,
}

/// Shape violations in the model's raw output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text did not decode as a single well-formed quiz payload.
    #[error("Model output is not a well-formed quiz payload: {detail}")]
    Malformed { detail: String },

    /// The payload decoded but held the wrong number of questions.
    #[error("Expected {expected} questions, model returned {actual}")]
    WrongQuestionCount { expected: usize, actual: usize },

    /// A single question violated the option-count or correct-marker rules.
    #[error("Question {index} is invalid: {detail}")]
    InvalidQuestion { index: usize, detail: String },
}
