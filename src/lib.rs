//! # doc2quiz
//!
//! Generate multiple-choice quizzes from uploaded documents using a
//! generative-AI model.
//!
//! ## Why this crate?
//!
//! Turning course material into assessment questions by hand is slow and
//! repetitive. This crate takes a document (PDF, DOCX, or plain text),
//! extracts its text, asks a generative model for a fixed number of
//! multiple-choice questions under a constrained prompt, and validates the
//! model's output into a well-shaped quiz — rejecting anything with the
//! wrong question count, wrong option count, or ambiguous answer key.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document
//!  │
//!  ├─ 1. Detect   classify by content-type, then filename extension
//!  ├─ 2. Extract  PDF (lopdf) / DOCX (zip+xml) / UTF-8 text
//!  ├─ 3. Prompt   fixed instruction + bounded source excerpt
//!  ├─ 4. Model    one generateContent call (timeout + cancellation)
//!  ├─ 5. Parse    strict shape validation → Quiz
//!  └─ 6. Output   return to caller, or persist via a QuizStore
//! ```
//!
//! Each run is independent and stateless; concurrent runs share only the
//! read-only configuration and a stateless HTTP client. A failure at any
//! stage aborts that run — and only that run — with an error naming the
//! failing stage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2quiz::{generate_from_path, QuizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential auto-detected from GEMINI_API_KEY
//!     let config = QuizConfig::default();
//!     let output = generate_from_path("lecture_notes.pdf", &config).await?;
//!     for (i, q) in output.quiz.questions.iter().enumerate() {
//!         println!("{}. {}", i + 1, q.question);
//!     }
//!     eprintln!("generated in {}ms", output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a model
//!
//! The model sits behind the [`QuizModel`] trait; pass a stub to
//! [`generate_with_model`] and the rest of the pipeline runs unchanged.
//! See `tests/pipeline.rs` for the pattern.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2quiz` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2quiz = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{QuizConfig, QuizConfigBuilder};
pub use error::{Doc2QuizError, GenerationError, ParseError, Stage};
pub use generate::{
    generate, generate_and_store, generate_and_store_with_model, generate_from_path,
    generate_with_model,
};
pub use output::{GenerationOutput, Question, Quiz, QuizMetadata, RunStats};
pub use pipeline::detect::DocumentFormat;
pub use pipeline::input::UploadedDocument;
pub use pipeline::llm::{GeminiClient, QuizModel, RawModelResponse};
pub use prompts::QuizPrompt;
pub use store::{InMemoryStore, QuizStore};
