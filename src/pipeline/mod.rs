//! Pipeline stages for document-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different model backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ detect ──▶ extract ──▶ prompt ──▶ llm ──▶ parse
//! (upload)  (format)   (text)    (excerpt)  (model)  (quiz)
//! ```
//!
//! 1. [`input`]   — the uploaded document and its scoped backing storage
//! 2. [`detect`]  — classify the blob by content-type, then extension
//! 3. [`extract`] — format-specific text extraction; runs under
//!    `spawn_blocking` because PDF/DOCX decoding is CPU-bound
//! 4. [`llm`]     — drive the single model call; the only stage with
//!    network I/O
//! 5. [`parse`]   — strict shape validation of the model's raw output
//!
//! Prompt construction sits in [`crate::prompts`] rather than here so the
//! instruction text can change without touching any stage logic.

pub mod detect;
pub mod extract;
pub mod input;
pub mod llm;
pub mod parse;
