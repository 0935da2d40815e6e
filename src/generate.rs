//! Pipeline orchestration: one run per uploaded document.
//!
//! ## Shape of a run
//!
//! The orchestrator is an explicit state machine rather than nested
//! branching: a run walks the linear transition table
//! `Received → Detected → Extracted → PromptBuilt → ModelInvoked → Parsed
//! → Completed`, and any failure absorbs it immediately — no step is ever
//! retried here. The error returned to the caller names the stage that
//! could not be completed (see [`crate::error::Doc2QuizError::stage`]).
//!
//! ## Resource guarantee
//!
//! `run` *consumes* the [`UploadedDocument`], so the document's bytes and
//! any backing temporary file are released when the run returns — success,
//! failure, or panic. There is no cleanup code to forget; ownership is the
//! mechanism.
//!
//! Runs are independent: nothing is shared between concurrent runs except
//! the read-only config and a stateless model client.

use crate::config::QuizConfig;
use crate::error::{Doc2QuizError, Stage};
use crate::output::{GenerationOutput, QuizMetadata, RunStats};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::llm::{GeminiClient, QuizModel};
use crate::pipeline::{detect, extract, parse};
use crate::prompts;
use crate::store::QuizStore;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Generate a quiz from an uploaded document.
///
/// This is the primary entry point for the library. It builds the
/// production [`GeminiClient`] from the config and runs the pipeline with
/// a fresh (never-cancelled) cancellation token.
///
/// # Errors
/// Any [`Doc2QuizError`]; the failing stage is available via
/// [`Doc2QuizError::stage`]. The document's backing storage is released
/// in every case.
pub async fn generate(
    doc: UploadedDocument,
    config: &QuizConfig,
) -> Result<GenerationOutput, Doc2QuizError> {
    let model = GeminiClient::from_config(config)?;
    generate_with_model(doc, &model, config, &CancellationToken::new()).await
}

/// Generate a quiz using a caller-supplied model client.
///
/// The seam for tests (substitute a deterministic stub) and for callers
/// that need to share one client across runs or propagate cancellation
/// (e.g. client disconnect aborts the in-flight model call).
pub async fn generate_with_model(
    doc: UploadedDocument,
    model: &dyn QuizModel,
    config: &QuizConfig,
    cancel: &CancellationToken,
) -> Result<GenerationOutput, Doc2QuizError> {
    run(doc, model, config, cancel).await
}

/// Read a document from disk and generate a quiz from it.
///
/// Content-type is inferred from the file extension.
pub async fn generate_from_path(
    path: impl AsRef<Path>,
    config: &QuizConfig,
) -> Result<GenerationOutput, Doc2QuizError> {
    let doc = UploadedDocument::from_path(path).await?;
    generate(doc, config).await
}

/// Generate a quiz and hand it to the persistence collaborator.
///
/// The store merges the quiz with the caller-supplied metadata in a single
/// write and returns the assigned identifier. The core never reads the
/// persisted record back.
pub async fn generate_and_store(
    doc: UploadedDocument,
    metadata: QuizMetadata,
    store: &dyn QuizStore,
    config: &QuizConfig,
) -> Result<String, Doc2QuizError> {
    let model = GeminiClient::from_config(config)?;
    generate_and_store_with_model(
        doc,
        metadata,
        store,
        &model,
        config,
        &CancellationToken::new(),
    )
    .await
}

/// [`generate_and_store`] with a caller-supplied model client.
pub async fn generate_and_store_with_model(
    doc: UploadedDocument,
    metadata: QuizMetadata,
    store: &dyn QuizStore,
    model: &dyn QuizModel,
    config: &QuizConfig,
    cancel: &CancellationToken,
) -> Result<String, Doc2QuizError> {
    let output = generate_with_model(doc, model, config, cancel).await?;
    let id = store.save(&output.quiz, &metadata).await?;
    info!("Quiz persisted with id {}", id);
    Ok(id)
}

/// Drive one document through the pipeline.
async fn run(
    doc: UploadedDocument,
    model: &dyn QuizModel,
    config: &QuizConfig,
    cancel: &CancellationToken,
) -> Result<GenerationOutput, Doc2QuizError> {
    let total_start = Instant::now();
    let mut stage = Stage::Received;
    info!(
        "Starting quiz generation: '{}' ({} bytes, {})",
        doc.filename(),
        doc.bytes().len(),
        doc.content_type()
    );

    // ── Step 1: Detect format ────────────────────────────────────────────
    let format = detect::detect(doc.content_type(), doc.filename())?;
    stage = advance(stage);

    // ── Step 2: Extract text ─────────────────────────────────────────────
    // PDF/DOCX decoding is CPU-bound; run it off the async executor. The
    // document travels into the blocking task and back so its backing
    // guard stays alive for the whole run.
    let extract_start = Instant::now();
    let (doc, extracted) = tokio::task::spawn_blocking(move || {
        let result = extract::extract(doc.bytes(), format);
        (doc, result)
    })
    .await
    .map_err(|e| Doc2QuizError::Internal(format!("extraction task: {e}")))?;
    let extracted = extracted?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    if extracted.text.trim().is_empty() {
        return Err(Doc2QuizError::Extraction {
            format,
            detail: "document contains no extractable text".to_string(),
        });
    }
    stage = advance(stage);

    // ── Step 3: Build prompt ─────────────────────────────────────────────
    let prompt = prompts::build_quiz_prompt(&extracted.text, config);
    stage = advance(stage);

    // ── Step 4: Call the model ───────────────────────────────────────────
    let model_start = Instant::now();
    let response = model.generate(&prompt, cancel).await?;
    let model_duration_ms = model_start.elapsed().as_millis() as u64;
    stage = advance(stage);

    // ── Step 5: Parse and validate ───────────────────────────────────────
    let quiz = parse::parse_quiz(&response, config)?;
    stage = advance(stage);

    // ── Step 6: Assemble output ──────────────────────────────────────────
    let stats = RunStats {
        source_format: format,
        extracted_chars: extracted.text.chars().count(),
        excerpt_chars: prompt.excerpt_chars(),
        response_chars: response.text.chars().count(),
        extract_duration_ms,
        model_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    stage = advance(stage);
    debug_assert_eq!(stage, Stage::Completed);

    info!(
        "Quiz generated: {} questions in {}ms",
        quiz.len(),
        stats.total_duration_ms
    );

    // `doc` (and its backing guard) drops here, on this and every earlier
    // exit path alike.
    drop(doc);

    Ok(GenerationOutput { quiz, stats })
}

/// Advance the stage machine, logging the transition.
fn advance(stage: Stage) -> Stage {
    let next = stage.next();
    debug!("Pipeline stage: {} → {}", stage, next);
    next
}
