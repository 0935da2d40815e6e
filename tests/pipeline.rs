//! End-to-end pipeline tests with a stubbed model client.
//!
//! No network and no API key: the model sits behind the `QuizModel` trait,
//! so these tests drive the full detect → extract → prompt → model → parse
//! sequence with deterministic doubles and assert the caller-visible
//! behaviour — including the failing stage of every error and the
//! release-on-every-exit-path guarantee for backing storage.

use async_trait::async_trait;
use doc2quiz::{
    generate_and_store_with_model, generate_with_model, Doc2QuizError, GenerationError,
    InMemoryStore, ParseError, QuizConfig, QuizMetadata, QuizModel, QuizPrompt,
    RawModelResponse, Stage, UploadedDocument,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ── Test doubles ─────────────────────────────────────────────────────────

/// Deterministic model: always returns the same payload, counts calls.
struct StubModel {
    payload: String,
    calls: AtomicUsize,
}

impl StubModel {
    fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizModel for StubModel {
    async fn generate(
        &self,
        _prompt: &QuizPrompt,
        _cancel: &CancellationToken,
    ) -> Result<RawModelResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawModelResponse {
            text: self.payload.clone(),
        })
    }
}

/// Model that always times out.
struct TimeoutModel;

#[async_trait]
impl QuizModel for TimeoutModel {
    async fn generate(
        &self,
        _prompt: &QuizPrompt,
        _cancel: &CancellationToken,
    ) -> Result<RawModelResponse, GenerationError> {
        Err(GenerationError::Timeout { secs: 30 })
    }
}

/// Resource-tracking guard: flips a flag on release.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// A 3-page plain-text document of educational content.
fn three_page_document() -> UploadedDocument {
    let text = "\
Photosynthesis is the process by which green plants convert light energy \
into chemical energy, producing glucose and oxygen from carbon dioxide and water.\n\
\n\
The light-dependent reactions occur in the thylakoid membranes, where \
chlorophyll absorbs photons and drives the synthesis of ATP and NADPH.\n\
\n\
The Calvin cycle uses that ATP and NADPH in the stroma to fix carbon \
dioxide into three-carbon sugars, which the plant assembles into glucose.";
    UploadedDocument::new(text.as_bytes().to_vec(), "text/plain", "photosynthesis.txt")
}

/// A well-formed 5-question payload, as the model should return it.
fn five_question_payload() -> String {
    let questions: Vec<String> = (0..5)
        .map(|i| {
            format!(
                r#"{{"question":"Question {i}?","options":["Option A","Option B","Option C","Option D"],"correctIndex":{}}}"#,
                i % 4
            )
        })
        .collect();
    format!(r#"{{"questions":[{}]}}"#, questions.join(","))
}

fn config() -> QuizConfig {
    QuizConfig::default()
}

// ── Success path ─────────────────────────────────────────────────────────

#[tokio::test]
async fn plain_text_document_yields_five_question_quiz() {
    let model = StubModel::new(five_question_payload());
    let output = generate_with_model(
        three_page_document(),
        &model,
        &config(),
        &CancellationToken::new(),
    )
    .await
    .expect("pipeline should succeed");

    assert_eq!(output.quiz.len(), 5);
    for q in &output.quiz.questions {
        assert_eq!(q.options.len(), 4);
        assert!(q.correct_index < 4, "correct index must be in [0,3]");
    }
    assert_eq!(model.call_count(), 1, "exactly one outbound call per run");
    assert!(output.stats.extracted_chars > 0);
    assert!(output.stats.excerpt_chars <= 4000);
}

#[tokio::test]
async fn identical_runs_produce_identical_quizzes() {
    let model = StubModel::new(five_question_payload());
    let cancel = CancellationToken::new();

    let a = generate_with_model(three_page_document(), &model, &config(), &cancel)
        .await
        .unwrap();
    let b = generate_with_model(three_page_document(), &model, &config(), &cancel)
        .await
        .unwrap();

    assert_eq!(a.quiz, b.quiz, "same document + same response → same quiz");
}

#[tokio::test]
async fn quiz_is_persisted_with_caller_metadata() {
    let model = StubModel::new(five_question_payload());
    let store = InMemoryStore::new();
    let metadata = QuizMetadata {
        title: "Photosynthesis basics".into(),
        author: Some("instructor@example.org".into()),
        source_filename: Some("photosynthesis.txt".into()),
        ..Default::default()
    };

    let id = generate_and_store_with_model(
        three_page_document(),
        metadata,
        &store,
        &model,
        &config(),
        &CancellationToken::new(),
    )
    .await
    .expect("store path should succeed");

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].metadata.title, "Photosynthesis basics");
    assert_eq!(records[0].quiz.len(), 5);
}

// ── Failure isolation ────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_extension_rejected_before_extraction_or_network() {
    let model = StubModel::new(five_question_payload());
    let doc = UploadedDocument::new(
        b"MZ\x90\x00".to_vec(),
        "application/octet-stream",
        "setup.exe",
    );

    let err = generate_with_model(doc, &model, &config(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2QuizError::UnsupportedFormat { .. }));
    assert_eq!(err.stage(), Stage::Detected);
    assert_eq!(model.call_count(), 0, "no network call may happen");
}

#[tokio::test]
async fn model_timeout_fails_run_and_releases_resources() {
    let released = Arc::new(AtomicBool::new(false));
    let doc = three_page_document().with_backing(Box::new(DropFlag(Arc::clone(&released))));

    let err = generate_with_model(doc, &TimeoutModel, &config(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Doc2QuizError::Generation(GenerationError::Timeout { .. })
    ));
    assert_eq!(err.stage(), Stage::ModelInvoked);
    assert!(
        released.load(Ordering::SeqCst),
        "backing storage must be released on the failure path"
    );
}

#[tokio::test]
async fn success_path_also_releases_resources() {
    let released = Arc::new(AtomicBool::new(false));
    let model = StubModel::new(five_question_payload());
    let doc = three_page_document().with_backing(Box::new(DropFlag(Arc::clone(&released))));

    generate_with_model(doc, &model, &config(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn malformed_model_output_fails_at_parse_stage() {
    let model = StubModel::new("Sure! Here are some questions for you.");
    let err = generate_with_model(
        three_page_document(),
        &model,
        &config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Doc2QuizError::Parse(ParseError::Malformed { .. })
    ));
    assert_eq!(err.stage(), Stage::Parsed);
}

#[tokio::test]
async fn wrong_question_count_is_rejected_not_truncated() {
    let short = r#"{"questions":[
        {"question":"Q?","options":["A","B","C","D"],"correctIndex":0},
        {"question":"Q?","options":["A","B","C","D"],"correctIndex":1}
    ]}"#;
    let model = StubModel::new(short);

    let err = generate_with_model(
        three_page_document(),
        &model,
        &config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Doc2QuizError::Parse(ParseError::WrongQuestionCount {
            expected: 5,
            actual: 2
        })
    ));
}

#[tokio::test]
async fn corrupt_pdf_fails_at_extraction_stage() {
    let model = StubModel::new(five_question_payload());
    let doc = UploadedDocument::new(
        b"%PDF-1.7 this is not a real pdf body".to_vec(),
        "application/pdf",
        "syllabus.pdf",
    );

    let err = generate_with_model(doc, &model, &config(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2QuizError::Extraction { .. }));
    assert_eq!(err.stage(), Stage::Extracted);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn whitespace_only_document_fails_before_model_call() {
    let model = StubModel::new(five_question_payload());
    let doc = UploadedDocument::new(b"   \n\t  \n".to_vec(), "text/plain", "empty.txt");

    let err = generate_with_model(doc, &model, &config(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2QuizError::Extraction { .. }));
    assert!(err.to_string().contains("no extractable text"));
    assert_eq!(model.call_count(), 0);
}
