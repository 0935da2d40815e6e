//! CLI binary for doc2quiz.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`
//! and prints the generated quiz as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use doc2quiz::{generate_from_path, QuizConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate a 5-question quiz from a PDF (stdout, JSON)
  doc2quiz lecture_notes.pdf

  # From a Word document, 10 questions
  doc2quiz --questions 10 chapter3.docx

  # Write the quiz to a file
  doc2quiz notes.txt -o quiz.json

  # Use a different model and a shorter excerpt
  doc2quiz --model gemini-2.5-pro --excerpt-limit 2000 paper.pdf

SUPPORTED FORMATS:
  PDF (.pdf), Word (.docx), plain text (.txt, .text)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      API key for the generation endpoint (required)
  DOC2QUIZ_MODEL      Override the model ID

SETUP:
  1. Set API key:     export GEMINI_API_KEY=...
  2. Generate:        doc2quiz document.pdf -o quiz.json
"#;

/// Generate multiple-choice quizzes from documents using a generative-AI model.
#[derive(Parser, Debug)]
#[command(
    name = "doc2quiz",
    version,
    about = "Generate multiple-choice quizzes from PDF, DOCX, and plain-text documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to a PDF, DOCX, or plain-text document.
    input: PathBuf,

    /// Write the quiz JSON to this file instead of stdout.
    #[arg(short, long, env = "DOC2QUIZ_OUTPUT")]
    output: Option<PathBuf>,

    /// Number of questions to generate.
    #[arg(long, env = "DOC2QUIZ_QUESTIONS", default_value_t = 5)]
    questions: usize,

    /// Number of options per question.
    #[arg(long, env = "DOC2QUIZ_OPTIONS", default_value_t = 4)]
    options: usize,

    /// Maximum characters of document text embedded in the prompt.
    #[arg(long, env = "DOC2QUIZ_EXCERPT_LIMIT", default_value_t = 4000)]
    excerpt_limit: usize,

    /// Model ID (e.g. gemini-2.0-flash, gemini-2.5-pro).
    #[arg(long, env = "DOC2QUIZ_MODEL", default_value = "gemini-2.0-flash")]
    model: String,

    /// Generation call timeout in seconds.
    #[arg(long, env = "DOC2QUIZ_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Compact JSON output (default is pretty-printed).
    #[arg(long)]
    compact: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the quiz itself.
    #[arg(short, long, env = "DOC2QUIZ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = QuizConfig::builder()
        .question_count(cli.questions)
        .option_count(cli.options)
        .excerpt_char_limit(cli.excerpt_limit)
        .model(&cli.model)
        .api_timeout_secs(cli.api_timeout)
        .build()
        .context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = generate_from_path(&cli.input, &config)
        .await
        .with_context(|| format!("Quiz generation failed for {:?}", cli.input))?;

    let json = if cli.compact {
        serde_json::to_string(&output.quiz).context("Failed to serialise quiz")?
    } else {
        serde_json::to_string_pretty(&output.quiz).context("Failed to serialise quiz")?
    };

    if let Some(ref path) = cli.output {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write output file {path:?}"))?;
        if !cli.quiet {
            eprintln!(
                "{} questions → {}  ({}ms total, {}ms model)",
                output.quiz.len(),
                path.display(),
                output.stats.total_duration_ms,
                output.stats.model_duration_ms,
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
        if !cli.quiet {
            eprintln!(
                "{} questions from {} chars of {} text  ({}ms total)",
                output.quiz.len(),
                output.stats.extracted_chars,
                output.stats.source_format,
                output.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}
