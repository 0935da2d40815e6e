//! Response parsing: strict shape validation of the model's raw output.
//!
//! ## Why is cleanup necessary?
//!
//! Even well-prompted models occasionally disobey "output only JSON":
//! wrapping the payload in ```` ```json ```` fences, or prefixing it with a
//! sentence of commentary. Rather than assuming strict well-formedness and
//! failing on cosmetic noise, the parser first strips an outer code fence,
//! then extracts the *first balanced* JSON object or array (string- and
//! escape-aware), and decodes that. Deterministic: the same input always
//! yields the same verdict.
//!
//! ## What is validated
//!
//! Shape only — the configured question count, the option count, and the
//! single-correct-marker rule. No semantic fact-checking of quiz content
//! is performed.

use crate::config::QuizConfig;
use crate::error::ParseError;
use crate::output::{Question, Quiz};
use crate::pipeline::llm::RawModelResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// Parse and validate the model's raw output into a [`Quiz`].
///
/// # Errors
/// * [`ParseError::Malformed`] — no decodable JSON payload.
/// * [`ParseError::WrongQuestionCount`] — question count ≠ configured.
/// * [`ParseError::InvalidQuestion`] — option count or correct-marker
///   violation, carrying the 0-based question index.
pub fn parse_quiz(raw: &RawModelResponse, config: &QuizConfig) -> Result<Quiz, ParseError> {
    let cleaned = strip_code_fences(&raw.text);
    let payload = extract_json_block(&cleaned).ok_or_else(|| ParseError::Malformed {
        detail: "no JSON object or array found in model output".to_string(),
    })?;

    let wire: WirePayload =
        serde_json::from_str(payload).map_err(|e| ParseError::Malformed {
            detail: e.to_string(),
        })?;
    let wire_questions = wire.into_questions();

    if wire_questions.len() != config.question_count {
        return Err(ParseError::WrongQuestionCount {
            expected: config.question_count,
            actual: wire_questions.len(),
        });
    }

    let mut questions = Vec::with_capacity(wire_questions.len());
    for (index, wq) in wire_questions.into_iter().enumerate() {
        questions.push(canonicalise_question(index, wq, config.option_count)?);
    }

    debug!("Parsed quiz with {} questions", questions.len());
    Ok(Quiz { questions })
}

// ── Payload location ─────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*?)\n```\s*$").unwrap());

/// Strip an outer markdown code fence (models sometimes disobey the
/// prompt).
fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

/// Locate the first balanced JSON object or array in `input`.
///
/// Scans from the first `{` or `[`, tracking nesting depth while skipping
/// string contents and escape sequences, and returns the slice up to the
/// matching close bracket. Surrounding prose is ignored; text after the
/// block is ignored too.
fn extract_json_block(input: &str) -> Option<&str> {
    let start = input.find(['{', '['])?;
    let bytes = input.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&input[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

// ── Wire shapes ──────────────────────────────────────────────────────────
//
// The canonical shape is {"questions":[{"question","options","correctIndex"}]},
// but models emit minor variants: a bare array, snake_case keys, or the
// correct answer as text instead of an index. All are converted to the
// canonical internal shape; anything further afield is rejected.

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Wrapped { questions: Vec<WireQuestion> },
    Bare(Vec<WireQuestion>),
}

impl WirePayload {
    fn into_questions(self) -> Vec<WireQuestion> {
        match self {
            WirePayload::Wrapped { questions } => questions,
            WirePayload::Bare(questions) => questions,
        }
    }
}

#[derive(Deserialize)]
struct WireQuestion {
    #[serde(alias = "prompt")]
    question: String,
    #[serde(alias = "choices")]
    options: Vec<String>,
    #[serde(default, alias = "correctIndex", alias = "answerIndex")]
    correct_index: Option<serde_json::Value>,
    #[serde(default, alias = "correctAnswer", alias = "answer")]
    correct_answer: Option<String>,
}

/// Convert one wire question to the canonical shape, enforcing the option
/// count and the exactly-one-correct-marker invariant.
fn canonicalise_question(
    index: usize,
    wq: WireQuestion,
    option_count: usize,
) -> Result<Question, ParseError> {
    let invalid = |detail: String| ParseError::InvalidQuestion { index, detail };

    if wq.options.len() != option_count {
        return Err(invalid(format!(
            "expected {} options, got {}",
            option_count,
            wq.options.len()
        )));
    }

    let from_index = match &wq.correct_index {
        None => None,
        Some(v) => Some(resolve_index(v, wq.options.len()).map_err(|d| invalid(d))?),
    };
    let from_answer = match &wq.correct_answer {
        None => None,
        Some(text) => Some(resolve_answer_text(text, &wq.options).map_err(|d| invalid(d))?),
    };

    let correct_index = match (from_index, from_answer) {
        (Some(i), None) | (None, Some(i)) => i,
        (Some(i), Some(j)) if i == j => i,
        (Some(i), Some(j)) => {
            return Err(invalid(format!(
                "conflicting correct markers: index {i} vs answer text at index {j}"
            )))
        }
        (None, None) => return Err(invalid("no correct-option marker".to_string())),
    };

    Ok(Question {
        question: wq.question,
        options: wq.options,
        correct_index,
    })
}

/// Resolve a correct-index marker that may be a number or a numeric string.
fn resolve_index(value: &serde_json::Value, option_count: usize) -> Result<usize, String> {
    let idx = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("correct index {n} is not a non-negative integer"))?
            as usize,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("correct index '{s}' is not an integer"))?,
        other => return Err(format!("correct index has unexpected type: {other}")),
    };
    if idx >= option_count {
        return Err(format!(
            "correct index {idx} out of range for {option_count} options"
        ));
    }
    Ok(idx)
}

/// Resolve a correct-answer-as-text marker to the option index.
///
/// Exact match wins; otherwise a trimmed, case-insensitive match. Duplicate
/// option text resolves to the first occurrence (duplicate text is
/// tolerated; duplicate markers are not).
fn resolve_answer_text(answer: &str, options: &[String]) -> Result<usize, String> {
    if let Some(i) = options.iter().position(|o| o == answer) {
        return Ok(i);
    }
    let needle = answer.trim().to_lowercase();
    options
        .iter()
        .position(|o| o.trim().to_lowercase() == needle)
        .ok_or_else(|| format!("correct answer '{answer}' matches no option"))
}
