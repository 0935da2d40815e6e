//! Output types: the quiz itself, persistence metadata, and run statistics.
//!
//! [`Quiz`] is constructed exactly once per run — by the response parser —
//! and never mutated afterwards. Its serialised form is the canonical wire
//! shape (`{"questions":[{"question","options","correctIndex"}]}`), so the
//! same type serves the library API, the CLI's JSON output, and whatever a
//! [`crate::store::QuizStore`] implementation writes.

use crate::error::Doc2QuizError;
use crate::pipeline::detect::DocumentFormat;
use serde::{Deserialize, Serialize};

/// A generated quiz: an ordered sequence of questions.
///
/// Invariants (enforced by the parser, relied on everywhere else):
/// * exactly the configured number of questions (5 in the reference
///   configuration);
/// * every question satisfies the [`Question`] invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

/// A single multiple-choice question.
///
/// Invariants: exactly 4 options (in the reference configuration) at
/// distinct positions, and exactly one correct option identified by
/// `correct_index`. Duplicate option *text* is tolerated; duplicate
/// correct markers are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The question prompt shown to the quiz taker.
    pub question: String,
    /// The answer options, in presentation order.
    pub options: Vec<String>,
    /// 0-based index of the single correct option.
    pub correct_index: usize,
}

impl Quiz {
    /// Number of questions in the quiz.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the quiz has no questions.
    ///
    /// A valid quiz is never empty; this exists for the usual
    /// `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Caller-supplied metadata merged with quiz fields at persistence time.
///
/// Owned by the persistence collaborator's record, not by the pipeline:
/// the core writes it once via [`crate::store::QuizStore::save`] and never
/// reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMetadata {
    /// Display title of the quiz.
    pub title: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifier of the authoring user (assigned by the caller; the
    /// pipeline performs no authorization itself).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Original filename of the source document, if worth keeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
}

/// Statistics about a single pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    /// Detected format of the source document.
    pub source_format: DocumentFormat,
    /// Characters of text extracted from the document.
    pub extracted_chars: usize,
    /// Characters of the excerpt actually embedded in the prompt
    /// (≤ the configured limit).
    pub excerpt_chars: usize,
    /// Characters in the model's raw response.
    pub response_chars: usize,
    /// Wall-clock duration of the extraction stage.
    pub extract_duration_ms: u64,
    /// Wall-clock duration of the model call.
    pub model_duration_ms: u64,
    /// Total run duration, received → parsed.
    pub total_duration_ms: u64,
}

/// Result of a successful pipeline run: the quiz plus run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub quiz: Quiz,
    pub stats: RunStats,
}

impl GenerationOutput {
    /// Consume the output, keeping only the quiz.
    pub fn into_quiz(self) -> Quiz {
        self.quiz
    }
}

/// Sanity-check the quiz invariants against a configured shape.
///
/// The parser already guarantees these for quizzes it produces; stores or
/// transports that accept quizzes from elsewhere can re-check cheaply.
pub fn validate_quiz(
    quiz: &Quiz,
    question_count: usize,
    option_count: usize,
) -> Result<(), Doc2QuizError> {
    if quiz.questions.len() != question_count {
        return Err(crate::error::ParseError::WrongQuestionCount {
            expected: question_count,
            actual: quiz.questions.len(),
        }
        .into());
    }
    for (i, q) in quiz.questions.iter().enumerate() {
        if q.options.len() != option_count {
            return Err(crate::error::ParseError::InvalidQuestion {
                index: i,
                detail: format!("expected {} options, got {}", option_count, q.options.len()),
            }
            .into());
        }
        if q.correct_index >= q.options.len() {
            return Err(crate::error::ParseError::InvalidQuestion {
                index: i,
                detail: format!(
                    "correct index {} out of range for {} options",
                    q.correct_index,
                    q.options.len()
                ),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            question: "What is the capital of France?".into(),
            options: vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Lille".into()],
            correct_index: 0,
        }
    }

    #[test]
    fn question_serialises_camel_case() {
        let json = serde_json::to_value(sample_question()).unwrap();
        assert!(json.get("correctIndex").is_some());
        assert!(json.get("correct_index").is_none());
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn quiz_round_trips_through_json() {
        let quiz = Quiz {
            questions: vec![sample_question()],
        };
        let json = serde_json::to_string(&quiz).unwrap();
        let back: Quiz = serde_json::from_str(&json).unwrap();
        assert_eq!(quiz, back);
    }

    #[test]
    fn validate_rejects_wrong_question_count() {
        let quiz = Quiz {
            questions: vec![sample_question()],
        };
        assert!(validate_quiz(&quiz, 5, 4).is_err());
        assert!(validate_quiz(&quiz, 1, 4).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_correct_index() {
        let mut q = sample_question();
        q.correct_index = 4;
        let quiz = Quiz { questions: vec![q] };
        let err = validate_quiz(&quiz, 1, 4).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
