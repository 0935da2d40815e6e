//! Instruction prompts for quiz generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the instruction (e.g. the
//!    required output shape) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the rendered prompt without
//!    spinning up a real model, making prompt regressions easy to catch.
//!
//! Prompt construction is fully deterministic: the instruction is a
//! compile-time template, and the only runtime inputs are the source
//! excerpt and the configured question/option counts.

use crate::config::QuizConfig;

/// A rendered quiz prompt: the fixed instruction with the source excerpt
/// embedded. Immutable; passed once to the generation client.
#[derive(Debug, Clone)]
pub struct QuizPrompt {
    text: String,
    excerpt_chars: usize,
}

impl QuizPrompt {
    /// The full prompt text sent to the model.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of excerpt characters embedded in the prompt.
    pub fn excerpt_chars(&self) -> usize {
        self.excerpt_chars
    }
}

/// Render the quiz instruction for the given counts.
///
/// The shape demanded here is exactly what
/// [`crate::pipeline::parse::parse_quiz`] accepts — keep the two in sync.
pub fn quiz_instruction(question_count: usize, option_count: usize) -> String {
    format!(
        r#"You are a quiz author. Based on the source text below, write exactly {question_count} multiple-choice questions that test understanding of the material.

Follow these rules precisely:

1. Each question has exactly {option_count} options, of which exactly one is correct; the other {incorrect_count} are plausible but incorrect.
2. Questions must be answerable from the source text alone.
3. Output ONLY a JSON object of this exact shape:
   {{"questions":[{{"question":"...","options":["...","...","...","..."],"correctIndex":0}}]}}
   where correctIndex is the 0-based index of the correct option.
4. Do NOT wrap the JSON in code fences.
5. Do NOT add commentary or explanations before or after the JSON.

Source text:
"#,
        question_count = question_count,
        option_count = option_count,
        incorrect_count = option_count - 1,
    )
}

/// Build the prompt for one run: instruction plus a bounded excerpt.
///
/// The excerpt is the first `excerpt_char_limit` *characters* of the
/// extracted text — a raw prefix cut, not sentence-aware, so it may end
/// mid-word. Shorter input is embedded untouched. Deterministic: the same
/// text and config always produce the same prompt.
pub fn build_quiz_prompt(text: &str, config: &QuizConfig) -> QuizPrompt {
    let excerpt: String = text.chars().take(config.excerpt_char_limit).collect();
    let excerpt_chars = excerpt.chars().count();

    let mut rendered = quiz_instruction(config.question_count, config.option_count);
    rendered.push_str(&excerpt);

    QuizPrompt {
        text: rendered,
        excerpt_chars,
    }
}
