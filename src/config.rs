//! Configuration types for quiz generation.
//!
//! All pipeline behaviour is controlled through [`QuizConfig`], built via
//! its [`QuizConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across concurrent runs (the config is the only
//! shared state, and it is read-only after construction), serialise them
//! for logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults
//! for the rest; `build()` validates cross-field constraints once instead
//! of every entry point re-checking them.

use crate::error::Doc2QuizError;
use serde::{Deserialize, Serialize};

/// Default number of questions per quiz.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Default number of options per question.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Default excerpt limit in characters (see [`QuizConfig::excerpt_char_limit`]).
pub const DEFAULT_EXCERPT_CHAR_LIMIT: usize = 4000;

/// Configuration for a document-to-quiz run.
///
/// Built via [`QuizConfig::builder()`] or using [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2quiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .question_count(10)
///     .excerpt_char_limit(2000)
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Number of questions a generated quiz must contain. Default: 5.
    ///
    /// This is both an instruction to the model and a hard validation rule:
    /// a response with any other count is rejected, never truncated or
    /// padded.
    pub question_count: usize,

    /// Number of options per question. Default: 4.
    ///
    /// Exactly one option is correct; the rest are distractors. As with
    /// `question_count`, a response violating this is rejected outright.
    pub option_count: usize,

    /// Maximum number of characters of extracted text embedded in the
    /// prompt. Default: 4000.
    ///
    /// The cut is a raw prefix of the extracted text — deterministic, not
    /// sentence-aware — so the same document always produces the same
    /// prompt. It may end mid-word; the model copes with that far better
    /// than the pipeline would cope with an unbounded prompt.
    pub excerpt_char_limit: usize,

    /// Model identifier appended to the endpoint path.
    /// Default: "gemini-2.0-flash".
    pub model: String,

    /// Base URL of the generative-AI API. Default: the public Gemini
    /// endpoint. Overridable for proxies and for HTTP-level tests.
    pub api_base: String,

    /// API key. If `None`, `GEMINI_API_KEY` is read from the environment
    /// when the production client is constructed.
    ///
    /// Skipped during serialisation so configs can be logged without
    /// leaking the credential.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Timeout for the single outbound generation call, in seconds.
    /// Default: 60.
    ///
    /// On expiry the run fails with `GenerationError::Timeout`; there is no
    /// internal retry.
    pub api_timeout_secs: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            option_count: DEFAULT_OPTION_COUNT,
            excerpt_char_limit: DEFAULT_EXCERPT_CHAR_LIMIT,
            model: "gemini-2.0-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            api_timeout_secs: 60,
        }
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn question_count(mut self, n: usize) -> Self {
        self.config.question_count = n;
        self
    }

    pub fn option_count(mut self, n: usize) -> Self {
        self.config.option_count = n;
        self
    }

    pub fn excerpt_char_limit(mut self, n: usize) -> Self {
        self.config.excerpt_char_limit = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, Doc2QuizError> {
        let c = &self.config;
        if c.question_count == 0 {
            return Err(Doc2QuizError::InvalidConfig(
                "question_count must be ≥ 1".into(),
            ));
        }
        if c.option_count < 2 {
            return Err(Doc2QuizError::InvalidConfig(format!(
                "option_count must be ≥ 2, got {}",
                c.option_count
            )));
        }
        if c.excerpt_char_limit == 0 {
            return Err(Doc2QuizError::InvalidConfig(
                "excerpt_char_limit must be ≥ 1".into(),
            ));
        }
        if c.model.is_empty() {
            return Err(Doc2QuizError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let c = QuizConfig::default();
        assert_eq!(c.question_count, 5);
        assert_eq!(c.option_count, 4);
        assert_eq!(c.excerpt_char_limit, 4000);
        assert_eq!(c.api_timeout_secs, 60);
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let c = QuizConfig::builder()
            .api_base("http://localhost:8080/v1beta/")
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        assert_eq!(
            c.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn zero_question_count_rejected() {
        let err = QuizConfig::builder().question_count(0).build().unwrap_err();
        assert!(matches!(err, Doc2QuizError::InvalidConfig(_)));
    }

    #[test]
    fn single_option_rejected() {
        let err = QuizConfig::builder().option_count(1).build().unwrap_err();
        assert!(err.to_string().contains("option_count"));
    }

    #[test]
    fn api_key_not_serialised() {
        let c = QuizConfig::builder().api_key("secret-key").build().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
