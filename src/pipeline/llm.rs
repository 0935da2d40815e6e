//! Model interaction: send the prompt, return the raw response text.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] and all output validation in
//! [`crate::pipeline::parse`], so the client's only jobs are the single
//! outbound HTTP call and the strict unwrap of the response envelope.
//!
//! The [`QuizModel`] trait is the one place network non-determinism enters
//! the pipeline. Tests substitute a deterministic stub behind it without
//! touching any orchestration logic.

use crate::config::QuizConfig;
use crate::error::{Doc2QuizError, GenerationError};
use crate::prompts::QuizPrompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The model's output, verbatim. Opaque until parsed; never partially
/// trusted.
#[derive(Debug, Clone)]
pub struct RawModelResponse {
    pub text: String,
}

/// Narrow seam over the generative model.
///
/// `generate` performs at most one outbound call, honours `cancel`, and
/// never retries. Implementations must be stateless across calls so
/// concurrent runs can share one instance.
#[async_trait]
pub trait QuizModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &QuizPrompt,
        cancel: &CancellationToken,
    ) -> Result<RawModelResponse, GenerationError>;
}

// ── Wire types ───────────────────────────────────────────────────────────
//
// Request: {"contents":[{"parts":[{"text": <prompt>}]}]}
// Response: candidates[0].content.parts[0].text
//
// Every response field is optional at the serde level; the unwrap helper
// turns each missing step into a MalformedEnvelope naming the gap.

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Unwrap `candidates[0].content.parts[0].text`, failing loudly at the
/// first missing field.
fn first_candidate_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let malformed = |detail: &str| GenerationError::MalformedEnvelope {
        detail: detail.to_string(),
    };

    response
        .candidates
        .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
        .ok_or_else(|| malformed("no candidates in response"))?
        .content
        .ok_or_else(|| malformed("candidate has no content"))?
        .parts
        .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
        .ok_or_else(|| malformed("candidate content has no parts"))?
        .text
        .ok_or_else(|| malformed("candidate part has no text"))
}

// ── Production client ────────────────────────────────────────────────────

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Stateless beyond the connection pool; one instance serves any number of
/// concurrent runs. The API key is passed as the `key` query parameter,
/// per the endpoint's authentication scheme.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from the run configuration.
    ///
    /// The credential comes from `config.api_key`, falling back to the
    /// `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    /// [`Doc2QuizError::ModelNotConfigured`] when no credential is
    /// available.
    pub fn from_config(config: &QuizConfig) -> Result<Self, Doc2QuizError> {
        let api_key = match config.api_key.clone() {
            Some(key) if !key.is_empty() => key,
            _ => std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()).ok_or_else(
                || Doc2QuizError::ModelNotConfigured {
                    hint: "Set GEMINI_API_KEY or provide QuizConfig::api_key.".to_string(),
                },
            )?,
        };

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Doc2QuizError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            api_key,
            timeout: Duration::from_secs(config.api_timeout_secs),
        })
    }
}

#[async_trait]
impl QuizModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &QuizPrompt,
        cancel: &CancellationToken,
    ) -> Result<RawModelResponse, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.as_str(),
                }],
            }],
        };

        debug!("Calling generation endpoint ({} prompt chars)", prompt.as_str().len());

        let request = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Generation call cancelled by caller");
                return Err(GenerationError::Cancelled);
            }
            result = request => result.map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout { secs: self.timeout.as_secs() }
                } else {
                    GenerationError::Transport { detail: e.to_string() }
                }
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Generation endpoint returned HTTP {}", status);
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                detail: truncate_detail(&detail),
            });
        }

        let envelope: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::MalformedEnvelope {
                    detail: format!("response body is not valid JSON: {e}"),
                })?;

        let text = first_candidate_text(envelope)?;
        debug!("Model returned {} chars", text.len());
        Ok(RawModelResponse { text })
    }
}

/// Keep error bodies readable in logs and messages.
fn truncate_detail(detail: &str) -> String {
    const MAX: usize = 300;
    if detail.chars().count() > MAX {
        let cut: String = detail.chars().take(MAX).collect();
        format!("{cut}…")
    } else {
        detail.to_string()
    }
}
