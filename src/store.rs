//! Persistence collaborator seam.
//!
//! The document store is an external collaborator: the pipeline writes a
//! finished quiz merged with caller metadata exactly once and never reads
//! it back. [`QuizStore`] is the narrow trait the orchestrator hands the
//! quiz to; [`InMemoryStore`] is a reference implementation for tests and
//! for embedding the library without a real database.

use crate::error::Doc2QuizError;
use crate::output::{Quiz, QuizMetadata};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Accepts a quiz and caller metadata, returns the assigned identifier.
///
/// Implementations own the merged-record shape and the identifier scheme;
/// the pipeline treats both as opaque.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn save(&self, quiz: &Quiz, metadata: &QuizMetadata) -> Result<String, Doc2QuizError>;
}

/// One persisted record: quiz fields merged with caller metadata.
#[derive(Debug, Clone)]
pub struct StoredQuiz {
    pub id: String,
    pub metadata: QuizMetadata,
    pub quiz: Quiz,
}

/// In-memory [`QuizStore`] with sequential identifiers.
#[derive(Default)]
pub struct InMemoryStore {
    next_id: AtomicU64,
    records: Mutex<Vec<StoredQuiz>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far (test inspection).
    pub fn records(&self) -> Vec<StoredQuiz> {
        self.records.lock().expect("store poisoned").clone()
    }
}

#[async_trait]
impl QuizStore for InMemoryStore {
    async fn save(&self, quiz: &Quiz, metadata: &QuizMetadata) -> Result<String, Doc2QuizError> {
        let id = format!("quiz-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        debug!("Storing quiz '{}' as {}", metadata.title, id);
        self.records
            .lock()
            .map_err(|_| Doc2QuizError::Store {
                detail: "store lock poisoned".to_string(),
            })?
            .push(StoredQuiz {
                id: id.clone(),
                metadata: metadata.clone(),
                quiz: quiz.clone(),
            });
        Ok(id)
    }
}
