//! The uploaded document and its scoped backing storage.
//!
//! ## Why an RAII backing guard?
//!
//! Transport layers often spool uploads to a temporary file before handing
//! them to the pipeline. Holding that file as a guard inside
//! [`UploadedDocument`] means the file is deleted exactly when the document
//! is dropped — on the success path, on every failure path, and even on
//! panic. The release-on-every-exit-path guarantee of the orchestrator is
//! therefore enforced by ownership: the run *consumes* the document, so
//! there is no code path that can forget the cleanup.

use crate::error::Doc2QuizError;
use std::any::Any;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// A document handed to one pipeline run.
///
/// Transient by design: owned exclusively by a single run and destroyed
/// (together with any backing temporary file) when that run ends,
/// regardless of outcome.
pub struct UploadedDocument {
    bytes: Vec<u8>,
    content_type: String,
    filename: String,
    /// Arbitrary RAII guard dropped together with the document. Production
    /// code stores a [`NamedTempFile`] here; tests store drop-tracking
    /// doubles to verify the cleanup guarantee.
    _backing: Option<Box<dyn Any + Send>>,
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("backing", &self._backing.as_ref().map(|_| "<guard>"))
            .finish()
    }
}

impl UploadedDocument {
    /// Wrap in-memory bytes with their declared content-type and filename.
    pub fn new(
        bytes: Vec<u8>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            filename: filename.into(),
            _backing: None,
        }
    }

    /// Attach an RAII guard released when this document is dropped.
    ///
    /// The guard's only job is its `Drop` impl — a spooled temp file, a
    /// quota token, or a test double.
    pub fn with_backing(mut self, guard: Box<dyn Any + Send>) -> Self {
        self._backing = Some(guard);
        self
    }

    /// Take ownership of a spooled upload: reads the temp file's bytes and
    /// keeps the file itself as the backing guard, so it is deleted when
    /// the run ends.
    pub fn from_temp_file(
        file: NamedTempFile,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, Doc2QuizError> {
        let path = file.path().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|e| Doc2QuizError::InputRead {
            path,
            detail: e.to_string(),
        })?;
        debug!("Spooled upload: {} bytes from temp file", bytes.len());
        Ok(Self::new(bytes, content_type, filename).with_backing(Box::new(file)))
    }

    /// Read a document from disk, inferring the content-type from the
    /// file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Doc2QuizError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Doc2QuizError::InputRead {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(
            "Read {} bytes from '{}' ({})",
            bytes.len(),
            path.display(),
            content_type
        );
        Ok(Self::new(bytes, content_type, filename))
    }

    /// The raw document bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The declared content-type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The original filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Drop-tracking guard: flips a flag when released.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn backing_guard_released_on_drop() {
        let released = Arc::new(AtomicBool::new(false));
        let doc = UploadedDocument::new(b"hello".to_vec(), "text/plain", "hello.txt")
            .with_backing(Box::new(DropFlag(Arc::clone(&released))));

        assert!(!released.load(Ordering::SeqCst));
        drop(doc);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn from_temp_file_deletes_backing_on_drop() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"course notes").unwrap();
        let path = tmp.path().to_path_buf();

        let doc = UploadedDocument::from_temp_file(tmp, "text/plain", "notes.txt").unwrap();
        assert_eq!(doc.bytes(), b"course notes");
        assert!(path.exists());

        drop(doc);
        assert!(!path.exists(), "temp file must be removed with the document");
    }

    #[tokio::test]
    async fn from_path_infers_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.txt");
        tokio::fs::write(&path, "photosynthesis").await.unwrap();

        let doc = UploadedDocument::from_path(&path).await.unwrap();
        assert_eq!(doc.content_type(), "text/plain");
        assert_eq!(doc.filename(), "lecture.txt");
        assert_eq!(doc.bytes(), b"photosynthesis");
    }

    #[tokio::test]
    async fn from_path_missing_file_is_input_read_error() {
        let err = UploadedDocument::from_path("/definitely/not/here.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2QuizError::InputRead { .. }));
    }
}
