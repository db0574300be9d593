use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`crate::store::AnnotationStore`].
///
/// Only the write path produces errors: a failed save means the user's edit
/// was not persisted and must be reported. Read-path failures (missing or
/// corrupt store document, unreadable fingerprint target) degrade to empty
/// values with a log line instead — annotations must never block normal file
/// viewing or editing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while writing the annotation document.
    #[error("failed to write annotation store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory map could not be serialized to JSON.
    #[error("failed to serialize annotation store: {0}")]
    Serialize(#[from] serde_json::Error),
}
