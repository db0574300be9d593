//! Per-open-file lookup cache derived from the store.
//!
//! Answers "what note is under this cursor" in time linear in the open
//! file's annotation count, without rescanning the store on every query. It
//! is a disposable copy, never a source of truth: it can be rebuilt from the
//! store at any time without loss, and holds entries only for currently open
//! files so memory stays bounded.
//!
//! The cache is rebuild-from-scratch only — no incremental patching. Rebuild
//! cost is linear in a small annotation count and happens on discrete editor
//! events (open, mutation, text change), not per keystroke. On text change
//! the ranges are refreshed from the store but NOT re-mapped against the
//! edit, so they may be stale until the store itself is updated; that drift
//! is an accepted limitation of the coarse model.

use std::collections::HashMap;

use crate::store::AnnotationStore;
use crate::types::{AnnotationRange, Position};

/// Cached copy of one annotation: id, current range, content. Plain data —
/// no editor-toolkit types; a presentation layer converts at its boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAnnotation {
    pub id: String,
    pub range: AnnotationRange,
    pub content: String,
}

/// Cache keyed by open-file path, holding each file's annotations in store
/// (insertion) order.
#[derive(Debug, Default)]
pub struct ActiveAnnotationIndex {
    open_files: HashMap<String, Vec<ActiveAnnotation>>,
}

impl ActiveAnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears and repopulates the entry for `path` from the store's current
    /// list. A path with no annotations in the store loses its entry
    /// entirely, mirroring the store's "absent key means none" contract.
    ///
    /// Call on open-document, after any mutation touching `path`, and on
    /// text-changed events.
    pub fn rebuild(&mut self, path: &str, store: &AnnotationStore) {
        match store.file_entry(path) {
            Some(entry) => {
                let cached = entry
                    .annotations
                    .iter()
                    .map(|a| ActiveAnnotation {
                        id: a.id.clone(),
                        range: a.range,
                        content: a.content.clone(),
                    })
                    .collect();
                self.open_files.insert(path.to_owned(), cached);
            }
            None => {
                self.open_files.remove(path);
            }
        }
    }

    /// Returns the first cached annotation whose range contains `position`.
    ///
    /// Overlapping ranges are permitted and not deduplicated; ties go to
    /// insertion order — first match wins. `None` when the file is not open
    /// (not cached) or nothing covers the position.
    pub fn lookup(&self, path: &str, position: Position) -> Option<&ActiveAnnotation> {
        self.open_files
            .get(path)?
            .iter()
            .find(|a| a.range.contains(position))
    }

    /// Drops the cached entry for `path`. Call when the file is closed.
    pub fn evict(&mut self, path: &str) {
        self.open_files.remove(path);
    }

    /// Number of files currently cached.
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }
}
