//! Durable annotation storage: one JSON document per workspace.
//!
//! [`AnnotationStore`] is the sole source of truth for all annotations. The
//! in-memory map is keyed by absolute target-file path; every mutating
//! operation updates the map, rewrites the full document to disk, and then
//! emits a refresh event — in that order, so a notified consumer always
//! observes the persisted state. There is no batching or write-behind: note
//! volume is low and writes are user-triggered, so durability wins over write
//! throughput. The full-document rewrite is a known scaling limit, not a bug.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::events::{StoreEvent, StoreEventBus};
use crate::fingerprint;
use crate::types::{Annotation, AnnotationFile, AnnotationRange};

/// Durable mapping from target-file path to its [`AnnotationFile`].
///
/// Mutators take `&mut self`: within a process the borrow checker enforces
/// the single-writer discipline, and each mutation fully completes (memory
/// update, persist, notify) before the next can start. An embedding that
/// shares the store across tasks must wrap it in a `tokio::sync::Mutex` to
/// keep the read-your-writes, no-lost-updates guarantee.
#[derive(Debug)]
pub struct AnnotationStore {
    storage_path: PathBuf,
    files: BTreeMap<String, AnnotationFile>,
    bus: StoreEventBus,
}

impl AnnotationStore {
    /// Opens the store backed by the document at `storage_path`.
    ///
    /// Never fails: a missing document starts empty silently, an unreadable
    /// or corrupt one starts empty with a warning (degraded start). A corrupt
    /// document is set aside as `<name>.corrupt` so the next save does not
    /// destroy it.
    pub async fn open(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let files = Self::load(&storage_path).await;
        Self {
            storage_path,
            files,
            bus: StoreEventBus::new(),
        }
    }

    async fn load(path: &Path) -> BTreeMap<String, AnnotationFile> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no annotation store on disk, starting empty");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "annotation store unreadable, starting empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "annotation store is corrupt, starting empty");
                // Set the unparseable document aside so it stays recoverable
                // by hand; the next save would otherwise overwrite it.
                let aside = path.with_extension("json.corrupt");
                if let Err(rename_err) = tokio::fs::rename(path, &aside).await {
                    warn!(error = %rename_err, "could not set corrupt store aside");
                }
                BTreeMap::new()
            }
        }
    }

    /// Serializes the full map and atomically replaces the on-disk document
    /// (sibling temp file + rename). Parent directories are created on
    /// demand.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or filesystem failure. Unlike
    /// the load path this propagates: a failed save means the user's edit was
    /// not persisted and must be surfaced.
    pub async fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.files)?;

        if let Some(parent) = self.storage_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp = self.storage_path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.storage_path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.storage_path.clone(),
                source,
            })?;

        Ok(())
    }

    /// Creates a new annotation under `path`, persists, and notifies.
    ///
    /// Mints a fresh UUID v4 id and current timestamps, appends to the
    /// file's list (creating the entry at version 1 if absent, bumping the
    /// version otherwise), and refreshes the target-file fingerprint — an
    /// unreadable target records an empty hash and is not an error.
    ///
    /// Returns a copy of the stored annotation so the caller can hold on to
    /// the generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the save fails; the in-memory update
    /// will have been applied but no event is emitted.
    pub async fn add(
        &mut self,
        path: &str,
        range: AnnotationRange,
        content: impl Into<String>,
    ) -> Result<Annotation, StoreError> {
        let now = Utc::now();
        let annotation = Annotation {
            id: uuid::Uuid::new_v4().to_string(),
            range,
            content: content.into(),
            created_at: now,
            updated_at: now,
        };

        let file_hash = fingerprint::fingerprint_or_empty(path).await;
        match self.files.get_mut(path) {
            Some(entry) => {
                entry.annotations.push(annotation.clone());
                entry.version += 1;
                entry.file_hash = file_hash;
            }
            None => {
                self.files.insert(
                    path.to_owned(),
                    AnnotationFile {
                        version: 1,
                        file_hash,
                        annotations: vec![annotation.clone()],
                    },
                );
            }
        }

        self.save().await?;
        self.bus.emit(StoreEvent::AnnotationsChanged {
            path: path.to_owned(),
        });
        Ok(annotation)
    }

    /// Deletes the annotation with `id` under `path`.
    ///
    /// Unknown path or id is a normal negative result: `Ok(false)`, with no
    /// save and no event. Removing the last annotation for a path drops the
    /// whole entry — absence of a key means "no annotations for this file".
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the save after a removal fails.
    pub async fn delete(&mut self, path: &str, id: &str) -> Result<bool, StoreError> {
        let removed_last = {
            let Some(entry) = self.files.get_mut(path) else {
                return Ok(false);
            };
            let before = entry.annotations.len();
            entry.annotations.retain(|a| a.id != id);
            if entry.annotations.len() == before {
                return Ok(false);
            }
            entry.annotations.is_empty()
        };

        if removed_last {
            self.files.remove(path);
        } else {
            let file_hash = fingerprint::fingerprint_or_empty(path).await;
            if let Some(entry) = self.files.get_mut(path) {
                entry.version += 1;
                entry.file_hash = file_hash;
            }
        }

        self.save().await?;
        self.bus.emit(StoreEvent::AnnotationsChanged {
            path: path.to_owned(),
        });
        Ok(true)
    }

    /// Replaces the content of the annotation with `id` under `path` and
    /// refreshes its `updated_at` timestamp.
    ///
    /// Unknown path or id is `Ok(false)` with no side effects. The file
    /// fingerprint is deliberately NOT recomputed here: it tracks the target
    /// source file, and editing a note's text does not touch that file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the save fails.
    pub async fn update_content(
        &mut self,
        path: &str,
        id: &str,
        content: impl Into<String>,
    ) -> Result<bool, StoreError> {
        let Some(entry) = self.files.get_mut(path) else {
            return Ok(false);
        };
        let Some(annotation) = entry.annotations.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };

        annotation.content = content.into();
        annotation.updated_at = Utc::now();
        entry.version += 1;

        self.save().await?;
        self.bus.emit(StoreEvent::AnnotationsChanged {
            path: path.to_owned(),
        });
        Ok(true)
    }

    /// Looks up one annotation by id — a linear scan of the path's list.
    /// Per-file annotation counts are small; no index is warranted here.
    pub fn get_by_id(&self, path: &str, id: &str) -> Option<&Annotation> {
        self.files.get(path)?.annotations.iter().find(|a| a.id == id)
    }

    /// Returns the per-file record for `path`, if it has any annotations.
    pub fn file_entry(&self, path: &str) -> Option<&AnnotationFile> {
        self.files.get(path)
    }

    /// Snapshot over all files with annotations, in path order. Entries with
    /// empty lists never appear — they are removed on their last delete.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &AnnotationFile)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    /// True when no file has annotations.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Subscribes to refresh notifications fired after every successful
    /// mutation. See [`StoreEventBus`].
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.bus.subscribe()
    }

    /// Location of the persisted document.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }
}
