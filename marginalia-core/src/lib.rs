//! marginalia-core — annotation persistence and range tracking.
//!
//! Attaches free-text notes to character ranges in source files and keeps
//! them durable in a single JSON document per workspace. The pieces:
//!
//! - [`types`] — the pure data model: positions, half-open ranges, notes,
//!   and the per-file record with its version counter and fingerprint.
//! - [`store`] — [`AnnotationStore`], the sole durable source of truth.
//!   Every mutation updates memory, rewrites the document, then notifies.
//! - [`index`] — [`ActiveAnnotationIndex`], a disposable per-open-file cache
//!   for cursor-position lookups, rebuilt from the store on editor events.
//! - [`fingerprint`] — SHA-256 content hashes of annotated files, used to
//!   detect drift between anchor time and now.
//! - [`events`] — the broadcast bus carrying refresh notifications to
//!   presentation surfaces.
//! - [`location`] — where the document lives on disk (workspace dotdir or
//!   XDG data-dir fallback).
//!
//! No UI-toolkit types appear anywhere in this crate; front-ends convert to
//! their own geometry at the boundary and talk to the store through its
//! mutators only.

pub mod error;
pub mod events;
pub mod fingerprint;
pub mod index;
pub mod location;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use events::{StoreEvent, StoreEventBus};
pub use index::{ActiveAnnotation, ActiveAnnotationIndex};
pub use store::AnnotationStore;
pub use types::{Annotation, AnnotationFile, AnnotationRange, Position};
