//! Resolution of the on-disk location of the annotation document.
//!
//! With a workspace open, annotations live alongside the project in a
//! `.marginalia/` dotdir so they travel with the checkout. Without one, they
//! fall back to the user's XDG data directory.

use std::path::{Path, PathBuf};

/// Default file name of the persisted annotation document.
pub const DEFAULT_FILE_NAME: &str = "annotations.json";

/// Returns the path of the annotation document.
///
/// Workspace open: `<workspace>/.marginalia/<file_name>`. Otherwise:
/// `$XDG_DATA_HOME/marginalia/<file_name>`, falling back to
/// `~/.local/share/marginalia/<file_name>` when the env var is absent, and to
/// a relative `.local/share` path when even `$HOME` is unset. The store
/// creates missing parent directories on first save.
pub fn storage_path(workspace_root: Option<&Path>, file_name: &str) -> PathBuf {
    match workspace_root {
        Some(root) => root.join(".marginalia").join(file_name),
        None => data_dir().join("marginalia").join(file_name),
    }
}

fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from(".local/share"))
}
