//! Content fingerprinting for annotated source files.
//!
//! The store records a hash of the target file at the time annotations are
//! added or removed. Consumers compare the recorded hash against the current
//! one to detect that the file has drifted since the notes were anchored —
//! the store itself never acts on a mismatch, it only records.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::warn;

/// Reads `path` and returns the lowercase hex SHA-256 digest of its bytes.
///
/// Pure with respect to the store: no state is touched. Collision resistance
/// beyond "stable digest of the content" is not required here; SHA-256 is
/// simply the digest the rest of the stack already carries.
///
/// # Errors
///
/// Returns the underlying `io::Error` if the file cannot be read.
pub async fn fingerprint_of(path: impl AsRef<Path>) -> io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Returns `true` if the current fingerprint of `path` differs from
/// `recorded`. An empty recorded hash always reads as drifted, since it means
/// the target was unreadable at anchor time.
///
/// # Errors
///
/// Returns the underlying `io::Error` if the file cannot be read now.
pub async fn has_drifted(path: impl AsRef<Path>, recorded: &str) -> io::Result<bool> {
    Ok(fingerprint_of(path).await? != recorded)
}

/// Store-internal variant: any read failure degrades to an empty-string
/// sentinel with a warning, so a missing or unreadable target never blocks
/// an annotation mutation.
pub(crate) async fn fingerprint_or_empty(path: &str) -> String {
    match fingerprint_of(path).await {
        Ok(digest) => digest,
        Err(e) => {
            warn!(path, error = %e, "could not fingerprint target file, recording empty hash");
            String::new()
        }
    }
}
