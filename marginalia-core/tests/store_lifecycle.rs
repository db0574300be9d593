//! Integration tests for the annotation store lifecycle.
//!
//! Exercises: open, add, get_by_id, update_content, delete, persistence
//! round-trips, degraded start on corrupt input, and the notification bus.

use marginalia_core::fingerprint;
use marginalia_core::store::AnnotationStore;
use marginalia_core::types::{AnnotationRange, Position};
use tokio::sync::broadcast::error::TryRecvError;

fn range(start: (u32, u32), end: (u32, u32)) -> AnnotationRange {
    AnnotationRange::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
}

/// Creates a tempdir holding both the store document and a readable target
/// file to annotate. Returns (dir, store, target path as String).
async fn setup() -> (tempfile::TempDir, AnnotationStore, String) {
    let dir = tempfile::TempDir::new().unwrap();
    let target = dir.path().join("a.ts");
    tokio::fs::write(&target, b"const x = 1;\n").await.unwrap();
    let store = AnnotationStore::open(dir.path().join("annotations.json")).await;
    (dir, store, target.to_string_lossy().into_owned())
}

#[tokio::test]
async fn version_counts_mutations_per_file() {
    let (_dir, mut store, target) = setup().await;

    // First annotation creates the entry at version 1.
    let first = store.add(&target, range((2, 0), (2, 5)), "todo").await.unwrap();
    assert_eq!(store.file_entry(&target).unwrap().version, 1);
    assert_eq!(store.file_entry(&target).unwrap().annotations.len(), 1);

    // Round-trip: the returned copy matches the authoritative one.
    let got = store.get_by_id(&target, &first.id).unwrap();
    assert_eq!(got.range, range((2, 0), (2, 5)));
    assert_eq!(got.content, "todo");

    // Every further mutation bumps by exactly one.
    let second = store.add(&target, range((4, 2), (4, 9)), "fixme").await.unwrap();
    assert_eq!(store.file_entry(&target).unwrap().version, 2);

    assert!(store.update_content(&target, &first.id, "done").await.unwrap());
    assert_eq!(store.file_entry(&target).unwrap().version, 3);

    assert!(store.delete(&target, &second.id).await.unwrap());
    assert_eq!(store.file_entry(&target).unwrap().version, 4);

    // Reads never bump.
    let _ = store.get_by_id(&target, &first.id);
    let _ = store.entries().count();
    assert_eq!(store.file_entry(&target).unwrap().version, 4);
}

#[tokio::test]
async fn deleting_last_annotation_removes_the_entry() {
    let (_dir, mut store, target) = setup().await;

    let only = store.add(&target, range((2, 0), (2, 5)), "todo").await.unwrap();
    assert!(store.delete(&target, &only.id).await.unwrap());

    assert!(store.file_entry(&target).is_none(), "entry should be gone");
    assert!(store.is_empty());
    assert_eq!(store.entries().count(), 0, "snapshot never holds empty lists");

    // Recreating the entry starts a fresh per-file counter.
    store.add(&target, range((0, 0), (0, 1)), "a").await.unwrap();
    store.add(&target, range((1, 0), (1, 1)), "b").await.unwrap();
    assert_eq!(store.file_entry(&target).unwrap().version, 2);
}

#[tokio::test]
async fn update_changes_content_and_timestamp_but_not_fingerprint() {
    let (dir, mut store, target) = setup().await;

    let note = store.add(&target, range((0, 0), (0, 5)), "v1").await.unwrap();
    let hash_at_add = store.file_entry(&target).unwrap().file_hash.clone();
    assert_eq!(hash_at_add, fingerprint::fingerprint_of(&target).await.unwrap());

    // Drift the target on disk. A content edit must NOT pick this up — the
    // fingerprint tracks add/delete, not note-payload edits.
    tokio::fs::write(dir.path().join("a.ts"), b"const x = 2;\n")
        .await
        .unwrap();
    assert!(store.update_content(&target, &note.id, "v2").await.unwrap());

    let entry = store.file_entry(&target).unwrap();
    assert_eq!(entry.file_hash, hash_at_add, "fingerprint untouched by content edit");
    let updated = store.get_by_id(&target, &note.id).unwrap();
    assert_eq!(updated.content, "v2");
    assert_eq!(updated.created_at, note.created_at, "created_at is immutable");
    assert!(updated.updated_at > note.updated_at, "updated_at refreshed");

    // A structural mutation does refresh it.
    let other = store.add(&target, range((1, 0), (1, 2)), "x").await.unwrap();
    let refreshed = store.file_entry(&target).unwrap().file_hash.clone();
    assert_ne!(refreshed, hash_at_add, "add recomputes the fingerprint");
    assert_eq!(refreshed, fingerprint::fingerprint_of(&target).await.unwrap());

    // Unrelated annotations keep their content through it all.
    assert_eq!(store.get_by_id(&target, &other.id).unwrap().content, "x");
}

#[tokio::test]
async fn delete_refreshes_fingerprint_when_target_readable() {
    let (dir, mut store, target) = setup().await;

    let first = store.add(&target, range((0, 0), (0, 3)), "a").await.unwrap();
    let _second = store.add(&target, range((1, 0), (1, 3)), "b").await.unwrap();
    let hash_before = store.file_entry(&target).unwrap().file_hash.clone();

    // Drift the target on disk, then delete a non-last annotation: the entry
    // survives and must carry the fresh hash.
    tokio::fs::write(dir.path().join("a.ts"), b"const x = 99;\n")
        .await
        .unwrap();
    assert!(store.delete(&target, &first.id).await.unwrap());

    let entry = store.file_entry(&target).unwrap();
    assert_ne!(entry.file_hash, hash_before, "delete recomputes the fingerprint");
    assert_eq!(entry.file_hash, fingerprint::fingerprint_of(&target).await.unwrap());
    assert_eq!(entry.annotations.len(), 1);
}

#[tokio::test]
async fn persisted_store_round_trips_exactly() {
    let (dir, mut store, target) = setup().await;
    let storage = dir.path().join("annotations.json");

    store.add(&target, range((2, 0), (2, 5)), "todo").await.unwrap();
    let note = store.add(&target, range((7, 1), (9, 0)), "spans lines").await.unwrap();
    store.update_content(&target, &note.id, "edited").await.unwrap();

    let before: Vec<_> = store
        .entries()
        .map(|(p, f)| (p.to_owned(), f.clone()))
        .collect();

    let reloaded = AnnotationStore::open(&storage).await;
    let after: Vec<_> = reloaded
        .entries()
        .map(|(p, f)| (p.to_owned(), f.clone()))
        .collect();

    assert_eq!(after, before, "ids, ranges, content, version, fingerprint all preserved");
}

#[tokio::test]
async fn unknown_id_or_path_is_a_no_op_without_save_or_event() {
    let (dir, mut store, target) = setup().await;
    let storage = dir.path().join("annotations.json");
    let mut rx = store.subscribe();

    // Nothing has ever been saved; a no-op must not create the document.
    assert!(!store.delete(&target, "no-such-id").await.unwrap());
    assert!(!store.delete("/unknown/path.ts", "no-such-id").await.unwrap());
    assert!(!store.update_content(&target, "no-such-id", "x").await.unwrap());
    assert!(!storage.exists(), "no-op must not trigger a save");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)), "no event fired");

    // Same negative results against a populated entry, state unchanged.
    let note = store.add(&target, range((0, 0), (0, 3)), "keep").await.unwrap();
    let _ = rx.recv().await.unwrap();
    assert!(!store.delete(&target, "still-wrong").await.unwrap());
    assert_eq!(store.file_entry(&target).unwrap().version, 1);
    assert_eq!(store.get_by_id(&target, &note.id).unwrap().content, "keep");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn every_successful_mutation_notifies_subscribers() {
    let (_dir, mut store, target) = setup().await;
    let mut rx = store.subscribe();

    let note = store.add(&target, range((0, 0), (0, 3)), "n").await.unwrap();
    store.update_content(&target, &note.id, "n2").await.unwrap();
    store.delete(&target, &note.id).await.unwrap();

    for _ in 0..3 {
        match rx.recv().await.unwrap() {
            marginalia_core::StoreEvent::AnnotationsChanged { path } => assert_eq!(path, target),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn corrupt_document_degrades_to_empty_and_is_set_aside() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = dir.path().join("annotations.json");
    tokio::fs::write(&storage, b"{ not json at all").await.unwrap();

    let mut store = AnnotationStore::open(&storage).await;
    assert!(store.is_empty(), "corrupt input starts empty, never panics");
    assert!(
        storage.with_extension("json.corrupt").exists(),
        "unparseable document preserved for manual recovery"
    );

    // The store is fully usable afterwards.
    let target = dir.path().join("a.ts").to_string_lossy().into_owned();
    store.add(&target, range((0, 0), (0, 1)), "fresh").await.unwrap();
    assert!(storage.exists());
}

#[tokio::test]
async fn missing_target_file_records_empty_fingerprint() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = AnnotationStore::open(dir.path().join("annotations.json")).await;

    store
        .add("/no/such/file.ts", range((2, 0), (2, 5)), "todo")
        .await
        .unwrap();

    let entry = store.file_entry("/no/such/file.ts").unwrap();
    assert_eq!(entry.file_hash, "", "unreadable target degrades to sentinel");
    assert_eq!(entry.version, 1);
}
