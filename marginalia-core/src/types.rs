use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A zero-based (line, character) position within a text document.
///
/// Ordering is lexicographic: first by line, then by character. This is what
/// makes half-open range containment a pair of comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open span of text: `start` inclusive, `end` exclusive.
///
/// This is a plain-data type with no editor-toolkit geometry behind it; the
/// presentation layer converts to its own range type at the boundary. A
/// degenerate range (`start == end`) is valid — it marks a point in the
/// document and contains no position.
///
/// Serialized flattened into the note object as `startLine`, `startCharacter`,
/// `endLine`, `endCharacter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRange {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl AnnotationRange {
    /// Builds a range from two positions. `end` must not precede `start`:
    /// callers construct ranges from editor selections, which are ordered,
    /// and an inverted range would contain no position at all. Debug builds
    /// assert the ordering so embedders hit the contract early.
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "range end precedes start");
        Self {
            start_line: start.line,
            start_character: start.character,
            end_line: end.line,
            end_character: end.character,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_character)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_character)
    }

    /// True for a degenerate point range (`start == end`).
    pub fn is_point(&self) -> bool {
        self.start() == self.end()
    }

    /// Half-open containment: `start <= position < end`.
    ///
    /// A point range contains nothing, including its own start.
    pub fn contains(&self, position: Position) -> bool {
        self.start() <= position && position < self.end()
    }
}

/// A single user note anchored to a range in a source file.
///
/// `id` is UUID v4 text, generated at creation, never reused. `created_at` is
/// immutable; `updated_at` is refreshed on every content mutation. Wire keys
/// are camelCase with the range fields flattened alongside the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    #[serde(flatten)]
    pub range: AnnotationRange,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The per-file record aggregating all annotations for one source file.
///
/// `version` is a per-file change counter: +1 on every add, delete, or
/// content edit, never on reads. It is preserved in the wire contract as an
/// optimistic counter for future conflict detection, not consumed today.
///
/// `file_hash` is the fingerprint of the *target source file* captured at the
/// last add or delete — content edits to a note do not refresh it, since it
/// tracks the annotated file, not the note payload. Empty string when the
/// target could not be read at mutation time.
///
/// An `AnnotationFile` with zero annotations is never stored: the owning map
/// entry is removed instead, and recreated at `version = 1` on the next add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationFile {
    pub version: u64,
    pub file_hash: String,
    #[serde(rename = "notes")]
    pub annotations: Vec<Annotation>,
}
