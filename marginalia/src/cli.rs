//! Command-line surface of the marginalia binary.
//!
//! Positions on the command line are written `LINE:COL`, zero-based, matching
//! how the core model addresses text. Ranges are half-open: the end position
//! is exclusive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marginalia_core::Position;

/// Attach notes to character ranges in source files and keep them with the
/// project.
#[derive(Debug, Parser)]
#[command(name = "marginalia", version, about)]
pub struct Cli {
    /// Workspace root holding the `.marginalia` directory. Defaults to the
    /// current directory; pass `--no-workspace` to use the global store.
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Use the global per-user store instead of a workspace-local one.
    #[arg(long, global = true, conflicts_with = "workspace")]
    pub no_workspace: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Attach a note to a character range in a file.
    Add {
        /// Target source file.
        file: PathBuf,
        /// Start of the range, inclusive (LINE:COL, zero-based).
        #[arg(value_parser = parse_position)]
        start: Position,
        /// End of the range, exclusive (LINE:COL, zero-based).
        #[arg(value_parser = parse_position)]
        end: Position,
        /// Note text. May be empty.
        text: String,
    },
    /// List annotated files and their notes.
    List {
        /// Restrict the listing to one file.
        file: Option<PathBuf>,
    },
    /// Print one note in full.
    Show { file: PathBuf, id: String },
    /// Replace the text of a note.
    Edit { file: PathBuf, id: String, text: String },
    /// Delete a note.
    Delete { file: PathBuf, id: String },
    /// Find the note under a position, if any.
    At {
        file: PathBuf,
        /// Cursor position (LINE:COL, zero-based).
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Compare a file's recorded fingerprint against its current content.
    Check { file: PathBuf },
}

/// Parses `LINE:COL` into a [`Position`].
fn parse_position(s: &str) -> Result<Position, String> {
    let (line, character) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got {s:?}"))?;
    let line = line
        .parse::<u32>()
        .map_err(|e| format!("bad line number {line:?}: {e}"))?;
    let character = character
        .parse::<u32>()
        .map_err(|e| format!("bad column number {character:?}: {e}"))?;
    Ok(Position::new(line, character))
}
