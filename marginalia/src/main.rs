//! marginalia — notes anchored to character ranges in source files.
//!
//! Entry point for the `marginalia` binary. Wires together logging, the
//! optional user config, storage-location resolution, and the annotation
//! store + active index context that every command handler receives.
//!
//! # Startup sequence
//!
//! 1. Initialise tracing — diagnostics go to stderr so command output on
//!    stdout stays clean for shell pipelines.
//! 2. Parse the CLI.
//! 3. Load the user config — read-only, soft failures only.
//! 4. Resolve the storage path (workspace dotdir or global fallback) and
//!    open the store. Opening never fails: missing or corrupt documents
//!    degrade to an empty store with a log line.
//! 5. Build the [`commands::AppContext`] once and pass it by reference to
//!    the dispatcher — no global state.

mod cli;
mod commands;
mod config;

use clap::Parser;
use marginalia_core::index::ActiveAnnotationIndex;
use marginalia_core::location;
use marginalia_core::store::AnnotationStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Step 1: logging to stderr, filterable via RUST_LOG, quiet by default.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Step 2: parse arguments.
    let args = cli::Cli::parse();

    // Step 3: user config — defaults on any failure.
    let cfg = config::load();

    // Step 4: resolve the storage location and open the store.
    let workspace = if args.no_workspace {
        None
    } else {
        match args.workspace.clone() {
            Some(root) => Some(root),
            None => Some(std::env::current_dir()?),
        }
    };
    let storage = location::storage_path(workspace.as_deref(), &cfg.notes_file);
    tracing::debug!(storage = %storage.display(), "opening annotation store");
    let store = AnnotationStore::open(storage).await;

    // Step 5: one context, passed down by reference.
    let mut ctx = commands::AppContext {
        store,
        index: ActiveAnnotationIndex::new(),
    };
    commands::run(&mut ctx, args.command).await
}
