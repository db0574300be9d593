//! Command handlers: the CLI's editor-surface and panel-view roles.
//!
//! Every handler goes through the store's mutators — nothing here touches
//! persisted state directly — and negative results (unknown id, nothing
//! under the cursor) are reported as plain output, not errors. Only a failed
//! save is an error, because it means the user's change was lost.

use std::path::Path;

use anyhow::{bail, Context};
use marginalia_core::fingerprint;
use marginalia_core::index::ActiveAnnotationIndex;
use marginalia_core::store::AnnotationStore;
use marginalia_core::types::{Annotation, AnnotationRange, Position};

use crate::cli::Command;

/// Everything the handlers need, constructed once at startup and passed by
/// reference — no ambient global state.
pub struct AppContext {
    pub store: AnnotationStore,
    pub index: ActiveAnnotationIndex,
}

/// Dispatches one parsed command against the context.
pub async fn run(ctx: &mut AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Add { file, start, end, text } => add(ctx, &file, start, end, text).await,
        Command::List { file } => list(ctx, file.as_deref()),
        Command::Show { file, id } => show(ctx, &file, &id),
        Command::Edit { file, id, text } => edit(ctx, &file, &id, text).await,
        Command::Delete { file, id } => delete(ctx, &file, &id).await,
        Command::At { file, position } => at(ctx, &file, position),
        Command::Check { file } => check(ctx, &file).await,
    }
}

/// Store keys are absolute paths; relative CLI arguments resolve against the
/// current directory. The target does not have to exist — annotating a file
/// that is temporarily missing only costs the fingerprint.
fn store_key(file: &Path) -> anyhow::Result<String> {
    let abs = std::path::absolute(file)
        .with_context(|| format!("cannot resolve path {}", file.display()))?;
    Ok(abs.to_string_lossy().into_owned())
}

async fn add(
    ctx: &mut AppContext,
    file: &Path,
    start: Position,
    end: Position,
    text: String,
) -> anyhow::Result<()> {
    if end < start {
        bail!("range end {}:{} precedes start {}:{}", end.line, end.character, start.line, start.character);
    }
    let key = store_key(file)?;
    let range = AnnotationRange::new(start, end);

    let annotation = ctx
        .store
        .add(&key, range, text)
        .await
        .context("note not saved — the annotation store could not be written")?;
    // Mutation hook: keep the open-file cache in step with the store.
    ctx.index.rebuild(&key, &ctx.store);

    println!("added {} to {}", annotation.id, key);
    Ok(())
}

fn list(ctx: &AppContext, file: Option<&Path>) -> anyhow::Result<()> {
    let only = file.map(store_key).transpose()?;
    let mut shown = 0usize;

    for (path, entry) in ctx.store.entries() {
        if let Some(ref only) = only {
            if path != only {
                continue;
            }
        }
        println!(
            "{} ({} note{}, version {})",
            path,
            entry.annotations.len(),
            if entry.annotations.len() == 1 { "" } else { "s" },
            entry.version
        );
        for annotation in &entry.annotations {
            println!("  {}", summary(annotation));
        }
        shown += 1;
    }

    if shown == 0 {
        match only {
            Some(path) => println!("no annotations for {path}"),
            None => println!("no annotations"),
        }
    }
    Ok(())
}

fn show(ctx: &AppContext, file: &Path, id: &str) -> anyhow::Result<()> {
    let key = store_key(file)?;
    match ctx.store.get_by_id(&key, id) {
        Some(annotation) => {
            println!("id:      {}", annotation.id);
            println!("range:   {}", range_display(annotation));
            println!("created: {}", annotation.created_at.to_rfc3339());
            println!("updated: {}", annotation.updated_at.to_rfc3339());
            println!();
            println!("{}", annotation.content);
        }
        None => println!("no annotation {id} in {key}"),
    }
    Ok(())
}

async fn edit(ctx: &mut AppContext, file: &Path, id: &str, text: String) -> anyhow::Result<()> {
    let key = store_key(file)?;
    let updated = ctx
        .store
        .update_content(&key, id, text)
        .await
        .context("edit not saved — the annotation store could not be written")?;
    if updated {
        ctx.index.rebuild(&key, &ctx.store);
        println!("updated {id}");
    } else {
        println!("no annotation {id} in {key}");
    }
    Ok(())
}

async fn delete(ctx: &mut AppContext, file: &Path, id: &str) -> anyhow::Result<()> {
    let key = store_key(file)?;
    let removed = ctx
        .store
        .delete(&key, id)
        .await
        .context("delete not saved — the annotation store could not be written")?;
    if removed {
        ctx.index.rebuild(&key, &ctx.store);
        println!("deleted {id}");
    } else {
        println!("no annotation {id} in {key}");
    }
    Ok(())
}

fn at(ctx: &mut AppContext, file: &Path, position: Position) -> anyhow::Result<()> {
    let key = store_key(file)?;
    // Open-document hook: populate the cache before querying it.
    ctx.index.rebuild(&key, &ctx.store);
    match ctx.index.lookup(&key, position) {
        Some(active) => {
            println!("{}  {}", short_id(&active.id), first_line(&active.content));
        }
        None => println!(
            "nothing at {}:{} in {key}",
            position.line, position.character
        ),
    }
    Ok(())
}

async fn check(ctx: &AppContext, file: &Path) -> anyhow::Result<()> {
    let key = store_key(file)?;
    let Some(entry) = ctx.store.file_entry(&key) else {
        println!("no annotations for {key}");
        return Ok(());
    };
    if entry.file_hash.is_empty() {
        println!("{key}: annotated while unreadable — no fingerprint to compare");
        return Ok(());
    }
    match fingerprint::has_drifted(&key, &entry.file_hash).await {
        Ok(true) => println!("{key}: file changed since notes were anchored — ranges may be stale"),
        Ok(false) => println!("{key}: up to date"),
        Err(e) => println!("{key}: cannot read file now ({e})"),
    }
    Ok(())
}

fn summary(annotation: &Annotation) -> String {
    format!(
        "{}  {}  {}",
        short_id(&annotation.id),
        range_display(annotation),
        first_line(&annotation.content)
    )
}

/// First eight characters of an id — enough to tell UUIDs apart visually.
/// Truncates on character boundaries, so it cannot panic even if an id is
/// ever not plain ASCII.
fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(8).map_or(id.len(), |(i, _)| i);
    &id[..end]
}

fn range_display(annotation: &Annotation) -> String {
    let r = &annotation.range;
    format!(
        "{}:{}-{}:{}",
        r.start_line, r.start_character, r.end_line, r.end_character
    )
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}
