use super::{report_persist_error, Env};
use crate::output::{watchlist_table, Output};
use crate::WatchlistCommands;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use reelshelf_core::{Command, WatchOps, WatchStore};
use reelshelf_models::{CatalogItem, WatchStatus};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

pub async fn run_watchlist(cmd: WatchlistCommands, env: &Env, output: &Output) -> Result<()> {
    match cmd {
        WatchlistCommands::List { status } => list(status.as_deref(), env, output),
        WatchlistCommands::Add { src, fields, kind, start } => {
            let item = fields.to_catalog_item(&src, kind);
            add(item, start, env, output)
        }
        WatchlistCommands::Remove { src, clear_progress } => remove(&src, clear_progress, env, output),
        WatchlistCommands::Note { src, note, status, progress } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            annotate(&src, note, status, progress, env, output)
        }
        WatchlistCommands::Edit { src, fields, kind } => {
            let patch = fields.to_patch(&src, kind);
            if patch.is_empty() {
                output.warn("Nothing to change. Pass at least one of --title, --description, --rating, --category or --type");
                return Ok(());
            }
            let mut context = env.watch_context();
            let changes = context.edit_watchlist_item(patch);
            report_persist_error(&mut context, output)?;
            if changes.any() {
                output.success(format!("Updated {}", src));
            } else {
                output.warn(format!("{} is not on the watchlist", src));
            }
            Ok(())
        }
        WatchlistCommands::Check { src } => {
            let context = env.watch_context();
            let listed = context.is_in_watchlist(&src);
            if output.is_human() {
                if listed {
                    output.success(format!("{} is on the watchlist", src));
                } else {
                    output.info(format!("{} is not on the watchlist", src));
                }
            } else {
                output.json(&json!({ "src": src, "inWatchlist": listed }));
            }
            Ok(())
        }
        WatchlistCommands::Import { file, start } => import(&file, start, env, output),
    }
}

fn parse_status(raw: &str) -> Result<WatchStatus> {
    raw.parse::<WatchStatus>().map_err(|e| eyre!(e))
}

fn list(status: Option<&str>, env: &Env, output: &Output) -> Result<()> {
    let filter = status.map(parse_status).transpose()?;
    let context = env.watch_context();
    let entries: Vec<_> = match filter {
        Some(status) => context.watchlist().with_status(status).collect(),
        None => context.watchlist().entries().iter().collect(),
    };

    if !output.is_human() {
        output.json(&json!({ "watchlist": entries }));
        return Ok(());
    }

    if entries.is_empty() {
        output.info("Your watchlist is empty");
        return Ok(());
    }
    output.table(&watchlist_table(entries.iter().copied(), context.watch_progress()));
    Ok(())
}

fn add(item: CatalogItem, start: bool, env: &Env, output: &Output) -> Result<()> {
    let key = item.key().map(str::to_string).unwrap_or_default();
    let mut context = env.watch_context();

    if context.is_in_watchlist(&key) && !start {
        output.info(format!("{} is already on the watchlist", key));
        return Ok(());
    }

    let changes = if start {
        context.add_and_start_watching(item)
    } else {
        context.add_to_watchlist(item)
    };
    report_persist_error(&mut context, output)?;

    debug!(src = %key, ?changes, "watchlist add");
    if changes.watchlist {
        output.success(format!("Added {} to the watchlist", key));
    }
    if changes.progress {
        output.success(format!("Started tracking {}", key));
    }
    Ok(())
}

fn remove(src: &str, clear_progress: bool, env: &Env, output: &Output) -> Result<()> {
    let mut context = env.watch_context();
    let changes = if clear_progress {
        context.remove_and_clear_progress(src)
    } else {
        context.remove_from_watchlist(src)
    };
    report_persist_error(&mut context, output)?;

    if !changes.any() {
        output.warn(format!("{} is not on the watchlist", src));
        return Ok(());
    }
    if changes.watchlist {
        output.success(format!("Removed {} from the watchlist", src));
    }
    if changes.progress {
        output.success(format!("Cleared progress for {}", src));
    }
    Ok(())
}

fn annotate(
    src: &str,
    note: Option<String>,
    status: Option<WatchStatus>,
    progress: Option<f64>,
    env: &Env,
    output: &Output,
) -> Result<()> {
    let mut context = env.watch_context();
    let Some(current) = context.watchlist().get(src).cloned() else {
        output.warn(format!("{} is not on the watchlist", src));
        return Ok(());
    };

    let note = note.unwrap_or(current.note);
    let status = status.unwrap_or(current.status);
    let changes = context.update_item_with_progress(src, &note, status, progress);
    report_persist_error(&mut context, output)?;

    if progress.is_some() && !changes.progress {
        output.warn(format!(
            "{} is not being tracked yet; run 'reelshelf progress start {}' first",
            src, src
        ));
    }
    output.success(format!("Updated {} ({})", src, status));
    Ok(())
}

/// Add every item of a JSON array in one batch and save once at the end
fn import(file: &Path, start: bool, env: &Env, output: &Output) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of items", file.display()))?;

    let mut store = WatchStore::open(env.file_store()).with_autosave(false);
    let before = store.watchlist().len();
    let mut skipped = 0usize;
    for item in items {
        if item.key().is_none() {
            skipped += 1;
            continue;
        }
        let command = if start {
            Command::AddAndStartWatching(item)
        } else {
            Command::AddToWatchlist(item)
        };
        store.dispatch(command);
    }
    let added = store.watchlist().len() - before;

    store
        .save_to_local_storage()
        .map_err(|e| eyre!("Failed to save imported items: {}", e))?;

    info!(added, skipped, file = %file.display(), "watchlist import finished");
    if skipped > 0 {
        output.warn(format!("Skipped {} item(s) without a src or id", skipped));
    }
    output.success(format!("Imported {} new item(s)", added));
    Ok(())
}
