use super::Env;
use crate::output::Output;
use color_eyre::Result;
use reelshelf_core::{FileStore, KeyValueStore, PROGRESS_KEY, WATCHLIST_KEY};

pub async fn run_clear(watchlist: bool, progress: bool, all: bool, env: &Env, output: &Output) -> Result<()> {
    let store = env.file_store();

    if all {
        clear_key(&store, WATCHLIST_KEY, "watchlist", output)?;
        clear_key(&store, PROGRESS_KEY, "watch progress", output)?;
        output.success("Watchlist and watch progress cleared");
        return Ok(());
    }

    if !watchlist && !progress {
        output.warn("No clear option specified. Use --watchlist, --progress, or --all");
        output.info("\nExample: reelshelf clear --progress");
        return Ok(());
    }

    if watchlist {
        clear_key(&store, WATCHLIST_KEY, "watchlist", output)?;
    }
    if progress {
        clear_key(&store, PROGRESS_KEY, "watch progress", output)?;
    }

    Ok(())
}

fn clear_key(store: &FileStore, key: &str, label: &str, output: &Output) -> Result<()> {
    if !store.path_for(key)?.exists() {
        output.info(format!("No stored {} to clear", label));
        return Ok(());
    }
    store
        .clear(key)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to clear {}: {}", label, e))?;
    output.success(format!("Cleared {}", label));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use reelshelf_core::WatchOps;
    use reelshelf_models::CatalogItem;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_progress_keeps_watchlist() {
        let dir = TempDir::new().unwrap();
        let env = Env::rooted_at(dir.path());
        let output = Output::new(OutputFormat::Json, true);

        let mut context = env.watch_context();
        context.add_and_start_watching(CatalogItem::new("a", "A"));
        assert!(context.take_persist_error().is_none());

        run_clear(false, true, false, &env, &output).await.unwrap();

        let context = env.watch_context();
        assert!(context.is_in_watchlist("a"));
        assert!(!context.has_progress("a"));

        run_clear(false, false, true, &env, &output).await.unwrap();
        assert!(env.watch_context().watchlist().is_empty());
    }
}
