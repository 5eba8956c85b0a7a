use crate::library::{Changes, Command, Library};
use crate::ops::WatchOps;
use crate::progress::WatchProgress;
use crate::storage::{KeyValueStore, StorageError};
use crate::watchlist::Watchlist;
use tracing::warn;

/// Write-through access path: every mutation is persisted before the call returns.
///
/// A failed write does not roll anything back; in-memory state stays authoritative
/// and the failure is kept until `take_persist_error` collects it.
pub struct WatchContext<S: KeyValueStore> {
    library: Library<S>,
    persist_error: Option<StorageError>,
}

impl<S: KeyValueStore> WatchContext<S> {
    pub fn new(library: Library<S>) -> Self {
        Self {
            library,
            persist_error: None,
        }
    }

    pub fn open(store: S) -> Self {
        Self::new(Library::open(store))
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn into_library(self) -> Library<S> {
        self.library
    }

    /// Last persistence failure, if any, clearing it
    pub fn take_persist_error(&mut self) -> Option<StorageError> {
        self.persist_error.take()
    }
}

impl<S: KeyValueStore> WatchOps for WatchContext<S> {
    fn execute(&mut self, command: Command) -> Changes {
        let changes = self.library.apply(command);
        if changes.any() {
            if let Err(e) = self.library.flush(changes) {
                warn!("Failed to persist watchlist state: {}", e);
                self.persist_error = Some(e);
            }
        }
        changes
    }

    fn watchlist(&self) -> &Watchlist {
        self.library.watchlist()
    }

    fn watch_progress(&self) -> &WatchProgress {
        self.library.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore, PROGRESS_KEY, WATCHLIST_KEY};
    use reelshelf_models::{CatalogItem, WatchStatus, WatchlistPatch};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Option<Value> {
            None
        }

        fn save(&self, key: &str, _value: &Value) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn clear(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let store = MemoryStore::new();
        let mut context = WatchContext::open(store.clone());

        context.add_to_watchlist(CatalogItem::new("a", "A"));
        assert_eq!(
            store.load(WATCHLIST_KEY),
            Some(json!([{ "src": "a", "title": "A", "note": "", "status": "Plan to Watch" }]))
        );

        context.update_note_status("a", "great", WatchStatus::Finished);
        assert_eq!(
            store.load(WATCHLIST_KEY),
            Some(json!([{ "src": "a", "title": "A", "note": "great", "status": "Finished" }]))
        );

        context.remove_from_watchlist("a");
        assert_eq!(store.load(WATCHLIST_KEY), Some(json!([])));
    }

    #[test]
    fn test_no_op_does_not_write() {
        let store = MemoryStore::new();
        let mut context = WatchContext::open(store.clone());
        let changes = context.update_progress("ghost", 50.0);
        assert!(!changes.any());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_and_start_then_remove_and_clear() {
        let store = MemoryStore::new();
        let mut context = WatchContext::open(store.clone());

        context.add_and_start_watching(CatalogItem::new("b", "B"));
        assert!(context.is_in_watchlist("b"));
        assert_eq!(context.get_progress("b").unwrap().progress, 0);
        assert_eq!(store.load(PROGRESS_KEY).unwrap()["b"]["progress"], json!(0));

        context.remove_and_clear_progress("b");
        assert!(!context.is_in_watchlist("b"));
        assert!(!context.has_progress("b"));
        assert_eq!(store.load(WATCHLIST_KEY), Some(json!([])));
        assert_eq!(store.load(PROGRESS_KEY), Some(json!({})));
    }

    #[test]
    fn test_state_survives_reopen_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut context = WatchContext::open(FileStore::new(dir.path()));
            context.add_to_watchlist(CatalogItem::new("a", "A"));
            context.edit_watchlist_item(WatchlistPatch {
                category: Some("Sci-Fi".to_string()),
                ..WatchlistPatch::new("a")
            });
            context.start_watching("a", "film");
            context.update_progress("a", 64.0);
        }

        let context = WatchContext::open(FileStore::new(dir.path()));
        let entry = context.watchlist().get("a").unwrap();
        assert_eq!(entry.category.as_deref(), Some("Sci-Fi"));
        assert_eq!(context.get_progress("a").unwrap().progress, 64);
    }

    #[test]
    fn test_failed_watchlist_write_is_retried_on_next_mutation() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join(format!("{}.json", WATCHLIST_KEY));
        // A directory where the document should go makes the rename fail
        std::fs::create_dir_all(&blocker).unwrap();

        let mut context = WatchContext::open(FileStore::new(dir.path()));
        context.add_and_start_watching(CatalogItem::new("b", "B"));
        assert!(context.take_persist_error().is_some());
        assert!(context.library().unsaved().watchlist);
        assert!(!context.library().unsaved().progress);

        std::fs::remove_dir(&blocker).unwrap();
        context.update_progress("b", 40.0);
        assert!(context.take_persist_error().is_none());
        assert!(!context.library().unsaved().any());

        let reopened = WatchContext::open(FileStore::new(dir.path()));
        assert!(reopened.is_in_watchlist("b"));
        assert_eq!(reopened.get_progress("b").unwrap().progress, 40);
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut context = WatchContext::open(ReadOnlyStore);
        let changes = context.add_to_watchlist(CatalogItem::new("a", "A"));

        assert!(changes.watchlist);
        assert!(context.is_in_watchlist("a"));
        let err = context.take_persist_error().unwrap();
        assert!(err.to_string().contains("watchlist"));
        assert!(context.take_persist_error().is_none());
    }
}
