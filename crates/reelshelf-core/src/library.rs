use crate::clock::{Clock, SystemClock};
use crate::progress::WatchProgress;
use crate::storage::{load_as, KeyValueStore, StorageError, PROGRESS_KEY, WATCHLIST_KEY};
use crate::watchlist::Watchlist;
use reelshelf_models::{CatalogItem, ProgressRecord, WatchStatus, WatchlistEntry, WatchlistPatch, DEFAULT_KIND};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single mutation of the watchlist/progress aggregate.
///
/// Combined commands touch both collections within one `apply`, so they are
/// flushed together and never observed half-applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddToWatchlist(CatalogItem),
    RemoveFromWatchlist(String),
    UpdateNoteStatus {
        src: String,
        note: String,
        status: WatchStatus,
    },
    EditWatchlistItem(WatchlistPatch),
    StartWatching {
        id: String,
        kind: String,
    },
    UpdateProgress {
        id: String,
        progress: f64,
    },
    RemoveProgress(String),
    /// Add to the watchlist, then restart progress for the item's key
    AddAndStartWatching(CatalogItem),
    /// Remove from the watchlist, then drop the progress record for the same key
    RemoveAndClearProgress(String),
    /// Note/status update plus an optional progress update for the same key
    UpdateWithProgress {
        key: String,
        note: String,
        status: WatchStatus,
        progress: Option<f64>,
    },
}

impl Command {
    /// Start watching with the default `film` type
    pub fn start_watching(id: impl Into<String>) -> Self {
        Command::StartWatching {
            id: id.into(),
            kind: DEFAULT_KIND.to_string(),
        }
    }
}

/// Which persisted collections a command modified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub watchlist: bool,
    pub progress: bool,
}

impl Changes {
    pub const NONE: Changes = Changes { watchlist: false, progress: false };
    pub const ALL: Changes = Changes { watchlist: true, progress: true };

    pub fn watchlist(changed: bool) -> Self {
        Self { watchlist: changed, progress: false }
    }

    pub fn progress(changed: bool) -> Self {
        Self { watchlist: false, progress: changed }
    }

    pub fn any(&self) -> bool {
        self.watchlist || self.progress
    }

    pub fn merge(self, other: Changes) -> Self {
        Self {
            watchlist: self.watchlist || other.watchlist,
            progress: self.progress || other.progress,
        }
    }
}

/// The watchlist and progress map as one aggregate, mirrored into a `KeyValueStore`.
///
/// Constructed explicitly and passed to whichever adapter needs it; both
/// collections are rehydrated once at `open`.
pub struct Library<S: KeyValueStore> {
    watchlist: Watchlist,
    progress: WatchProgress,
    store: S,
    clock: Arc<dyn Clock>,
    // Collections whose last write failed; retried on every flush until one succeeds
    unsaved: Changes,
}

impl<S: KeyValueStore> Library<S> {
    pub fn open(store: S) -> Self {
        Self::open_with_clock(store, Arc::new(SystemClock))
    }

    pub fn open_with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        let mut library = Self {
            watchlist: Watchlist::new(),
            progress: WatchProgress::new(),
            store,
            clock,
            unsaved: Changes::NONE,
        };
        library.reload();
        library
    }

    /// Replace in-memory state with what storage holds.
    ///
    /// Missing or malformed documents are empty. Inside a well-formed document each
    /// element is read on its own, so one unreadable record is skipped without
    /// losing the others.
    pub fn reload(&mut self) {
        let entries = load_as::<Vec<Value>, _>(&self.store, WATCHLIST_KEY)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| read_element::<WatchlistEntry>(WATCHLIST_KEY, &index.to_string(), value))
            .collect();
        self.watchlist = Watchlist::from_entries(entries);

        let records: BTreeMap<String, ProgressRecord> = load_as::<Map<String, Value>, _>(&self.store, PROGRESS_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, value)| read_element(PROGRESS_KEY, &id, value).map(|record| (id, record)))
            .collect();
        self.progress = WatchProgress::from_records(records);

        self.unsaved = Changes::NONE;
        info!(
            "Loaded library: {} watchlist entries, {} progress records",
            self.watchlist.len(),
            self.progress.len()
        );
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn progress(&self) -> &WatchProgress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply `command` to the in-memory state only
    pub fn apply(&mut self, command: Command) -> Changes {
        let now = self.clock.now();
        debug!(?command, "Applying command");

        match command {
            Command::AddToWatchlist(item) => Changes::watchlist(self.watchlist.add(&item)),
            Command::RemoveFromWatchlist(src) => Changes::watchlist(self.watchlist.remove(&src)),
            Command::UpdateNoteStatus { src, note, status } => {
                Changes::watchlist(self.watchlist.update_note_status(&src, &note, status))
            }
            Command::EditWatchlistItem(patch) => Changes::watchlist(self.watchlist.edit(&patch)),
            Command::StartWatching { id, kind } => {
                self.progress.start(&id, &kind, now);
                Changes::progress(true)
            }
            Command::UpdateProgress { id, progress } => {
                Changes::progress(self.progress.update(&id, progress, now))
            }
            Command::RemoveProgress(id) => Changes::progress(self.progress.remove(&id)),
            Command::AddAndStartWatching(item) => {
                let Some(key) = item.key().map(str::to_string) else {
                    debug!("Ignoring add-and-start for item without src or id");
                    return Changes::NONE;
                };
                let added = self.watchlist.add(&item);
                self.progress.start(&key, item.kind(), now);
                Changes { watchlist: added, progress: true }
            }
            Command::RemoveAndClearProgress(key) => Changes {
                watchlist: self.watchlist.remove(&key),
                progress: self.progress.remove(&key),
            },
            Command::UpdateWithProgress { key, note, status, progress } => {
                let watchlist = self.watchlist.update_note_status(&key, &note, status);
                let progress = progress
                    .map(|value| self.progress.update(&key, value, now))
                    .unwrap_or(false);
                Changes { watchlist, progress }
            }
        }
    }

    /// Collections changed in memory whose last write failed
    pub fn unsaved(&self) -> Changes {
        self.unsaved
    }

    /// Write the collections named in `changes`, plus any whose earlier write failed.
    ///
    /// Every pending key is attempted; the first failure is returned and the keys
    /// that failed stay pending for the next flush.
    pub fn flush(&mut self, changes: Changes) -> Result<(), StorageError> {
        let pending = self.unsaved.merge(changes);
        let mut first_error = None;

        let watchlist = pending.watchlist && self.try_save(WATCHLIST_KEY, &self.watchlist, &mut first_error);
        let progress = pending.progress && self.try_save(PROGRESS_KEY, &self.progress, &mut first_error);
        self.unsaved = Changes {
            watchlist: pending.watchlist && !watchlist,
            progress: pending.progress && !progress,
        };

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn save_all(&mut self) -> Result<(), StorageError> {
        self.flush(Changes::ALL)
    }

    fn try_save<T: serde::Serialize>(
        &self,
        key: &str,
        data: &T,
        first_error: &mut Option<StorageError>,
    ) -> bool {
        match self.save_key(key, data) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save {}, will retry on the next write: {}", key, e);
                first_error.get_or_insert(e);
                false
            }
        }
    }

    fn save_key<T: serde::Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(data).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.save(key, &value)
    }
}

fn read_element<T: DeserializeOwned>(key: &str, position: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(element) => Some(element),
        Err(e) => {
            warn!("Skipping unreadable {} element {}: {}", key, position, e);
            None
        }
    }
}
