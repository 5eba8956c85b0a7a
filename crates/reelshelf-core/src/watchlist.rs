use reelshelf_models::{CatalogItem, WatchStatus, WatchlistEntry, WatchlistPatch};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ordered watchlist, at most one entry per `src`. Insertion order is display order.
///
/// Pure in-memory state: every mutator reports whether anything changed and
/// leaves persistence to the owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored entries. Later duplicates of a `src` are dropped so the
    /// uniqueness invariant holds even for hand-edited files.
    pub fn from_entries(entries: Vec<WatchlistEntry>) -> Self {
        let mut seen = HashSet::new();
        let total = entries.len();
        let entries: Vec<WatchlistEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.src.clone()))
            .collect();
        if entries.len() != total {
            warn!("Dropped {} duplicate watchlist entries", total - entries.len());
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, src: &str) -> Option<&WatchlistEntry> {
        self.entries.iter().find(|entry| entry.src == src)
    }

    pub fn contains(&self, src: &str) -> bool {
        self.entries.iter().any(|entry| entry.src == src)
    }

    pub fn with_status(&self, status: WatchStatus) -> impl Iterator<Item = &WatchlistEntry> {
        self.entries.iter().filter(move |entry| entry.status == status)
    }

    /// Append a new entry for `item` unless its key is already listed
    pub fn add(&mut self, item: &CatalogItem) -> bool {
        let Some(entry) = WatchlistEntry::from_item(item) else {
            debug!("Ignoring watchlist add for item without src or id: {:?}", item.title);
            return false;
        };
        if self.contains(&entry.src) {
            debug!("Already in watchlist: {}", entry.src);
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, src: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.src != src);
        let removed = self.entries.len() != before;
        if !removed {
            debug!("Not in watchlist, nothing to remove: {}", src);
        }
        removed
    }

    pub fn update_note_status(&mut self, src: &str, note: &str, status: WatchStatus) -> bool {
        match self.entries.iter_mut().find(|entry| entry.src == src) {
            Some(entry) => {
                entry.note = note.to_string();
                entry.status = status;
                true
            }
            None => {
                debug!("Not in watchlist, note/status ignored: {}", src);
                false
            }
        }
    }

    pub fn edit(&mut self, patch: &WatchlistPatch) -> bool {
        match self.entries.iter_mut().find(|entry| entry.src == patch.src) {
            Some(entry) => {
                patch.apply_to(entry);
                true
            }
            None => {
                debug!("Not in watchlist, edit ignored: {}", patch.src);
                false
            }
        }
    }
}
