use crate::library::{Changes, Command};
use crate::progress::WatchProgress;
use crate::watchlist::Watchlist;
use reelshelf_models::{CatalogItem, ProgressRecord, WatchStatus, WatchlistPatch};

/// Watchlist and progress operations shared by every access path.
///
/// Implementors only decide how a command is executed (and when it is persisted);
/// the operations themselves are defined once here.
pub trait WatchOps {
    fn execute(&mut self, command: Command) -> Changes;
    fn watchlist(&self) -> &Watchlist;
    fn watch_progress(&self) -> &WatchProgress;

    fn add_to_watchlist(&mut self, item: CatalogItem) -> Changes {
        self.execute(Command::AddToWatchlist(item))
    }

    fn remove_from_watchlist(&mut self, src: &str) -> Changes {
        self.execute(Command::RemoveFromWatchlist(src.to_string()))
    }

    fn update_note_status(&mut self, src: &str, note: &str, status: WatchStatus) -> Changes {
        self.execute(Command::UpdateNoteStatus {
            src: src.to_string(),
            note: note.to_string(),
            status,
        })
    }

    fn edit_watchlist_item(&mut self, patch: WatchlistPatch) -> Changes {
        self.execute(Command::EditWatchlistItem(patch))
    }

    fn is_in_watchlist(&self, src: &str) -> bool {
        self.watchlist().contains(src)
    }

    fn start_watching(&mut self, id: &str, kind: &str) -> Changes {
        self.execute(Command::StartWatching {
            id: id.to_string(),
            kind: kind.to_string(),
        })
    }

    fn update_progress(&mut self, id: &str, progress: f64) -> Changes {
        self.execute(Command::UpdateProgress {
            id: id.to_string(),
            progress,
        })
    }

    fn remove_progress(&mut self, id: &str) -> Changes {
        self.execute(Command::RemoveProgress(id.to_string()))
    }

    fn get_progress(&self, id: &str) -> Option<&ProgressRecord> {
        self.watch_progress().get(id)
    }

    fn has_progress(&self, id: &str) -> bool {
        self.watch_progress().has(id)
    }

    fn add_and_start_watching(&mut self, item: CatalogItem) -> Changes {
        self.execute(Command::AddAndStartWatching(item))
    }

    fn remove_and_clear_progress(&mut self, key: &str) -> Changes {
        self.execute(Command::RemoveAndClearProgress(key.to_string()))
    }

    fn update_item_with_progress(
        &mut self,
        key: &str,
        note: &str,
        status: WatchStatus,
        progress: Option<f64>,
    ) -> Changes {
        self.execute(Command::UpdateWithProgress {
            key: key.to_string(),
            note: note.to_string(),
            status,
            progress,
        })
    }
}
