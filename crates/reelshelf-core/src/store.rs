use crate::library::{Changes, Command, Library};
use crate::ops::WatchOps;
use crate::progress::WatchProgress;
use crate::storage::{KeyValueStore, StorageError};
use crate::watchlist::Watchlist;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&Library<S>, Changes)>;

/// Dispatch/subscribe access path over the same `Library`.
///
/// `dispatch` mutates memory only. Storage is written on `save_to_local_storage`,
/// or after every state-changing dispatch when autosave is on.
pub struct WatchStore<S: KeyValueStore> {
    library: Library<S>,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
    autosave: bool,
    error: Option<String>,
}

impl<S: KeyValueStore> WatchStore<S> {
    pub fn new(library: Library<S>) -> Self {
        Self {
            library,
            listeners: Vec::new(),
            next_id: 0,
            autosave: false,
            error: None,
        }
    }

    pub fn open(store: S) -> Self {
        Self::new(Library::open(store))
    }

    /// Persist the touched collections after each dispatch that changes state
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Library<S>, Changes) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn dispatch(&mut self, command: Command) -> Changes {
        let changes = self.library.apply(command);
        if !changes.any() {
            return changes;
        }
        if self.autosave {
            if let Err(e) = self.library.flush(changes) {
                self.record_failure(&e);
            }
        }
        self.notify(changes);
        changes
    }

    /// Write both collections to storage; a failure is also kept in `error`
    pub fn save_to_local_storage(&mut self) -> Result<(), StorageError> {
        match self.library.save_all() {
            Ok(()) => {
                debug!(
                    "Saved {} watchlist entries and {} progress records",
                    self.library.watchlist().len(),
                    self.library.progress().len()
                );
                Ok(())
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Replace state with what storage holds and notify subscribers
    pub fn load_from_local_storage(&mut self) {
        self.library.reload();
        self.notify(Changes::ALL);
    }

    fn record_failure(&mut self, e: &StorageError) {
        warn!("Failed to persist watchlist state: {}", e);
        self.error = Some(e.to_string());
    }

    fn notify(&mut self, changes: Changes) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.library, changes);
        }
    }
}

impl<S: KeyValueStore> WatchOps for WatchStore<S> {
    fn execute(&mut self, command: Command) -> Changes {
        self.dispatch(command)
    }

    fn watchlist(&self) -> &Watchlist {
        self.library.watchlist()
    }

    fn watch_progress(&self) -> &WatchProgress {
        self.library.progress()
    }
}
