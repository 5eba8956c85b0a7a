pub mod catalog;
pub mod clock;
pub mod context;
pub mod library;
pub mod ops;
pub mod progress;
pub mod storage;
pub mod store;
pub mod watchlist;

pub use catalog::{CatalogEvent, CatalogOp, CatalogState, FilmCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::WatchContext;
pub use library::{Changes, Command, Library};
pub use ops::WatchOps;
pub use progress::WatchProgress;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, load_as, PROGRESS_KEY, WATCHLIST_KEY};
pub use store::{SubscriptionId, WatchStore};
pub use watchlist::Watchlist;
