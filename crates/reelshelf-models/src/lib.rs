pub mod catalog_item;
mod de;
pub mod film;
pub mod progress;
pub mod rating;
pub mod status;
pub mod watchlist;

pub use catalog_item::{CatalogItem, DEFAULT_KIND};
pub use film::{FilmDraft, FilmRecord};
pub use progress::{clamp_progress, ProgressRecord};
pub use rating::Rating;
pub use status::WatchStatus;
pub use watchlist::{WatchlistEntry, WatchlistPatch};
