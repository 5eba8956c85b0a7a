use reelshelf_models::{FilmDraft, FilmRecord};
use reelshelf_sources::FilmApi;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Locally cached view of the remote catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub films: Vec<FilmRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOp {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
}

/// Transitions of the catalog state. Every remote call emits `Pending`
/// followed by exactly one fulfilled variant or `Rejected`.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Pending(CatalogOp),
    FetchedAll(Vec<FilmRecord>),
    FetchedOne(FilmRecord),
    Created(FilmRecord),
    Updated(FilmRecord),
    Deleted(String),
    Rejected { op: CatalogOp, message: String },
    ClearError,
}

impl CatalogState {
    pub fn reduce(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Pending(_) => {
                self.loading = true;
                self.error = None;
            }
            CatalogEvent::FetchedAll(films) => {
                self.loading = false;
                self.films = films;
            }
            CatalogEvent::FetchedOne(film) => {
                self.loading = false;
                match self.films.iter_mut().find(|f| f.id == film.id) {
                    Some(existing) => *existing = film,
                    None => self.films.push(film),
                }
            }
            CatalogEvent::Created(film) => {
                self.loading = false;
                self.films.push(film);
            }
            CatalogEvent::Updated(film) => {
                self.loading = false;
                // A film that is not cached stays uncached
                if let Some(existing) = self.films.iter_mut().find(|f| f.id == film.id) {
                    *existing = film;
                }
            }
            CatalogEvent::Deleted(id) => {
                self.loading = false;
                self.films.retain(|f| f.id != id);
            }
            CatalogEvent::Rejected { message, .. } => {
                self.loading = false;
                self.error = Some(message);
            }
            CatalogEvent::ClearError => {
                self.error = None;
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&FilmRecord> {
        self.films.iter().find(|f| f.id == id)
    }
}

/// Remote-backed film collection.
///
/// State lives in a watch channel so views can follow pending/fulfilled/rejected
/// transitions. Calls are neither retried nor coordinated: overlapping calls
/// race on `loading`/`error` and the last write wins.
pub struct FilmCatalog<A: FilmApi> {
    api: A,
    state: watch::Sender<CatalogState>,
}

impl<A: FilmApi> FilmCatalog<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn films(&self) -> Vec<FilmRecord> {
        self.state.borrow().films.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.emit(CatalogEvent::ClearError);
    }

    pub async fn fetch_all(&self) -> Result<Vec<FilmRecord>, A::Error> {
        self.emit(CatalogEvent::Pending(CatalogOp::FetchAll));
        let result = self.api.list_films().await;
        self.settle(CatalogOp::FetchAll, result, |films| CatalogEvent::FetchedAll(films.clone()))
    }

    pub async fn fetch_one(&self, id: &str) -> Result<FilmRecord, A::Error> {
        self.emit(CatalogEvent::Pending(CatalogOp::FetchOne));
        let result = self.api.get_film(id).await;
        self.settle(CatalogOp::FetchOne, result, |film| CatalogEvent::FetchedOne(film.clone()))
    }

    pub async fn create(&self, draft: &FilmDraft) -> Result<FilmRecord, A::Error> {
        self.emit(CatalogEvent::Pending(CatalogOp::Create));
        let result = self.api.create_film(draft).await;
        self.settle(CatalogOp::Create, result, |film| CatalogEvent::Created(film.clone()))
    }

    pub async fn update(&self, id: &str, draft: &FilmDraft) -> Result<FilmRecord, A::Error> {
        self.emit(CatalogEvent::Pending(CatalogOp::Update));
        let result = self.api.update_film(id, draft).await;
        self.settle(CatalogOp::Update, result, |film| CatalogEvent::Updated(film.clone()))
    }

    /// Returns the id of the deleted film
    pub async fn delete(&self, id: &str) -> Result<String, A::Error> {
        self.emit(CatalogEvent::Pending(CatalogOp::Delete));
        let result = self.api.delete_film(id).await.map(|()| id.to_string());
        self.settle(CatalogOp::Delete, result, |id| CatalogEvent::Deleted(id.clone()))
    }

    fn emit(&self, event: CatalogEvent) {
        self.state.send_modify(|state| state.reduce(event));
    }

    fn settle<T, F>(&self, op: CatalogOp, result: Result<T, A::Error>, fulfilled: F) -> Result<T, A::Error>
    where
        F: FnOnce(&T) -> CatalogEvent,
    {
        match &result {
            Ok(value) => {
                debug!(?op, "Catalog request fulfilled");
                self.emit(fulfilled(value));
            }
            Err(e) => {
                warn!(?op, "Catalog request rejected: {}", e);
                self.emit(CatalogEvent::Rejected {
                    op,
                    message: e.to_string(),
                });
            }
        }
        result
    }
}
