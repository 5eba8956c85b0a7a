use async_trait::async_trait;
use reelshelf_models::{FilmDraft, FilmRecord};

/// Remote film catalog.
///
/// One call per request: implementations do not retry, back off or cache.
#[async_trait]
pub trait FilmApi: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static + std::fmt::Display;

    /// `GET /films`
    async fn list_films(&self) -> Result<Vec<FilmRecord>, Self::Error>;

    /// `GET /films/{id}`
    async fn get_film(&self, id: &str) -> Result<FilmRecord, Self::Error>;

    /// `POST /films`, returns the stored record with its server-assigned id
    async fn create_film(&self, film: &FilmDraft) -> Result<FilmRecord, Self::Error>;

    /// `PUT /films/{id}`
    async fn update_film(&self, id: &str, film: &FilmDraft) -> Result<FilmRecord, Self::Error>;

    /// `DELETE /films/{id}`
    async fn delete_film(&self, id: &str) -> Result<(), Self::Error>;
}
