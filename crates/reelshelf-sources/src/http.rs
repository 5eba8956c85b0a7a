use crate::error::ApiError;
use crate::traits::FilmApi;
use async_trait::async_trait;
use reelshelf_models::{FilmDraft, FilmRecord};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const FILMS_PATH: &str = "films";

/// JSON-over-HTTP film catalog (mockapi.io style REST resource)
#[derive(Clone)]
pub struct HttpFilmApi {
    client: Arc<Client>,
    base_url: Url,
}

impl HttpFilmApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::from_reqwest(base_url, e))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/films` or `{base}/films/{id}`, with the id escaped as one path segment
    fn endpoint(&self, id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?;
            segments.pop_if_empty().push(FILMS_PATH);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

async fn check_status(url: &Url, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
    debug!("{} responded {}: {}", url, status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, ApiError> {
    let response = check_status(url, response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl FilmApi for HttpFilmApi {
    type Error = ApiError;

    async fn list_films(&self) -> Result<Vec<FilmRecord>, Self::Error> {
        let url = self.endpoint(None)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
        let films: Vec<FilmRecord> = read_json(&url, response).await?;
        info!("Fetched {} films from catalog", films.len());
        Ok(films)
    }

    async fn get_film(&self, id: &str) -> Result<FilmRecord, Self::Error> {
        let url = self.endpoint(Some(id))?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
        read_json(&url, response).await
    }

    async fn create_film(&self, film: &FilmDraft) -> Result<FilmRecord, Self::Error> {
        let url = self.endpoint(None)?;
        let response = self
            .client
            .post(url.clone())
            .json(film)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
        let created: FilmRecord = read_json(&url, response).await?;
        info!("Created film {} ({})", created.id, created.title);
        Ok(created)
    }

    async fn update_film(&self, id: &str, film: &FilmDraft) -> Result<FilmRecord, Self::Error> {
        let url = self.endpoint(Some(id))?;
        let response = self
            .client
            .put(url.clone())
            .json(film)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
        let updated: FilmRecord = read_json(&url, response).await?;
        info!("Updated film {}", updated.id);
        Ok(updated)
    }

    async fn delete_film(&self, id: &str) -> Result<(), Self::Error> {
        let url = self.endpoint(Some(id))?;
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url.as_str(), e))?;
        // The body (usually the deleted record) is not needed
        check_status(&url, response).await?;
        info!("Deleted film {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpFilmApi {
        HttpFilmApi::new(base, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_films_path() {
        let api = api("https://abc.mockapi.io");
        assert_eq!(api.endpoint(None).unwrap().as_str(), "https://abc.mockapi.io/films");
        assert_eq!(api.endpoint(Some("12")).unwrap().as_str(), "https://abc.mockapi.io/films/12");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes_id() {
        let api = api("http://localhost:3000/api/v1/");
        assert_eq!(api.endpoint(None).unwrap().as_str(), "http://localhost:3000/api/v1/films");
        assert_eq!(
            api.endpoint(Some("a/b")).unwrap().as_str(),
            "http://localhost:3000/api/v1/films/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(matches!(
            HttpFilmApi::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpFilmApi::new("mailto:films@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed on CI machines
        let api = HttpFilmApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.list_films().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. } | ApiError::Timeout { .. }));
    }
}
