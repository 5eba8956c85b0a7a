use serde::{Deserialize, Serialize};
use crate::film::FilmRecord;
use crate::rating::Rating;

/// Type tag used when an item does not carry one
pub const DEFAULT_KIND: &str = "film";

/// An item handed to the watchlist by a browsing view.
///
/// Carries the display metadata that gets copied into a `WatchlistEntry`.
/// Either `src` (poster/reference URL) or `id` identifies it; `src` wins when both are set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CatalogItem {
    pub fn new(src: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Join key shared by the watchlist and the progress map: `src`, else `id`
    pub fn key(&self) -> Option<&str> {
        self.src
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_KIND)
    }

    /// Build the item a catalog view would add for this film:
    /// the poster URL is the key, falling back to the catalog id.
    pub fn from_film(film: &FilmRecord) -> Self {
        let src = film
            .image
            .clone()
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| film.id.clone());

        Self {
            src: Some(src),
            id: Some(film.id.clone()),
            title: film.title.clone(),
            description: film.description.clone(),
            rating: film.rating.clone(),
            category: film.category.clone(),
            kind: Some(DEFAULT_KIND.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_src_over_id() {
        let item = CatalogItem {
            src: Some("https://img/a.jpg".to_string()),
            id: Some("12".to_string()),
            ..CatalogItem::default()
        };
        assert_eq!(item.key(), Some("https://img/a.jpg"));

        let item = CatalogItem {
            src: Some(String::new()),
            id: Some("12".to_string()),
            ..CatalogItem::default()
        };
        assert_eq!(item.key(), Some("12"));
        assert_eq!(CatalogItem::default().key(), None);
    }

    #[test]
    fn test_from_film_falls_back_to_id() {
        let film = FilmRecord {
            id: "3".to_string(),
            title: "Alien".to_string(),
            description: None,
            rating: None,
            category: Some("Horror".to_string()),
            image: None,
        };
        let item = CatalogItem::from_film(&film);
        assert_eq!(item.key(), Some("3"));
        assert_eq!(item.kind(), "film");
        assert_eq!(item.category.as_deref(), Some("Horror"));
    }
}
