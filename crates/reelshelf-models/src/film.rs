use serde::{Deserialize, Serialize};
use crate::rating::Rating;

/// Film as owned by the remote catalog service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmRecord {
    #[serde(deserialize_with = "crate::de::id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Request body for creating or replacing a film; the server assigns the id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FilmDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FilmRecord {
    pub fn with_draft(id: impl Into<String>, draft: FilmDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            description: draft.description,
            rating: draft.rating,
            category: draft.category,
            image: draft.image,
        }
    }

    pub fn to_draft(&self) -> FilmDraft {
        FilmDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            rating: self.rating.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_accepts_numeric_id() {
        let film: FilmRecord =
            serde_json::from_str(r#"{"id": 7, "title": "Dune", "rating": 8.1}"#).unwrap();
        assert_eq!(film.id, "7");
        assert_eq!(film.rating, Some(Rating::Score(8.1)));
        assert!(film.image.is_none());
    }

    #[test]
    fn test_film_draft_skips_missing_fields() {
        let draft = FilmDraft {
            title: "Heat".to_string(),
            ..FilmDraft::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Heat" }));
    }
}
