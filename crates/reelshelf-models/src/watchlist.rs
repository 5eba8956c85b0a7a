use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::catalog_item::CatalogItem;
use crate::rating::Rating;
use crate::status::WatchStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub src: String, // Unique within the list, join key to the progress map
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_id_from_string_or_number"
    )]
    pub id: Option<String>, // Catalog id, when the item came from the catalog
    #[serde(default, deserialize_with = "crate::de::string_or_null")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "crate::de::string_or_null")]
    pub note: String,
    #[serde(default)]
    pub status: WatchStatus,
    /// Fields written by other clients that this model does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchlistEntry {
    /// Snapshot an item's metadata into a fresh entry (empty note, plan to watch).
    /// Returns None when the item has no usable key.
    pub fn from_item(item: &CatalogItem) -> Option<Self> {
        let src = item.key()?.to_string();
        Some(Self {
            src,
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            rating: item.rating.clone(),
            category: item.category.clone(),
            kind: item.kind.clone(),
            note: String::new(),
            status: WatchStatus::PlanToWatch,
            extra: Map::new(),
        })
    }
}

/// Partial update for an existing entry, located by `src`.
/// Present fields overwrite, absent ones leave the entry alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchlistPatch {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
}

impl WatchlistPatch {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.rating.is_none()
            && self.category.is_none()
            && self.kind.is_none()
            && self.note.is_none()
            && self.status.is_none()
    }

    /// Shallow merge over `entry`
    pub fn apply_to(&self, entry: &mut WatchlistEntry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(description) = &self.description {
            entry.description = Some(description.clone());
        }
        if let Some(rating) = &self.rating {
            entry.rating = Some(rating.clone());
        }
        if let Some(category) = &self.category {
            entry.category = Some(category.clone());
        }
        if let Some(kind) = &self.kind {
            entry.kind = Some(kind.clone());
        }
        if let Some(note) = &self.note {
            entry.note = note.clone();
        }
        if let Some(status) = self.status {
            entry.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_serializes_minimal_shape() {
        let entry = WatchlistEntry::from_item(&CatalogItem::new("a", "A")).unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({ "src": "a", "title": "A", "note": "", "status": "Plan to Watch" })
        );
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let raw = json!({
            "src": "a",
            "title": "A",
            "note": "",
            "status": "Watching",
            "isSeries": true
        });
        let entry: WatchlistEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.extra.get("isSeries"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_entry_accepts_numeric_id_and_null_text() {
        let entry: WatchlistEntry = serde_json::from_value(json!({
            "src": "https://img/a.jpg",
            "id": 1,
            "title": null,
            "note": "keep me",
            "status": "Watching"
        }))
        .unwrap();
        assert_eq!(entry.id.as_deref(), Some("1"));
        assert_eq!(entry.title, "");
        assert_eq!(entry.note, "keep me");
        assert!(entry.extra.is_empty());
    }

    #[test]
    fn test_patch_only_overwrites_present_fields() {
        let mut entry = WatchlistEntry::from_item(&CatalogItem {
            description: Some("old".to_string()),
            ..CatalogItem::new("a", "A")
        })
        .unwrap();

        let patch = WatchlistPatch {
            title: Some("A (director's cut)".to_string()),
            status: Some(WatchStatus::Watching),
            ..WatchlistPatch::new("a")
        };
        patch.apply_to(&mut entry);

        assert_eq!(entry.title, "A (director's cut)");
        assert_eq!(entry.description.as_deref(), Some("old"));
        assert_eq!(entry.status, WatchStatus::Watching);
        assert_eq!(entry.note, "");
    }
}
