use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-item watch progress, keyed by the same identifier as the watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(deserialize_with = "crate::de::id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String, // "film" | "series"
    #[serde(deserialize_with = "clamped_progress")]
    pub progress: u8, // Percent watched, always within 0..=100
    pub started_at: DateTime<Utc>,
    pub last_watched_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn started(id: impl Into<String>, kind: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            progress: 0,
            started_at: now,
            last_watched_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 100
    }
}

/// `min(100, max(0, p))`, rounded to the nearest whole percent. NaN counts as 0.
pub fn clamp_progress(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    progress.clamp(0.0, 100.0).round() as u8
}

// Older files may hold fractional or out-of-range values
fn clamped_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_progress(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_clamp_progress_bounds() {
        assert_eq!(clamp_progress(-5.0), 0);
        assert_eq!(clamp_progress(0.0), 0);
        assert_eq!(clamp_progress(42.0), 42);
        assert_eq!(clamp_progress(42.6), 43);
        assert_eq!(clamp_progress(100.0), 100);
        assert_eq!(clamp_progress(250.0), 100);
        assert_eq!(clamp_progress(f64::NAN), 0);
        assert_eq!(clamp_progress(f64::INFINITY), 100);
    }

    #[test]
    fn test_record_uses_camel_case_iso_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = ProgressRecord::started("x", "series", now);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("series"));
        assert_eq!(value["progress"], json!(0));
        assert_eq!(value["startedAt"], json!("2024-03-01T12:00:00Z"));
        assert_eq!(value["lastWatchedAt"], json!("2024-03-01T12:00:00Z"));
    }

    #[test]
    fn test_record_clamps_stored_values_on_read() {
        let record: ProgressRecord = serde_json::from_value(json!({
            "id": "x",
            "type": "film",
            "progress": 140.2,
            "startedAt": "2024-03-01T12:00:00.000Z",
            "lastWatchedAt": "2024-03-01T12:30:00.000Z"
        }))
        .unwrap();
        assert_eq!(record.progress, 100);
        assert!(record.is_finished());
    }

    #[test]
    fn test_record_accepts_numeric_id() {
        let record: ProgressRecord = serde_json::from_value(json!({
            "id": 12,
            "type": "series",
            "progress": 5,
            "startedAt": "2024-03-01T12:00:00Z",
            "lastWatchedAt": "2024-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.id, "12");
    }
}
