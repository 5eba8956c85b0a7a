use chrono::{DateTime, Utc};
use reelshelf_models::{clamp_progress, ProgressRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Watch progress keyed by item identifier.
///
/// Records may exist without a watchlist entry; nothing here cascades.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WatchProgress {
    records: BTreeMap<String, ProgressRecord>,
}

impl WatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: BTreeMap<String, ProgressRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProgressRecord)> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ProgressRecord> {
        self.records.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// (Re)start tracking `id` from zero. An existing record is replaced, not resumed.
    pub fn start(&mut self, id: &str, kind: &str, now: DateTime<Utc>) {
        self.records
            .insert(id.to_string(), ProgressRecord::started(id, kind, now));
    }

    /// Set the clamped progress of an existing record; unknown ids are left alone
    pub fn update(&mut self, id: &str, progress: f64, now: DateTime<Utc>) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.progress = clamp_progress(progress);
                record.last_watched_at = now;
                true
            }
            None => {
                debug!("No progress record for {}, update ignored", id);
                false
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }

    /// Started but not finished, most recently watched first
    pub fn in_progress(&self) -> Vec<&ProgressRecord> {
        let mut records: Vec<&ProgressRecord> = self
            .records
            .values()
            .filter(|record| record.progress > 0 && record.progress < 100)
            .collect();
        records.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_update_clamps_every_input() {
        let mut progress = WatchProgress::new();
        progress.start("x", "film", t0());

        for (input, expected) in [(-10.0, 0), (0.0, 0), (37.0, 37), (99.4, 99), (100.0, 100), (180.0, 100)] {
            assert!(progress.update("x", input, t0()));
            assert_eq!(progress.get("x").unwrap().progress, expected, "input {}", input);
        }
    }

    #[test]
    fn test_start_resets_existing_progress() {
        let mut progress = WatchProgress::new();
        progress.start("x", "film", t0());
        progress.update("x", 75.0, t0() + Duration::minutes(30));

        let restart = t0() + Duration::days(1);
        progress.start("x", "film", restart);

        let record = progress.get("x").unwrap();
        assert_eq!(record.progress, 0);
        assert_eq!(record.started_at, restart);
        assert_eq!(record.last_watched_at, restart);
    }

    #[test]
    fn test_update_unknown_id_does_not_create() {
        let mut progress = WatchProgress::new();
        progress.start("x", "film", t0());
        let before = progress.len();

        assert!(!progress.update("ghost", 50.0, t0()));
        assert_eq!(progress.len(), before);
        assert!(!progress.has("ghost"));
    }

    #[test]
    fn test_update_refreshes_last_watched_only() {
        let mut progress = WatchProgress::new();
        progress.start("x", "series", t0());
        let later = t0() + Duration::hours(2);
        progress.update("x", 20.0, later);

        let record = progress.get("x").unwrap();
        assert_eq!(record.started_at, t0());
        assert_eq!(record.last_watched_at, later);
        assert_eq!(record.kind, "series");
    }

    #[test]
    fn test_remove() {
        let mut progress = WatchProgress::new();
        progress.start("x", "film", t0());
        assert!(progress.remove("x"));
        assert!(!progress.remove("x"));
        assert!(progress.is_empty());
    }

    #[test]
    fn test_in_progress_orders_by_last_watched() {
        let mut progress = WatchProgress::new();
        progress.start("fresh", "film", t0());
        progress.start("old", "film", t0());
        progress.start("recent", "film", t0());
        progress.start("done", "film", t0());

        progress.update("old", 10.0, t0() + Duration::hours(1));
        progress.update("recent", 60.0, t0() + Duration::hours(3));
        progress.update("done", 100.0, t0() + Duration::hours(4));

        let ids: Vec<&str> = progress.in_progress().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "old"]);
    }
}
