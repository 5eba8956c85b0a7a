use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewing status a user attaches to a watchlist entry.
///
/// Stored on disk with the display spelling ("Plan to Watch") so files written by
/// the web front end load unchanged; the identifier spelling is accepted on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum WatchStatus {
    #[default]
    #[serde(rename = "Plan to Watch", alias = "PlanToWatch")]
    PlanToWatch,
    Watching,
    Finished,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 3] = [
        WatchStatus::PlanToWatch,
        WatchStatus::Watching,
        WatchStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::PlanToWatch => "Plan to Watch",
            WatchStatus::Watching => "Watching",
            WatchStatus::Finished => "Finished",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    /// Lenient parse for user input: case and separators are ignored,
    /// so "plan-to-watch", "PlanToWatch" and "plan to watch" all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "plantowatch" | "planned" => Ok(WatchStatus::PlanToWatch),
            "watching" => Ok(WatchStatus::Watching),
            "finished" | "completed" => Ok(WatchStatus::Finished),
            _ => Err(format!(
                "Invalid status: {}. Use 'plan-to-watch', 'watching' or 'finished'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_with_display_spelling() {
        let json = serde_json::to_string(&WatchStatus::PlanToWatch).unwrap();
        assert_eq!(json, "\"Plan to Watch\"");
        assert_eq!(serde_json::to_string(&WatchStatus::Finished).unwrap(), "\"Finished\"");
    }

    #[test]
    fn test_status_accepts_identifier_spelling() {
        let status: WatchStatus = serde_json::from_str("\"PlanToWatch\"").unwrap();
        assert_eq!(status, WatchStatus::PlanToWatch);
        let status: WatchStatus = serde_json::from_str("\"Plan to Watch\"").unwrap();
        assert_eq!(status, WatchStatus::PlanToWatch);
    }

    #[test]
    fn test_status_from_str_is_lenient() {
        assert_eq!("plan-to-watch".parse::<WatchStatus>().unwrap(), WatchStatus::PlanToWatch);
        assert_eq!("Plan to Watch".parse::<WatchStatus>().unwrap(), WatchStatus::PlanToWatch);
        assert_eq!("WATCHING".parse::<WatchStatus>().unwrap(), WatchStatus::Watching);
        assert_eq!("finished".parse::<WatchStatus>().unwrap(), WatchStatus::Finished);
        assert!("dropped".parse::<WatchStatus>().is_err());
    }
}
