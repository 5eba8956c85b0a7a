use serde::{Deserialize, Serialize};
use std::fmt;

/// Rating as served by the catalog: the mock API hands out both numbers and
/// free text ("8.5", "PG-13"), so both are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Label(String),
}

impl Rating {
    /// Numeric value if the rating is a score or a label that parses as one
    pub fn as_score(&self) -> Option<f64> {
        match self {
            Rating::Score(score) => Some(*score),
            Rating::Label(label) => label.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}", score),
            Rating::Label(label) => f.write_str(label),
        }
    }
}

impl From<&str> for Rating {
    /// Numbers become scores, anything else stays a label
    fn from(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(score) if score.is_finite() => Rating::Score(score),
            _ => Rating::Label(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_untagged_roundtrip() {
        let score: Rating = serde_json::from_str("8.5").unwrap();
        assert_eq!(score, Rating::Score(8.5));
        let label: Rating = serde_json::from_str("\"PG-13\"").unwrap();
        assert_eq!(label, Rating::Label("PG-13".to_string()));
    }

    #[test]
    fn test_rating_from_str() {
        assert_eq!(Rating::from("7"), Rating::Score(7.0));
        assert_eq!(Rating::from("13+"), Rating::Label("13+".to_string()));
        assert_eq!(Rating::Label("6.5".to_string()).as_score(), Some(6.5));
    }
}
