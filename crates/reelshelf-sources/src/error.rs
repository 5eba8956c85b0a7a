use thiserror::Error;

/// Failure talking to the film catalog. The `Display` text is what views show.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid catalog base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed with status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { url: url.to_string() }
        } else {
            ApiError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = ApiError::Status {
            status: 404,
            body: "\"Not found\"".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed with status code 404: \"Not found\"");
        assert!(err.is_not_found());
    }
}
