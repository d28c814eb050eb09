use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the Odds API or the MLB Stats API
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed")]
    Request(#[source] reqwest::Error),

    #[error("API returned error {status} (URL: {url})")]
    Status { status: StatusCode, url: String },

    #[error("Failed to parse API response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for FetchError {
    /// Drops the request URL, which carries the API key
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e.without_url())
    }
}

impl FetchError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request(e) => e.status(),
            FetchError::Parse { .. } => None,
        }
    }
}

/// Strip the `apiKey` query value so URLs can be logged and shown in errors
pub fn redact_url(url: &reqwest::Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "apiKey" {
                (k.into_owned(), "REDACTED".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    if pairs.is_empty() {
        return redacted.to_string();
    }

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
