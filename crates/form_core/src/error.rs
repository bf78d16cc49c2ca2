use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed with status {status}")]
    Status { status: u16 },
    #[error("invalid submission target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read response body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search query must be at least {min} characters")]
    TooShort { min: usize },
}
