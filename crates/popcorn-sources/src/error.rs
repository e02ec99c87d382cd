use thiserror::Error;

/// Failure of a remote lookup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Transport failure or a non-success HTTP status
    #[error("Connection lost: {0}")]
    Connection(String),

    /// The service answered but reported no match (carries its message)
    #[error("{0}")]
    NotFound(String),

    /// The body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Malformed(String),

    /// The caller cancelled the request; never shown to the user
    #[error("Request cancelled")]
    Cancelled,

    /// No API key in the configuration, so no request was made
    #[error("No OMDb API key configured")]
    MissingApiKey,
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            LookupError::Connection(format!("HTTP {}", status))
        } else if e.is_timeout() {
            LookupError::Connection("request timed out".to_string())
        } else {
            // The request URL carries the API key
            LookupError::Connection(e.without_url().to_string())
        }
    }
}
