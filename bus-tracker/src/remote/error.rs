//! Remote API error types.

/// Errors from talking to the bus API.
///
/// Only [`RemoteError::NoNetwork`] is considered transient: callers that poll
/// may swallow it and try again on the next tick. Everything else is
/// unexpected and should be surfaced.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The network is unreachable or the request timed out
    #[error("no network: {message}")]
    NoNetwork { message: String },

    /// HTTP request failed for another reason
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Invalid API key or unauthorized
    #[error("unauthorized: check BUS_API_KEY")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by bus API")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl RemoteError {
    /// Whether this is the transient "no network" kind.
    pub fn is_no_network(&self) -> bool {
        matches!(self, RemoteError::NoNetwork { .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            RemoteError::NoNetwork {
                message: err.to_string(),
            }
        } else {
            RemoteError::Http(err)
        }
    }
}
