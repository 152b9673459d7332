//! Monitor client error types.

use std::sync::Arc;

/// Errors from fetching a station's departures.
///
/// Anything that prevents a fresh departure list from being produced ends up
/// here: the controller treats every variant the same way (flag the board as
/// stale and try again on the next tick).
///
/// Cloneable so one failed fetch can be handed to every caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    /// HTTP request failed (DNS, connect, timeout, etc.)
    #[error("HTTP error: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the monitor shape
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Parse {
        message: String,
        body: Option<String>,
    },

    /// Client could not be set up (bad URL, missing mock data)
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(Arc::new(err))
    }
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl NetworkError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::Transport(e) => e.status().map(|s| s.as_u16()),
            NetworkError::Parse { .. } | NetworkError::NotConfigured(_) => None,
        }
    }

    /// Build a parse error, keeping a prefix of the offending body for logs.
    pub(crate) fn parse(err: serde_json::Error, body: &str) -> Self {
        NetworkError::Parse {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}
