// Remote API error (shared by all ports)

use thiserror::Error;

/// Failure of a single request against the remote API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 401 from the server; the session token is no longer accepted
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Transport failures and 5xx responses may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            ApiError::Unauthorized | ApiError::Decode(_) => false,
        }
    }
}
