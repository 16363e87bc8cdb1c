// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// The start call failed or returned no recognizable job identifier.
    /// Never retried: resubmitting could duplicate a job server-side.
    #[error("Submission error: {0}")]
    Submission(String),

    /// A status query failed while polling (after any configured retries)
    #[error("Transport error while polling job {job_key}: {source}")]
    Transport {
        job_key: String,
        #[source]
        source: crate::port::ApiError,
    },

    #[error("API error: {0}")]
    Api(#[from] crate::port::ApiError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
