// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid version state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Submission response missing job key (tried: {tried})")]
    MissingJobKey { tried: String },

    #[error("Job key must not be empty")]
    EmptyJobKey,

    #[error("Unknown extraction profile: {0}")]
    UnknownProfile(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
