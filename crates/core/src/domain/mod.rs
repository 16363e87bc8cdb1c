// Domain Layer - Pure business logic and entities

pub mod agreement;
pub mod error;
pub mod extraction;
pub mod summary;

// Re-exports
pub use agreement::{
    Agreement, AgreementRow, AgreementVersion, LenderInboxMessage, NewAgreement, VersionId,
    VersionStatus,
};
pub use error::DomainError;
pub use extraction::{
    ExtractionJobState, ExtractionProfile, JobKey, PollOutcome, StartExtractionRequest,
    StatusClass, StatusVocabulary,
};
pub use summary::{DealSummary, ValidationIssue};
