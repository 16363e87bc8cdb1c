// Port Layer - Interfaces for the remote document/agreement API

pub mod agreement_api;
pub mod api_error;
pub mod document_api;
pub mod extraction_api;

// Re-exports
pub use agreement_api::AgreementApi;
pub use api_error::ApiError;
pub use document_api::{DocumentApi, DocumentId, DocumentUpload};
pub use extraction_api::ExtractionApi;
