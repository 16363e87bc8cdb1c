// Document API Port
// Stores source PDFs before extraction

use super::ApiError;
use crate::domain::agreement::AgreementId;
use async_trait::async_trait;

/// Document id assigned by the document service
pub type DocumentId = i64;

/// A file to store, already read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub agreement_id: Option<AgreementId>,
    pub document_type: Option<String>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            agreement_id: None,
            document_type: None,
        }
    }

    pub fn for_agreement(mut self, agreement_id: AgreementId) -> Self {
        self.agreement_id = Some(agreement_id);
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }
}

/// Implementations:
/// - HttpApiClient (sdk crate): multipart `POST /documents/upload`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Store the file and return its id
    async fn upload(&self, upload: &DocumentUpload) -> Result<DocumentId, ApiError>;
}
