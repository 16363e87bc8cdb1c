// Agreement API Port
// Agreement creation, version lifecycle (draft -> validated -> published), lender inbox

use super::ApiError;
use crate::domain::agreement::{
    Agreement, AgreementId, AgreementRow, AgreementVersion, LenderInboxMessage, NewAgreement,
    VersionId,
};
use async_trait::async_trait;
use serde_json::Value;

/// Agreement service operations used by the lifecycle service
///
/// Implementations:
/// - HttpApiClient (sdk crate): REST over reqwest
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgreementApi: Send + Sync {
    async fn create_agreement(&self, agreement: &NewAgreement) -> Result<Agreement, ApiError>;

    /// Create a new draft version holding `document`
    async fn create_draft(
        &self,
        agreement_id: AgreementId,
        document: &Value,
    ) -> Result<AgreementVersion, ApiError>;

    async fn get_version(&self, version_id: VersionId) -> Result<AgreementVersion, ApiError>;

    /// Replace the JSON of an existing draft
    async fn update_draft(
        &self,
        version_id: VersionId,
        document: &Value,
    ) -> Result<AgreementVersion, ApiError>;

    async fn validate_version(&self, version_id: VersionId)
        -> Result<AgreementVersion, ApiError>;

    async fn publish_version(&self, version_id: VersionId) -> Result<AgreementVersion, ApiError>;

    /// Agreements touched within the last `days` days
    async fn list_recent(&self, days: u32) -> Result<Vec<AgreementRow>, ApiError>;

    async fn list_historical(&self, query: &str) -> Result<Vec<AgreementRow>, ApiError>;

    /// Payloads distributed to the calling lender
    async fn lender_inbox(&self) -> Result<Vec<LenderInboxMessage>, ApiError>;
}
