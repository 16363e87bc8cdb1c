// Agreement Lifecycle Service
// Drives a version through draft -> validated -> published with sequential API calls

use crate::domain::agreement::AgreementId;
use crate::domain::{
    Agreement, AgreementRow, AgreementVersion, LenderInboxMessage, NewAgreement, VersionId,
    VersionStatus,
};
use crate::error::Result;
use crate::port::{AgreementApi, ApiError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AgreementLifecycle {
    api: Arc<dyn AgreementApi>,
}

impl AgreementLifecycle {
    pub fn new(api: Arc<dyn AgreementApi>) -> Self {
        Self { api }
    }

    pub async fn create_agreement(&self, agreement: &NewAgreement) -> Result<Agreement> {
        let created = self.api.create_agreement(agreement).await?;
        info!(agreement_id = %created.id, name = %created.name, "Agreement created");
        Ok(created)
    }

    /// Store an extracted document as a new draft version
    pub async fn create_draft(
        &self,
        agreement_id: AgreementId,
        document: &Value,
    ) -> Result<AgreementVersion> {
        let draft = self.api.create_draft(agreement_id, document).await?;
        info!(agreement_id = %agreement_id, version_id = %draft.id, "Draft created");
        Ok(draft)
    }

    /// Save edits to a draft.
    ///
    /// Patches the existing version; if the server rejects the patch a new
    /// draft is created instead. An error from that create is returned as is,
    /// except a reply that cannot be read as a version, which surfaces the
    /// patch error.
    pub async fn save_draft(
        &self,
        agreement_id: AgreementId,
        version_id: VersionId,
        document: &Value,
    ) -> Result<AgreementVersion> {
        let patch_err = match self.api.update_draft(version_id, document).await {
            Ok(updated) => {
                info!(version_id = %version_id, "Draft updated");
                return Ok(updated);
            }
            Err(e) => e,
        };

        warn!(
            version_id = %version_id,
            error = %patch_err,
            "Draft patch rejected, creating a new draft version"
        );

        match self.api.create_draft(agreement_id, document).await {
            Ok(draft) => {
                info!(
                    agreement_id = %agreement_id,
                    replaced = %version_id,
                    version_id = %draft.id,
                    "Draft replaced by new version"
                );
                Ok(draft)
            }
            Err(ApiError::Decode(detail)) => {
                warn!(
                    agreement_id = %agreement_id,
                    error = %detail,
                    "Replacement draft unreadable"
                );
                Err(patch_err.into())
            }
            Err(create_err) => {
                warn!(
                    agreement_id = %agreement_id,
                    error = %create_err,
                    "Replacement draft failed"
                );
                Err(create_err.into())
            }
        }
    }

    /// Move a draft to VALIDATED
    pub async fn validate(&self, version: &AgreementVersion) -> Result<AgreementVersion> {
        if let Some(status) = &version.status {
            status.ensure_transition(&VersionStatus::Validated)?;
        }

        let validated = self.api.validate_version(version.id).await?;
        info!(version_id = %version.id, "Version validated");
        Ok(validated)
    }

    /// Move a validated version to PUBLISHED
    pub async fn publish(&self, version: &AgreementVersion) -> Result<AgreementVersion> {
        if let Some(status) = &version.status {
            status.ensure_transition(&VersionStatus::Published)?;
        }

        let published = self.api.publish_version(version.id).await?;
        info!(version_id = %version.id, "Version published");
        Ok(published)
    }

    /// Load the version first so the transition can be checked
    pub async fn validate_by_id(&self, version_id: VersionId) -> Result<AgreementVersion> {
        let version = self.api.get_version(version_id).await?;
        self.validate(&version).await
    }

    pub async fn publish_by_id(&self, version_id: VersionId) -> Result<AgreementVersion> {
        let version = self.api.get_version(version_id).await?;
        self.publish(&version).await
    }

    /// Draft, validate and publish in one go. Each step starts only after
    /// the previous response arrived; the first failure stops the sequence.
    pub async fn promote(
        &self,
        agreement_id: AgreementId,
        document: &Value,
    ) -> Result<AgreementVersion> {
        let draft = self.create_draft(agreement_id, document).await?;
        let validated = self.validate(&draft).await?;
        self.publish(&validated).await
    }

    pub async fn recent(&self, days: u32) -> Result<Vec<AgreementRow>> {
        Ok(self.api.list_recent(days).await?)
    }

    pub async fn historical(&self, query: &str) -> Result<Vec<AgreementRow>> {
        Ok(self.api.list_historical(query).await?)
    }

    pub async fn lender_inbox(&self) -> Result<Vec<LenderInboxMessage>> {
        Ok(self.api.lender_inbox().await?)
    }
}
