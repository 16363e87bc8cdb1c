// Agreement Intake Service
// New agreement from a PDF: create -> upload -> extract -> poll -> draft

use crate::application::extraction::{ExtractionJobClient, PollOptions};
use crate::domain::{
    Agreement, AgreementVersion, ExtractionProfile, JobKey, NewAgreement, PollOutcome,
    StartExtractionRequest,
};
use crate::error::Result;
use crate::port::{AgreementApi, DocumentApi, DocumentId, DocumentUpload};
use std::sync::Arc;
use tracing::info;

/// Document type sent with intake uploads and extraction requests
pub const FACILITY_AGREEMENT: &str = "FACILITY_AGREEMENT";

/// Everything produced by one intake run
#[derive(Debug, Clone)]
pub struct IntakeReport {
    pub agreement: Agreement,
    pub document_id: DocumentId,
    pub job_key: JobKey,
    pub outcome: PollOutcome,
    /// Set only when a draft was requested and the job succeeded
    pub draft: Option<AgreementVersion>,
}

pub struct AgreementIntake {
    agreements: Arc<dyn AgreementApi>,
    documents: Arc<dyn DocumentApi>,
    jobs: ExtractionJobClient,
}

impl AgreementIntake {
    pub fn new(
        agreements: Arc<dyn AgreementApi>,
        documents: Arc<dyn DocumentApi>,
        jobs: ExtractionJobClient,
    ) -> Self {
        Self {
            agreements,
            documents,
            jobs,
        }
    }

    /// Run the whole intake for one file
    ///
    /// Steps run strictly in order and the first error stops the run. A poll
    /// that ends without success still returns a report so the caller can
    /// resume on `job_key`.
    pub async fn run(
        &self,
        agreement: &NewAgreement,
        upload: DocumentUpload,
        options: PollOptions,
        create_draft: bool,
    ) -> Result<IntakeReport> {
        let created = self.agreements.create_agreement(agreement).await?;
        info!(agreement_id = %created.id, name = %created.name, "Intake: agreement created");

        let upload = upload
            .for_agreement(created.id)
            .with_document_type(FACILITY_AGREEMENT);
        let document_id = self.documents.upload(&upload).await?;
        info!(
            agreement_id = %created.id,
            document_id = %document_id,
            file = %upload.file_name,
            "Intake: document uploaded"
        );

        let request = StartExtractionRequest::new(document_id, created.id)
            .with_profile(ExtractionProfile::FacilityAgreement);
        let (job_key, outcome) = self.jobs.submit_and_poll(&request, options).await?;

        let draft = match outcome.payload() {
            Some(document) if create_draft => {
                let draft = self.agreements.create_draft(created.id, document).await?;
                info!(
                    agreement_id = %created.id,
                    version_id = %draft.id,
                    "Intake: draft created"
                );
                Some(draft)
            }
            _ => None,
        };

        Ok(IntakeReport {
            agreement: created,
            document_id,
            job_key,
            outcome,
            draft,
        })
    }
}
