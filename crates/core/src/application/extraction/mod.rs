// Extraction Job Client - submit a job, then poll it to a terminal outcome

mod poll;

pub use poll::PollOptions;

use crate::application::retry::TransportRetryPolicy;
use crate::domain::{
    ExtractionJobState, JobKey, PollOutcome, StartExtractionRequest, StatusVocabulary,
};
use crate::error::{AppError, Result};
use crate::port::ExtractionApi;
use std::sync::Arc;
use tracing::{info, warn};

/// Extraction Job Client
///
/// Owns no job state: every status check re-queries the remote API. Separate
/// `poll` calls share nothing but the (immutable) client configuration, so one
/// client can drive any number of jobs concurrently.
pub struct ExtractionJobClient {
    api: Arc<dyn ExtractionApi>,
    vocabulary: StatusVocabulary,
    retry_policy: TransportRetryPolicy,
}

impl ExtractionJobClient {
    pub fn new(api: Arc<dyn ExtractionApi>) -> Self {
        Self {
            api,
            vocabulary: StatusVocabulary::default(),
            retry_policy: TransportRetryPolicy::none(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: TransportRetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    /// Submit an extraction job and return its key
    ///
    /// # Errors
    /// - AppError::Submission if the call fails or the response carries no
    ///   job key under any known alias. Never retried.
    pub async fn submit(&self, request: &StartExtractionRequest) -> Result<JobKey> {
        let response = self.api.start_extraction(request).await.map_err(|e| {
            warn!(
                document_id = %request.document_id,
                agreement_id = %request.agreement_id,
                error = %e,
                "Extraction submission failed"
            );
            AppError::Submission(e.to_string())
        })?;

        let job_key = JobKey::from_submission(&response)
            .map_err(|e| AppError::Submission(e.to_string()))?;

        info!(
            job_key = %job_key,
            document_id = %request.document_id,
            agreement_id = %request.agreement_id,
            "Extraction submitted"
        );

        Ok(job_key)
    }

    /// Issue exactly one status query
    pub async fn fetch_state(&self, job_key: &JobKey) -> Result<ExtractionJobState> {
        let response = self
            .api
            .get_extraction(job_key)
            .await
            .map_err(|source| AppError::Transport {
                job_key: job_key.to_string(),
                source,
            })?;

        Ok(ExtractionJobState::from_response(&response))
    }

    /// Submit, then poll the new job until it reaches an outcome
    pub async fn submit_and_poll(
        &self,
        request: &StartExtractionRequest,
        options: PollOptions,
    ) -> Result<(JobKey, PollOutcome)> {
        let job_key = self.submit(request).await?;
        let outcome = self.poll(&job_key, options).await?;
        Ok((job_key, outcome))
    }
}
