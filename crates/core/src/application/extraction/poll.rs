// Polling loop
//
// [pending] --status in success set--> succeeded
// [pending] --status in failure set--> failed
// [pending] --elapsed >= timeout-----> timed_out
// [pending] --cancel signaled--------> cancelled
// [pending] --otherwise--------------> [pending] (after interval sleep)

use super::ExtractionJobClient;
use crate::application::cancel::{cancellable_sleep, CancelToken, SleepOutcome};
use crate::application::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use crate::application::retry::RetryDecision;
use crate::domain::extraction::GENERIC_FAILURE_MESSAGE;
use crate::domain::{ExtractionJobState, JobKey, PollOutcome, StatusClass};
use crate::error::{AppError, Result};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Options for a single `poll` call
#[derive(Clone)]
pub struct PollOptions {
    /// Delay between the end of one status query and the start of the next
    pub interval: Duration,
    /// Wall-clock budget from the start of `poll`; slow queries count against it
    pub timeout: Duration,
    pub cancel: Option<CancelToken>,
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancel_on(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            cancel: None,
        }
    }
}

impl ExtractionJobClient {
    /// Poll a job until it succeeds, fails, times out or is cancelled.
    ///
    /// Status queries are strictly sequential: the next one starts only after
    /// the previous response was classified. Cancellation is checked before
    /// every query and interrupts the inter-poll sleep; a query already in
    /// flight is never abandoned.
    ///
    /// # Errors
    /// - AppError::Transport if a status query fails and the retry policy gives up
    pub async fn poll(&self, job_key: &JobKey, options: PollOptions) -> Result<PollOutcome> {
        let started = Instant::now();
        let cancel = options.cancel.as_ref();
        let mut retries = 0u32;
        let mut queries = 0u32;

        loop {
            if options.is_cancelled() {
                return Ok(self.cancelled(job_key, started));
            }

            let response = match self.api.get_extraction(job_key).await {
                Ok(response) => {
                    retries = 0;
                    response
                }
                Err(error) => {
                    match self
                        .retry_policy
                        .should_retry(job_key.as_str(), &error, retries)
                    {
                        RetryDecision::GiveUp => {
                            warn!(job_key = %job_key, error = %error, "Status query failed");
                            return Err(AppError::Transport {
                                job_key: job_key.to_string(),
                                source: error,
                            });
                        }
                        RetryDecision::Retry(delay) => {
                            retries += 1;
                            if started.elapsed() >= options.timeout {
                                return Ok(self.timed_out(job_key, started));
                            }
                            if cancellable_sleep(delay, cancel).await == SleepOutcome::Cancelled {
                                return Ok(self.cancelled(job_key, started));
                            }
                            continue;
                        }
                    }
                }
            };

            queries += 1;
            let state = ExtractionJobState::from_response(&response);
            debug!(
                job_key = %job_key,
                status = %state.status,
                query = queries,
                "Extraction status"
            );

            match self.vocabulary.classify(&state.status) {
                StatusClass::Success => {
                    let elapsed = started.elapsed();
                    info!(
                        job_key = %job_key,
                        queries = queries,
                        elapsed_ms = %elapsed.as_millis(),
                        "Extraction succeeded"
                    );
                    return Ok(PollOutcome::Succeeded {
                        job_key: job_key.clone(),
                        payload: state
                            .result_payload
                            .unwrap_or_else(|| Value::Object(Default::default())),
                        elapsed,
                    });
                }
                StatusClass::Failure => {
                    let elapsed = started.elapsed();
                    let error = state
                        .error_detail
                        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                    warn!(
                        job_key = %job_key,
                        status = %state.status,
                        error = %error,
                        "Extraction failed"
                    );
                    return Ok(PollOutcome::Failed {
                        job_key: job_key.clone(),
                        error,
                        elapsed,
                    });
                }
                StatusClass::Pending => {}
            }

            if started.elapsed() >= options.timeout {
                return Ok(self.timed_out(job_key, started));
            }

            if cancellable_sleep(options.interval, cancel).await == SleepOutcome::Cancelled {
                return Ok(self.cancelled(job_key, started));
            }
        }
    }

    fn timed_out(&self, job_key: &JobKey, started: Instant) -> PollOutcome {
        let elapsed = started.elapsed();
        warn!(
            job_key = %job_key,
            elapsed_ms = %elapsed.as_millis(),
            "Extraction polling timed out (job may still be running)"
        );
        PollOutcome::TimedOut {
            job_key: job_key.clone(),
            elapsed,
        }
    }

    fn cancelled(&self, job_key: &JobKey, started: Instant) -> PollOutcome {
        let elapsed = started.elapsed();
        info!(job_key = %job_key, elapsed_ms = %elapsed.as_millis(), "Extraction polling cancelled");
        PollOutcome::Cancelled {
            job_key: job_key.clone(),
            elapsed,
        }
    }
}
