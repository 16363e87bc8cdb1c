// Extraction API Port
// The job client's only external dependency

use super::ApiError;
use crate::domain::{JobKey, StartExtractionRequest};
use async_trait::async_trait;
use serde_json::Value;

/// Extraction endpoints of the remote API
///
/// Responses are returned as raw JSON: the field carrying the job key and the
/// result payload varies across server versions, so interpretation lives in
/// the domain layer.
///
/// Implementations:
/// - HttpApiClient (sdk crate): `POST /extractions/start`, `GET /extractions/{jobKey}`
/// - ScriptedExtractionApi: in-memory fake for tests
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    /// Submit an extraction job
    async fn start_extraction(&self, request: &StartExtractionRequest)
        -> Result<Value, ApiError>;

    /// Query the current state of a job (exactly one request)
    async fn get_extraction(&self, job_key: &JobKey) -> Result<Value, ApiError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Timing of one `get_extraction` call
    #[derive(Debug, Clone)]
    pub struct StatusCall {
        pub job_key: String,
        pub started: Instant,
        pub finished: Instant,
    }

    /// Scripted extraction API
    ///
    /// Status responses are served in order; once the script runs out the last
    /// entry repeats. Every status call is recorded with its start and finish
    /// instant, and the peak number of concurrent calls is tracked.
    pub struct ScriptedExtractionApi {
        submission: Mutex<Result<Value, ApiError>>,
        statuses: Mutex<VecDeque<Result<Value, ApiError>>>,
        last_status: Mutex<Option<Result<Value, ApiError>>>,
        latency: Duration,
        submitted: Mutex<Vec<StartExtractionRequest>>,
        calls: Mutex<Vec<StatusCall>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedExtractionApi {
        pub fn new() -> Self {
            Self {
                submission: Mutex::new(Ok(serde_json::json!({"jobKey": "job-1"}))),
                statuses: Mutex::new(VecDeque::new()),
                last_status: Mutex::new(None),
                latency: Duration::ZERO,
                submitted: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_submission(self, response: Value) -> Self {
            *self.submission.lock().unwrap() = Ok(response);
            self
        }

        pub fn with_submission_error(self, error: ApiError) -> Self {
            *self.submission.lock().unwrap() = Err(error);
            self
        }

        pub fn with_status(self, response: Value) -> Self {
            self.statuses.lock().unwrap().push_back(Ok(response));
            self
        }

        pub fn with_status_error(self, error: ApiError) -> Self {
            self.statuses.lock().unwrap().push_back(Err(error));
            self
        }

        /// Simulated network delay for each status call
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub fn status_call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn status_calls(&self) -> Vec<StatusCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn submitted(&self) -> Vec<StartExtractionRequest> {
            self.submitted.lock().unwrap().clone()
        }

        fn next_status(&self) -> Result<Value, ApiError> {
            let next = self.statuses.lock().unwrap().pop_front();
            let mut last = self.last_status.lock().unwrap();
            match next {
                Some(response) => {
                    *last = Some(response.clone());
                    response
                }
                None => last.clone().unwrap_or_else(|| {
                    Err(ApiError::Transport("no scripted status response".to_string()))
                }),
            }
        }
    }

    impl Default for ScriptedExtractionApi {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ExtractionApi for ScriptedExtractionApi {
        async fn start_extraction(
            &self,
            request: &StartExtractionRequest,
        ) -> Result<Value, ApiError> {
            self.submitted.lock().unwrap().push(request.clone());
            self.submission.lock().unwrap().clone()
        }

        async fn get_extraction(&self, job_key: &JobKey) -> Result<Value, ApiError> {
            let started = Instant::now();
            let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let response = self.next_status();

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(StatusCall {
                job_key: job_key.to_string(),
                started,
                finished: Instant::now(),
            });

            response
        }
    }
}
