// Retry logic for status queries
use crate::application::constants::{
    DEFAULT_RETRY_BACKOFF_FACTOR, DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_DELAY,
    DEFAULT_TRANSPORT_RETRIES,
};
use crate::port::ApiError;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Query again after the given delay
    Retry(Duration),
    /// Surface the error, the poll terminates
    GiveUp,
}

/// Retry policy for transport failures while polling
///
/// Applies to status queries only. Submission is never retried since a
/// second start call could create a duplicate job.
///
/// With `max_retries == 0` (the default) the first failed status query ends
/// the poll with a transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl TransportRetryPolicy {
    /// Fail on the first transport error
    pub fn none() -> Self {
        Self::default()
    }

    /// Retry retryable errors up to `max_retries` times with default backoff
    pub fn bounded(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Decide what to do after `retries_so_far` retries have already been spent.
    ///
    /// Backoff formula:
    /// delay = min(base_delay * backoff_factor ^ retries_so_far, max_delay) * (1.0 ± 0.1)
    pub fn should_retry(
        &self,
        job_key: &str,
        error: &ApiError,
        retries_so_far: u32,
    ) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::GiveUp;
        }

        if retries_so_far >= self.max_retries {
            if self.max_retries > 0 {
                warn!(
                    job_key = %job_key,
                    retries = %retries_so_far,
                    error = %error,
                    "Status query retries exhausted"
                );
            }
            return RetryDecision::GiveUp;
        }

        let delay = self.delay_for(retries_so_far);

        info!(
            job_key = %job_key,
            attempt = %(retries_so_far + 1),
            max_retries = %self.max_retries,
            delay_ms = %delay.as_millis(),
            error = %error,
            "Retrying status query"
        );

        RetryDecision::Retry(delay)
    }

    fn delay_for(&self, retries_so_far: u32) -> Duration {
        let exponent = i32::try_from(retries_so_far).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());

        // ±10% jitter so parallel pollers do not retry in lockstep
        let jitter = rand::thread_rng().gen_range(0.9..=1.1);

        Duration::from_secs_f64((capped * jitter).max(0.0))
    }
}

impl Default for TransportRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_TRANSPORT_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            backoff_factor: DEFAULT_RETRY_BACKOFF_FACTOR,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> ApiError {
        ApiError::Transport("connection reset".to_string())
    }

    #[test]
    fn test_default_policy_never_retries() {
        let policy = TransportRetryPolicy::none();
        assert_eq!(
            policy.should_retry("J1", &transport(), 0),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_bounded_policy_stops_after_max() {
        let policy = TransportRetryPolicy::bounded(2);
        assert!(matches!(
            policy.should_retry("J1", &transport(), 0),
            RetryDecision::Retry(_)
        ));
        assert!(matches!(
            policy.should_retry("J1", &transport(), 1),
            RetryDecision::Retry(_)
        ));
        assert_eq!(
            policy.should_retry("J1", &transport(), 2),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_non_retryable_errors_give_up() {
        let policy = TransportRetryPolicy::bounded(5);
        assert_eq!(
            policy.should_retry("J1", &ApiError::Unauthorized, 0),
            RetryDecision::GiveUp
        );
        let not_found = ApiError::Http {
            status: 404,
            message: "unknown job".to_string(),
        };
        assert_eq!(policy.should_retry("J1", &not_found, 0), RetryDecision::GiveUp);
    }

    #[test]
    fn test_backoff_grows_with_jitter_and_cap() {
        let policy = TransportRetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(500),
        };

        let within = |d: Duration, expected_ms: f64| {
            let ms = d.as_secs_f64() * 1000.0;
            ms >= expected_ms * 0.9 - 0.001 && ms <= expected_ms * 1.1 + 0.001
        };

        assert!(within(policy.delay_for(0), 100.0));
        assert!(within(policy.delay_for(1), 200.0));
        assert!(within(policy.delay_for(2), 400.0));
        assert!(within(policy.delay_for(3), 500.0));
        assert!(within(policy.delay_for(8), 500.0));
    }
}
