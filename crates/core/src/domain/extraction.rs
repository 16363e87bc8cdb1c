// Extraction Job Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Field names the start endpoint may use for the job identifier, in priority order
pub const JOB_KEY_ALIASES: [&str; 3] = ["jobKey", "id", "key"];

/// Field names that may carry the extracted document, in priority order
pub const RESULT_ALIASES: [&str; 4] = ["resultJson", "output", "result", "extracted"];

/// Field names that may carry the failure message, in priority order
pub const ERROR_ALIASES: [&str; 2] = ["errorMessage", "error"];

/// Used when a failed job carries no message at all
pub const GENERIC_FAILURE_MESSAGE: &str = "extraction job reported failure";

/// Opaque identifier of one extraction job. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobKey(String);

impl JobKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DomainError::EmptyJobKey);
        }
        Ok(Self(key))
    }

    /// Pick the job key out of a start-extraction response.
    ///
    /// The first alias that is present and non-empty wins. Numeric ids are
    /// accepted and rendered as decimal strings.
    pub fn from_submission(response: &Value) -> Result<Self> {
        for alias in JOB_KEY_ALIASES {
            let candidate = match response.get(alias) {
                Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            return Ok(Self(candidate));
        }

        Err(DomainError::MissingJobKey {
            tried: JOB_KEY_ALIASES.join("/"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        JobKey::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Extraction Profile (which schema the backend extracts against)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionProfile {
    #[default]
    FacilityAgreement,
}

impl ExtractionProfile {
    /// Lenient parse: blank selects the default, common shortcuts are accepted
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_uppercase().replace(['-', ' '], "_");

        match normalized.as_str() {
            "" | "FACILITY_AGREEMENT" | "FACILITYAGREEMENT" | "FAC" => {
                Ok(ExtractionProfile::FacilityAgreement)
            }
            _ => Err(DomainError::UnknownProfile(raw.to_string())),
        }
    }
}

impl fmt::Display for ExtractionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionProfile::FacilityAgreement => write!(f, "FACILITY_AGREEMENT"),
        }
    }
}

/// Request body for `POST /extractions/start`. Forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExtractionRequest {
    pub document_id: i64,
    pub agreement_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_profile: Option<ExtractionProfile>,
}

impl StartExtractionRequest {
    pub fn new(document_id: i64, agreement_id: i64) -> Self {
        Self {
            document_id,
            agreement_id,
            document_type: None,
            extraction_profile: None,
        }
    }

    pub fn with_profile(mut self, profile: ExtractionProfile) -> Self {
        self.extraction_profile = Some(profile);
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }
}

/// Snapshot returned by one status query
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionJobState {
    /// Free-form status token, not normalized
    pub status: String,
    pub result_payload: Option<Value>,
    pub error_detail: Option<String>,
}

impl ExtractionJobState {
    pub fn from_response(response: &Value) -> Self {
        let status = match response.get("status") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let result_payload = RESULT_ALIASES
            .iter()
            .filter_map(|alias| response.get(*alias))
            .find(|v| !v.is_null())
            .cloned();

        let error_detail = ERROR_ALIASES
            .iter()
            .filter_map(|alias| response.get(*alias).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string);

        Self {
            status,
            result_payload,
            error_detail,
        }
    }
}

/// Classification of a status token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Failure,
    Pending,
}

/// Open sets of terminal status tokens.
///
/// Tokens are stored upper-cased; lookups trim and upper-case the candidate,
/// so adding a token never requires touching the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    success: HashSet<String>,
    failure: HashSet<String>,
}

impl StatusVocabulary {
    pub fn new<S, F>(success: S, failure: F) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        Self {
            success: success.into_iter().map(|t| normalize(t.as_ref())).collect(),
            failure: failure.into_iter().map(|t| normalize(t.as_ref())).collect(),
        }
    }

    pub fn with_success(mut self, token: impl AsRef<str>) -> Self {
        self.success.insert(normalize(token.as_ref()));
        self
    }

    pub fn with_failure(mut self, token: impl AsRef<str>) -> Self {
        self.failure.insert(normalize(token.as_ref()));
        self
    }

    pub fn classify(&self, token: &str) -> StatusClass {
        let token = normalize(token);
        if self.success.contains(&token) {
            StatusClass::Success
        } else if self.failure.contains(&token) {
            StatusClass::Failure
        } else {
            StatusClass::Pending
        }
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::new(
            ["COMPLETED", "DONE", "SUCCESS", "SUCCEEDED"],
            ["FAILED", "ERROR"],
        )
    }
}

fn normalize(token: &str) -> String {
    token.trim().to_uppercase()
}

/// Single definitive result of a poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Succeeded {
        job_key: JobKey,
        payload: Value,
        elapsed: Duration,
    },
    Failed {
        job_key: JobKey,
        error: String,
        elapsed: Duration,
    },
    /// Budget exhausted without a terminal status; the job may still finish server-side
    TimedOut { job_key: JobKey, elapsed: Duration },
    Cancelled { job_key: JobKey, elapsed: Duration },
}

impl PollOutcome {
    pub fn job_key(&self) -> &JobKey {
        match self {
            PollOutcome::Succeeded { job_key, .. }
            | PollOutcome::Failed { job_key, .. }
            | PollOutcome::TimedOut { job_key, .. }
            | PollOutcome::Cancelled { job_key, .. } => job_key,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Succeeded { elapsed, .. }
            | PollOutcome::Failed { elapsed, .. }
            | PollOutcome::TimedOut { elapsed, .. }
            | PollOutcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Succeeded { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            PollOutcome::Succeeded { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Lower-case label used in logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::Succeeded { .. } => "succeeded",
            PollOutcome::Failed { .. } => "failed",
            PollOutcome::TimedOut { .. } => "timed_out",
            PollOutcome::Cancelled { .. } => "cancelled",
        }
    }
}
