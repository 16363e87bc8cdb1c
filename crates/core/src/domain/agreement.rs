// Agreement Version Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Version ID (numeric, assigned by the agreement service)
pub type VersionId = i64;

/// Agreement ID
pub type AgreementId = i64;

/// Lifecycle stage of an agreement version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Draft,
    Validated,
    Published,
    /// Token the client does not recognize; transitions from it are not gated
    Other(String),
}

impl VersionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "DRAFT" => VersionStatus::Draft,
            "VALIDATED" => VersionStatus::Validated,
            "PUBLISHED" => VersionStatus::Published,
            _ => VersionStatus::Other(raw.to_string()),
        }
    }

    /// Draft -> Validated -> Published, nothing leaves Published
    pub fn can_transition_to(&self, next: &VersionStatus) -> bool {
        matches!(
            (self, next),
            (VersionStatus::Draft, VersionStatus::Validated)
                | (VersionStatus::Validated, VersionStatus::Published)
                | (VersionStatus::Other(_), _)
        )
    }

    pub fn ensure_transition(&self, next: &VersionStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStatus::Draft => write!(f, "DRAFT"),
            VersionStatus::Validated => write!(f, "VALIDATED"),
            VersionStatus::Published => write!(f, "PUBLISHED"),
            VersionStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for VersionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(VersionStatus::parse(&raw))
    }
}

/// One version of an agreement as returned by the agreement service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementVersion {
    pub id: VersionId,
    #[serde(default)]
    pub agreement_id: Option<AgreementId>,
    #[serde(default)]
    pub status: Option<VersionStatus>,
    /// Draft JSON
    #[serde(default)]
    pub payload: Option<Value>,
    /// Published JSON
    #[serde(default)]
    pub golden_source: Option<Value>,
    #[serde(default)]
    pub extracted_json: Option<Value>,
    #[serde(default)]
    pub result_json: Option<Value>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AgreementVersion {
    /// The structured document carried by this version, whichever field the server used
    pub fn document(&self) -> Option<&Value> {
        [
            &self.extracted_json,
            &self.result_json,
            &self.payload,
            &self.golden_source,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
        .find(|v| !v.is_null())
    }
}

/// Dashboard row for the recent/historical agreement lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRow {
    pub agreement_id: AgreementId,
    pub agreement_name: String,
    #[serde(default)]
    pub borrower: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub facilities_count: u32,
    #[serde(default)]
    pub total_amount: String,
    pub status: VersionStatus,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub validated_at: Option<String>,
}

/// Request body for `POST /agreements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAgreement {
    pub name: String,
    pub borrower: String,
    pub agent: String,
}

impl NewAgreement {
    /// All three fields are required and trimmed
    pub fn new(
        name: impl Into<String>,
        borrower: impl Into<String>,
        agent: impl Into<String>,
    ) -> Result<Self> {
        let field = |label: &str, value: String| {
            let value = value.trim().to_string();
            if value.is_empty() {
                Err(DomainError::ValidationError(format!(
                    "agreement {} must not be blank",
                    label
                )))
            } else {
                Ok(value)
            }
        };

        Ok(Self {
            name: field("name", name.into())?,
            borrower: field("borrower", borrower.into())?,
            agent: field("agent", agent.into())?,
        })
    }
}

/// Agreement header as returned by `POST /agreements`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: AgreementId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub borrower: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A published payload delivered to a lender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderInboxMessage {
    pub id: i64,
    #[serde(default)]
    pub deal_name: String,
    #[serde(default)]
    pub lender_id: Option<i64>,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub payload: Value,
}

impl LenderInboxMessage {
    /// Older servers send the payload as a JSON string; decode it when possible
    pub fn document(&self) -> Value {
        match &self.payload {
            Value::String(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| self.payload.clone())
            }
            other => other.clone(),
        }
    }
}
