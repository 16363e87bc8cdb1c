//! SDK Request/Response Types
//!
//! Wire shapes of the auth and document endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from login; the token may arrive under either field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub token: Option<String>,
}

impl LoginResponse {
    pub fn bearer_token(&self) -> Option<&str> {
        [&self.access_token, &self.token]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

/// Response from `GET /auth/me`
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    /// Numeric or string depending on the identity provider
    pub id: Value,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response from `POST /documents/upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDocumentResponse {
    pub document_id: i64,
    pub agreement_id: Option<i64>,
    pub message: Option<String>,
    pub original_file_name: Option<String>,
}

impl UploadDocumentResponse {
    /// The id arrives as `documentId` or, on older servers, `id`
    pub fn from_value(value: &Value) -> Option<Self> {
        let document_id = ["documentId", "id"]
            .iter()
            .filter_map(|field| value.get(*field))
            .find_map(as_i64)?;

        let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            document_id,
            agreement_id: value.get("agreementId").and_then(as_i64),
            message: text("message"),
            original_file_name: text("originalFileName"),
        })
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
