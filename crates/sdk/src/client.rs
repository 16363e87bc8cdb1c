//! DealHub REST Client Implementation

use crate::error::{api_error, Result, SdkError};
use crate::session::Session;
use crate::types::{LoginRequest, LoginResponse, MeResponse, UploadDocumentResponse};
use async_trait::async_trait;
use dealhub_core::domain::agreement::AgreementId;
use dealhub_core::domain::{
    Agreement, AgreementRow, AgreementVersion, JobKey, LenderInboxMessage, NewAgreement,
    StartExtractionRequest, VersionId,
};
use dealhub_core::port::{
    AgreementApi, ApiError, DocumentApi, DocumentId, DocumentUpload, ExtractionApi,
};
use reqwest::{multipart, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the DealHub API gateway
///
/// Implements [`ExtractionApi`], [`AgreementApi`] and [`DocumentApi`], so one
/// instance can back the job client, the lifecycle service and intake at once.
///
/// # Example
///
/// ```no_run
/// use dealhub_sdk::{HttpApiClient, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = HttpApiClient::login(Session::default(), "agent@bank.com", "pw").await?;
/// let client = HttpApiClient::new(session)?;
/// let me = client.me().await?;
/// println!("logged in as {}", me.role);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    session: Session,
}

impl HttpApiClient {
    pub fn new(session: Session) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchange credentials for a token and return the authenticated session
    pub async fn login(
        session: Session,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Session> {
        let client = Self::new(session)?;
        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
        };

        let response: LoginResponse = client
            .call(Method::POST, "/auth/login", Some(serde_json::to_value(&request)?))
            .await?;

        let token = response
            .bearer_token()
            .ok_or_else(|| SdkError::Auth("login response carried no token".to_string()))?
            .to_string();

        Ok(client.session.with_token(token))
    }

    /// Identity of the current session
    pub async fn me(&self) -> Result<MeResponse> {
        Ok(self.call(Method::GET, "/auth/me", None).await?)
    }

    /// Upload a PDF from disk as multipart form data
    pub async fn upload_document(
        &self,
        path: &Path,
        agreement_id: Option<AgreementId>,
        document_type: Option<&str>,
    ) -> Result<UploadDocumentResponse> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let mut upload = DocumentUpload::new(file_name, bytes);
        upload.agreement_id = agreement_id;
        upload.document_type = document_type.map(str::to_string);

        Ok(self.send_upload(&upload).await?)
    }

    async fn send_upload(
        &self,
        upload: &DocumentUpload,
    ) -> std::result::Result<UploadDocumentResponse, ApiError> {
        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")
            .map_err(api_error)?;
        let form = multipart::Form::new().part("file", part);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = upload.agreement_id {
            query.push(("agreementId", id.to_string()));
        }
        if let Some(kind) = &upload.document_type {
            query.push(("documentType", kind.clone()));
        }

        let url = self.session.resolve_url("/documents/upload");
        let request = self.authorize(self.http.post(url).query(&query).multipart(form));
        let value = self.execute(request).await?;

        UploadDocumentResponse::from_value(&value).ok_or_else(|| {
            ApiError::Decode("upload response missing document id".to_string())
        })
    }

    /// Raw bytes of a stored document
    pub async fn download_document(&self, document_id: i64) -> Result<Vec<u8>> {
        let url = self.endpoint(&["documents", &document_id.to_string(), "download"])?;
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(api_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(api_error)?;
        Ok(bytes.to_vec())
    }

    /// Build a URL from path segments; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = Url::parse(&self.session.resolve_url("/"))
            .map_err(|e| ApiError::Transport(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> std::result::Result<T, ApiError> {
        let url = self.session.resolve_url(path);
        self.call_url(method, url, body).await
    }

    async fn call_url<T: DeserializeOwned>(
        &self,
        method: Method,
        url: impl reqwest::IntoUrl,
        body: Option<Value>,
    ) -> std::result::Result<T, ApiError> {
        let mut request = self.authorize(self.http.request(method, url));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let value = self.execute(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and decode a JSON response. An empty body decodes as `null`.
    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Value, ApiError> {
        let response = request.send().await.map_err(api_error)?;
        debug!(url = %response.url(), status = %response.status(), "API response");

        let response = check_status(response).await?;
        let text = response.text().await.map_err(api_error)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 401 maps to `Unauthorized`; any other non-2xx carries the body text
async fn check_status(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        text
    };

    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ExtractionApi for HttpApiClient {
    async fn start_extraction(
        &self,
        request: &StartExtractionRequest,
    ) -> std::result::Result<Value, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.call(Method::POST, "/extractions/start", Some(body))
            .await
    }

    async fn get_extraction(&self, job_key: &JobKey) -> std::result::Result<Value, ApiError> {
        let url = self.endpoint(&["extractions", job_key.as_str()])?;
        self.call_url(Method::GET, url, None).await
    }
}

#[async_trait]
impl DocumentApi for HttpApiClient {
    async fn upload(&self, upload: &DocumentUpload) -> std::result::Result<DocumentId, ApiError> {
        Ok(self.send_upload(upload).await?.document_id)
    }
}

#[async_trait]
impl AgreementApi for HttpApiClient {
    async fn create_agreement(
        &self,
        agreement: &NewAgreement,
    ) -> std::result::Result<Agreement, ApiError> {
        let body = serde_json::to_value(agreement).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.call(Method::POST, "/agreements", Some(body)).await
    }

    async fn create_draft(
        &self,
        agreement_id: AgreementId,
        document: &Value,
    ) -> std::result::Result<AgreementVersion, ApiError> {
        let path = format!("/agreements/{}/versions/draft", agreement_id);
        self.call(Method::POST, &path, Some(document.clone())).await
    }

    async fn get_version(
        &self,
        version_id: VersionId,
    ) -> std::result::Result<AgreementVersion, ApiError> {
        let path = format!("/agreements/versions/{}", version_id);
        self.call(Method::GET, &path, None).await
    }

    async fn update_draft(
        &self,
        version_id: VersionId,
        document: &Value,
    ) -> std::result::Result<AgreementVersion, ApiError> {
        let path = format!("/agreements/versions/{}", version_id);
        self.call(Method::PATCH, &path, Some(document.clone())).await
    }

    async fn validate_version(
        &self,
        version_id: VersionId,
    ) -> std::result::Result<AgreementVersion, ApiError> {
        let path = format!("/agreements/versions/{}/validate", version_id);
        self.call(Method::POST, &path, None).await
    }

    async fn publish_version(
        &self,
        version_id: VersionId,
    ) -> std::result::Result<AgreementVersion, ApiError> {
        let path = format!("/agreements/versions/{}/publish", version_id);
        self.call(Method::POST, &path, None).await
    }

    async fn list_recent(&self, days: u32) -> std::result::Result<Vec<AgreementRow>, ApiError> {
        let mut url = self.endpoint(&["agreements", "recent"])?;
        url.query_pairs_mut()
            .append_pair("days", &days.to_string());
        self.call_url(Method::GET, url, None).await
    }

    async fn list_historical(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<AgreementRow>, ApiError> {
        let mut url = self.endpoint(&["agreements", "historical"])?;
        url.query_pairs_mut().append_pair("q", query);
        self.call_url(Method::GET, url, None).await
    }

    async fn lender_inbox(&self) -> std::result::Result<Vec<LenderInboxMessage>, ApiError> {
        self.call(Method::GET, "/agreements/lender/inbox", None).await
    }
}
