//! In-process fake of the DealHub API gateway
//!
//! Serves the extraction, auth, document and agreement endpoints on an
//! ephemeral port and records every request it sees.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TOKEN: &str = "tok-123";
pub const PASSWORD: &str = "secret";

/// One scripted reply: status code plus raw body text
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
        }
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

pub struct FakeGateway {
    submission: Mutex<Reply>,
    statuses: Mutex<VecDeque<Reply>>,
    last_status: Mutex<Option<Reply>>,
    versions: Mutex<HashMap<i64, Value>>,
    next_version: AtomicI64,
    reject_patch: AtomicBool,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            submission: Mutex::new(Reply::json(json!({"jobKey": "J1"}))),
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(None),
            versions: Mutex::new(HashMap::new()),
            next_version: AtomicI64::new(100),
            reject_patch: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_submission(self, reply: Reply) -> Self {
        *self.submission.lock().unwrap() = reply;
        self
    }

    /// Status replies are served in order; the last one repeats
    pub fn with_status(self, reply: Reply) -> Self {
        self.statuses.lock().unwrap().push_back(reply);
        self
    }

    pub fn rejecting_patches(self) -> Self {
        self.reject_patch.store(true, Ordering::SeqCst);
        self
    }

    /// Seed a stored version
    pub fn with_version(self, id: i64, status: &str) -> Self {
        self.versions.lock().unwrap().insert(
            id,
            json!({"id": id, "agreementId": 3, "status": status, "extractedJson": {}}),
        );
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    fn record(
        &self,
        method: Method,
        path: String,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            authorization,
            query,
            body,
        });
    }

    fn next_status(&self) -> Reply {
        let mut last = self.last_status.lock().unwrap();
        if let Some(reply) = self.statuses.lock().unwrap().pop_front() {
            *last = Some(reply);
        }
        last.clone()
            .unwrap_or_else(|| Reply::json(json!({"status": "RUNNING"})))
    }
}

type Shared = Arc<FakeGateway>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Reply {
    Reply::error(401, "")
}

fn no_query() -> HashMap<String, String> {
    HashMap::new()
}

async fn login(State(gw): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    gw.record(Method::POST, "/auth/login".into(), &headers, no_query(), Some(body.clone()));
    if body["password"] == PASSWORD {
        Reply::json(json!({"accessToken": TOKEN, "tokenType": "Bearer"}))
    } else {
        unauthorized()
    }
}

async fn me(State(gw): State<Shared>, headers: HeaderMap) -> Reply {
    gw.record(Method::GET, "/auth/me".into(), &headers, no_query(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Reply::json(json!({"id": 42, "role": "AGENT", "email": "agent@bank.com"}))
}

async fn start_extraction(
    State(gw): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    gw.record(Method::POST, "/extractions/start".into(), &headers, no_query(), Some(body));
    if !authorized(&headers) {
        return unauthorized();
    }
    gw.submission.lock().unwrap().clone()
}

async fn get_extraction(
    State(gw): State<Shared>,
    Path(job_key): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/extractions/{}", job_key);
    gw.record(Method::GET, path, &headers, no_query(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    gw.next_status()
}

async fn upload(
    State(gw): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let text = String::from_utf8_lossy(&body).into_owned();
    gw.record(
        Method::POST,
        "/documents/upload".into(),
        &headers,
        query.clone(),
        Some(json!({"contentType": content_type, "text": text})),
    );

    if !content_type.starts_with("multipart/form-data") {
        return Reply::error(415, "expected multipart upload");
    }
    let agreement_id = query
        .get("agreementId")
        .and_then(|id| id.parse::<i64>().ok());
    Reply::json(json!({
        "documentId": 7,
        "agreementId": agreement_id,
        "message": "stored",
        "originalFileName": "agreement.pdf",
    }))
}

async fn download(
    State(gw): State<Shared>,
    Path(document_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/documents/{}/download", document_id);
    gw.record(Method::GET, path, &headers, no_query(), None);
    if document_id != 7 {
        return Reply::error(404, "document not found").into_response();
    }
    (StatusCode::OK, [(CONTENT_TYPE, "application/pdf")], b"%PDF-1.4 fake".to_vec())
        .into_response()
}

async fn create_agreement(
    State(gw): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    gw.record(Method::POST, "/agreements".into(), &headers, no_query(), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }

    let blank = ["name", "borrower", "agent"]
        .iter()
        .find(|field| body[**field].as_str().map_or(true, |v| v.trim().is_empty()));
    if let Some(field) = blank {
        return Reply::error(400, &format!("{} must not be blank", field));
    }

    Reply::json(json!({
        "id": 3,
        "name": body["name"],
        "borrower": body["borrower"],
        "agent": body["agent"],
        "status": "DRAFT",
    }))
}

async fn lender_inbox(State(gw): State<Shared>, headers: HeaderMap) -> Reply {
    gw.record(Method::GET, "/agreements/lender/inbox".into(), &headers, no_query(), None);
    if !authorized(&headers) {
        return unauthorized();
    }

    Reply::json(json!([
        {
            "id": 11,
            "dealName": "Acme Term Loan",
            "lenderId": 42,
            "recipientEmail": "lender@bank.com",
            "createdAt": "2026-10-15T12:00:00Z",
            "payload": "{\"dealName\":\"Acme Term Loan\",\"facilities\":[{\"amount\":1000000}]}",
        },
        {
            "id": 12,
            "dealName": "Globex Revolver",
            "lenderId": 42,
            "recipientEmail": "lender@bank.com",
            "createdAt": "2026-10-16T08:30:00Z",
            "payload": {"dealName": "Globex Revolver", "facilities": []},
        },
    ]))
}

async fn create_draft(
    State(gw): State<Shared>,
    Path(agreement_id): Path<i64>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Reply {
    let path = format!("/agreements/{}/versions/draft", agreement_id);
    gw.record(Method::POST, path, &headers, no_query(), Some(document.clone()));

    let id = gw.next_version.fetch_add(1, Ordering::SeqCst);
    let version = json!({
        "id": id,
        "agreementId": agreement_id,
        "status": "DRAFT",
        "extractedJson": document,
        "createdAt": "2026-10-16T09:00:00Z",
    });
    gw.versions.lock().unwrap().insert(id, version.clone());
    Reply::json(version)
}

async fn get_version(
    State(gw): State<Shared>,
    Path(version_id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/agreements/versions/{}", version_id);
    gw.record(Method::GET, path, &headers, no_query(), None);
    match gw.versions.lock().unwrap().get(&version_id) {
        Some(version) => Reply::json(version.clone()),
        None => Reply::error(404, "version not found"),
    }
}

async fn update_draft(
    State(gw): State<Shared>,
    Path(version_id): Path<i64>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Reply {
    let path = format!("/agreements/versions/{}", version_id);
    gw.record(Method::PATCH, path, &headers, no_query(), Some(document.clone()));
    if gw.reject_patch.load(Ordering::SeqCst) {
        return Reply::error(409, "version locked");
    }

    let mut versions = gw.versions.lock().unwrap();
    match versions.get_mut(&version_id) {
        Some(version) => {
            version["extractedJson"] = document;
            Reply::json(version.clone())
        }
        None => Reply::error(404, "version not found"),
    }
}

fn transition(gw: &FakeGateway, version_id: i64, from: &str, to: &str) -> Reply {
    let mut versions = gw.versions.lock().unwrap();
    match versions.get_mut(&version_id) {
        Some(version) if version["status"] == from => {
            version["status"] = json!(to);
            Reply::json(version.clone())
        }
        Some(version) => Reply::error(
            409,
            &format!("cannot move {} to {}", version["status"], to),
        ),
        None => Reply::error(404, "version not found"),
    }
}

async fn validate(
    State(gw): State<Shared>,
    Path(version_id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/agreements/versions/{}/validate", version_id);
    gw.record(Method::POST, path, &headers, no_query(), None);
    transition(&gw, version_id, "DRAFT", "VALIDATED")
}

async fn publish(
    State(gw): State<Shared>,
    Path(version_id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    let path = format!("/agreements/versions/{}/publish", version_id);
    gw.record(Method::POST, path, &headers, no_query(), None);
    transition(&gw, version_id, "VALIDATED", "PUBLISHED")
}

fn agreement_row(id: i64, name: &str, status: &str) -> Value {
    json!({
        "agreementId": id,
        "agreementName": name,
        "borrower": "Acme Holdings",
        "agent": "First Bank",
        "facilitiesCount": 2,
        "totalAmount": "$1.5M",
        "status": status,
        "lastUpdated": "2026-10-15",
    })
}

async fn recent(
    State(gw): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    gw.record(Method::GET, "/agreements/recent".into(), &headers, query, None);
    Reply::json(json!([
        agreement_row(3, "Acme Term Loan", "DRAFT"),
        agreement_row(4, "Globex Revolver", "published"),
    ]))
}

async fn historical(
    State(gw): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    let needle = query.get("q").cloned().unwrap_or_default().to_lowercase();
    gw.record(Method::GET, "/agreements/historical".into(), &headers, query, None);

    let rows: Vec<Value> = [
        agreement_row(1, "Acme 2019 Facility", "PUBLISHED"),
        agreement_row(2, "Initech Bridge Loan", "PUBLISHED"),
    ]
    .into_iter()
    .filter(|row| {
        row["agreementName"]
            .as_str()
            .map_or(false, |name| name.to_lowercase().contains(&needle))
    })
    .collect();
    Reply::json(Value::Array(rows))
}

pub fn router(gateway: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/extractions/start", post(start_extraction))
        .route("/extractions/:job_key", get(get_extraction))
        .route("/documents/upload", post(upload))
        .route("/documents/:document_id/download", get(download))
        .route("/agreements", post(create_agreement))
        .route("/agreements/lender/inbox", get(lender_inbox))
        .route("/agreements/:agreement_id/versions/draft", post(create_draft))
        .route(
            "/agreements/versions/:version_id",
            get(get_version).patch(update_draft),
        )
        .route("/agreements/versions/:version_id/validate", post(validate))
        .route("/agreements/versions/:version_id/publish", post(publish))
        .route("/agreements/recent", get(recent))
        .route("/agreements/historical", get(historical))
        .with_state(gateway)
}

/// Serve the gateway on an ephemeral port and return its base URL
pub async fn spawn(gateway: Shared) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(gateway);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A base URL nothing listens on
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
