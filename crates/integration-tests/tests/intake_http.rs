//! Agreement intake over HTTP
//!
//! Creates an agreement, uploads its PDF, extracts and drafts against the
//! in-process gateway, checking the exact call order on the wire.

mod common;

use common::{FakeGateway, Reply, TOKEN};
use dealhub_core::application::{AgreementIntake, ExtractionJobClient, PollOptions};
use dealhub_core::domain::{NewAgreement, PollOutcome, VersionStatus};
use dealhub_core::port::{ApiError, DocumentUpload};
use dealhub_core::AppError;
use dealhub_sdk::{HttpApiClient, Session};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn intake(gateway: &Arc<FakeGateway>) -> AgreementIntake {
    let url = common::spawn(gateway.clone()).await;
    let client = Arc::new(HttpApiClient::new(Session::new(url).with_token(TOKEN)).unwrap());
    AgreementIntake::new(
        client.clone(),
        client.clone(),
        ExtractionJobClient::new(client),
    )
}

fn quick() -> PollOptions {
    PollOptions::new()
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
}

fn acme() -> NewAgreement {
    NewAgreement::new("Acme Term Loan", "Acme Holdings", "First Bank").unwrap()
}

#[tokio::test]
async fn test_full_intake_runs_steps_in_order() {
    let gateway = Arc::new(
        FakeGateway::new()
            .with_submission(Reply::json(json!({"jobKey": "J-5"})))
            .with_status(Reply::json(json!({"status": "RUNNING"})))
            .with_status(Reply::json(json!({
                "status": "SUCCEEDED",
                "resultJson": {"facilities": [{"amount": 1500000}]}
            }))),
    );
    let intake = intake(&gateway).await;
    let upload = DocumentUpload::new("acme.pdf", b"%PDF-1.4 acme".to_vec());

    let report = intake.run(&acme(), upload, quick(), true).await.unwrap();

    assert_eq!(report.agreement.id, 3);
    assert_eq!(report.document_id, 7);
    assert_eq!(report.job_key.as_str(), "J-5");
    let draft = report.draft.unwrap();
    assert_eq!(draft.status, Some(VersionStatus::Draft));
    assert_eq!(
        draft.document(),
        Some(&json!({"facilities": [{"amount": 1500000}]}))
    );

    assert_eq!(
        gateway.paths(),
        vec![
            "POST /agreements",
            "POST /documents/upload",
            "POST /extractions/start",
            "GET /extractions/J-5",
            "GET /extractions/J-5",
            "POST /agreements/3/versions/draft",
        ]
    );

    let requests = gateway.requests();
    assert_eq!(
        requests[0].body,
        Some(json!({"name": "Acme Term Loan", "borrower": "Acme Holdings", "agent": "First Bank"}))
    );
    assert_eq!(requests[1].query.get("agreementId").map(String::as_str), Some("3"));
    assert_eq!(
        requests[1].query.get("documentType").map(String::as_str),
        Some("FACILITY_AGREEMENT")
    );
    assert_eq!(
        requests[2].body,
        Some(json!({
            "documentId": 7,
            "agreementId": 3,
            "extractionProfile": "FACILITY_AGREEMENT",
        }))
    );
}

#[tokio::test]
async fn test_failed_extraction_creates_no_draft() {
    let gateway = Arc::new(FakeGateway::new().with_status(Reply::json(
        json!({"status": "ERROR", "errorMessage": "scan unreadable"}),
    )));
    let intake = intake(&gateway).await;
    let upload = DocumentUpload::new("acme.pdf", b"%PDF-1.4".to_vec());

    let report = intake.run(&acme(), upload, quick(), true).await.unwrap();

    match &report.outcome {
        PollOutcome::Failed { error, .. } => assert_eq!(error, "scan unreadable"),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(report.draft.is_none());
    assert!(!gateway
        .paths()
        .iter()
        .any(|p| p.ends_with("/versions/draft")));
}

#[tokio::test]
async fn test_submission_error_stops_after_upload() {
    let gateway = Arc::new(
        FakeGateway::new().with_submission(Reply::error(500, "extraction queue full")),
    );
    let intake = intake(&gateway).await;
    let upload = DocumentUpload::new("acme.pdf", b"%PDF-1.4".to_vec());

    let err = intake.run(&acme(), upload, quick(), true).await.unwrap_err();

    assert!(matches!(err, AppError::Submission(_)));
    assert!(err.to_string().contains("extraction queue full"));
    assert_eq!(
        gateway.paths(),
        vec!["POST /agreements", "POST /documents/upload", "POST /extractions/start"]
    );
}

#[tokio::test]
async fn test_unauthorized_create_stops_intake() {
    let gateway = Arc::new(FakeGateway::new());
    let url = common::spawn(gateway.clone()).await;
    let client = Arc::new(HttpApiClient::new(Session::new(url)).unwrap());
    let intake = AgreementIntake::new(
        client.clone(),
        client.clone(),
        ExtractionJobClient::new(client),
    );
    let upload = DocumentUpload::new("acme.pdf", b"%PDF-1.4".to_vec());

    let err = intake.run(&acme(), upload, quick(), true).await.unwrap_err();

    assert!(matches!(err, AppError::Api(ApiError::Unauthorized)));
    assert_eq!(gateway.paths(), vec!["POST /agreements"]);
}
