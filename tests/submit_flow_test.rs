//! Headless submit: file camera, capture flow and HTTP client together.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use kyc_wizard::api::{KycClient, Verifier};
use kyc_wizard::capture::{ErrorCategory, NETWORK_ERROR};
use kyc_wizard::commands::submit;
use kyc_wizard::config::ApiConfig;
use kyc_wizard::types::{DocumentType, VerificationSession};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().prefix("front-").suffix(".jpg").tempfile().unwrap();
    f.write_all(b"scanned-passport-page").unwrap();
    f
}

fn verifier(mock_server: &MockServer) -> Arc<dyn Verifier> {
    Arc::new(KycClient::new(ApiConfig::local(&mock_server.uri()).unwrap()).unwrap())
}

#[tokio::test]
async fn accepted_capture_triggers_ocr_with_tracking_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/process"))
        .and(body_string_contains("scanned-passport-page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "CLEAR IMAGE",
            "trackingId": "trk-900"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ocr"))
        .and(body_string_contains("trk-900"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = image_file();
    let report = submit::run(
        verifier(&mock_server),
        file.path(),
        DocumentType::Passport,
        VerificationSession::new("sess-e2e"),
        Duration::from_secs(5),
    )
    .await;

    assert!(report.accepted);
    assert_eq!(report.tracking_id.as_deref(), Some("trk-900"));
    assert_eq!(report.ocr_completed, Some(true));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["session"], "sess-e2e");
    assert_eq!(json["document_type"], "passport");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn rejected_capture_never_calls_ocr() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Glare detected"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ocr"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let file = image_file();
    let report = submit::run(
        verifier(&mock_server),
        file.path(),
        DocumentType::DrivingLicenceBack,
        VerificationSession::new("s"),
        Duration::from_secs(1),
    )
    .await;

    assert_eq!(report.exit_code(), 2);
    let err = report.error.unwrap();
    assert_eq!(err.category, ErrorCategory::Validation);
    assert_eq!(err.message, "Glare detected");
}

#[tokio::test]
async fn server_failure_without_message_is_generic_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/process"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let file = image_file();
    let report = submit::run(
        verifier(&mock_server),
        file.path(),
        DocumentType::Passport,
        VerificationSession::new("s"),
        Duration::from_secs(1),
    )
    .await;

    let err = report.error.unwrap();
    assert_eq!(err.category, ErrorCategory::Network);
    assert_eq!(err.message, NETWORK_ERROR);
    assert!(!err.tips.is_empty());
}
