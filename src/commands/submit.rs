use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::api::Verifier;
use crate::camera::FileCamera;
use crate::capture::{dispatch_ocr, CaptureError, CaptureFlow, ErrorCategory, FlowEvent};
use crate::types::{DocumentType, VerificationSession};

/// Result of one headless quality check, printed as JSON.
#[derive(Debug, Serialize)]
pub struct SubmitReport {
    pub session: VerificationSession,
    pub document_type: DocumentType,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CaptureError>,
    /// False when the OCR call was still running at the deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_completed: Option<bool>,
}

impl SubmitReport {
    /// 0 accepted, 1 when the image could not be read, 2 rejected.
    pub fn exit_code(&self) -> u8 {
        match &self.error {
            _ if self.accepted => 0,
            Some(err) if err.category == ErrorCategory::Device => 1,
            _ => 2,
        }
    }
}

/// Run `image` through the same capture flow the wizard uses, then wait up to
/// `ocr_wait` for the follow-up OCR call.
pub async fn run(
    verifier: Arc<dyn Verifier>,
    image: &Path,
    document_type: DocumentType,
    session: VerificationSession,
    ocr_wait: Duration,
) -> SubmitReport {
    let camera = FileCamera::new(image);
    let mut flow = CaptureFlow::new(Some(Box::new(camera)), document_type, session.clone());
    flow.mount().await;

    let event = flow.run_once(verifier.as_ref()).await;
    let sha256 = flow.current_image().map(|img| img.fingerprint());

    match event {
        FlowEvent::Advance(job) => {
            let tracking_id = job.tracking_id.clone();
            let handle = dispatch_ocr(verifier, job);
            let ocr_completed = match tokio::time::timeout(ocr_wait, handle).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "OCR task panicked");
                    true
                }
                Err(_) => {
                    tracing::warn!(waited_secs = ocr_wait.as_secs(), "OCR still running, not waiting longer");
                    false
                }
            };
            SubmitReport {
                session,
                document_type,
                accepted: true,
                sha256,
                tracking_id: Some(tracking_id),
                error: None,
                ocr_completed: Some(ocr_completed),
            }
        }
        FlowEvent::Rejected | FlowEvent::Ignored => SubmitReport {
            session,
            document_type,
            accepted: false,
            sha256,
            tracking_id: None,
            error: flow.error().cloned(),
            ocr_completed: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::{MockVerifier, Scripted};
    use std::io::Write;

    fn jpeg() -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        f.write_all(&[0xFF, 0xD8, 0x10, 0x20, 0xFF, 0xD9]).unwrap();
        f
    }

    #[tokio::test]
    async fn accepted_image_waits_for_ocr() {
        let file = jpeg();
        let verifier = Arc::new(MockVerifier::scripted(vec![Scripted::Message("CLEAR IMAGE")]));
        let report = run(
            verifier.clone(),
            file.path(),
            DocumentType::Passport,
            VerificationSession::new("sess-7"),
            Duration::from_secs(5),
        )
        .await;

        assert!(report.accepted);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.ocr_completed, Some(true));
        // no trackingId in the response, so the session stands in
        assert_eq!(report.tracking_id.as_deref(), Some("sess-7"));
        assert_eq!(*verifier.ocr_calls.lock().unwrap(), vec!["sess-7".to_string()]);
        assert_eq!(report.sha256.as_deref().map(str::len), Some(64));
    }

    #[tokio::test]
    async fn rejected_image_reports_reason() {
        let file = jpeg();
        let verifier = Arc::new(MockVerifier::scripted(vec![Scripted::Message("Blurry image")]));
        let report = run(
            verifier.clone(),
            file.path(),
            DocumentType::IdCardFront,
            VerificationSession::new("s"),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(report.exit_code(), 2);
        let err = report.error.unwrap();
        assert_eq!(err.category, ErrorCategory::Validation);
        assert_eq!(err.message, "Blurry image");
        assert!(verifier.ocr_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_device_error_without_upload() {
        let verifier = Arc::new(MockVerifier::default());
        let report = run(
            verifier.clone(),
            Path::new("/nonexistent/kyc/front.jpg"),
            DocumentType::Passport,
            VerificationSession::new("s"),
            Duration::from_secs(1),
        )
        .await;

        assert!(!report.accepted);
        assert_eq!(report.exit_code(), 1);
        let err = report.error.unwrap();
        assert_eq!(err.category, ErrorCategory::Device);
        assert_eq!(*verifier.documents.lock().unwrap(), 0);
    }
}
