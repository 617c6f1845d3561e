//! Capture flow for one document side.
//!
//! ```text
//! idle -> streaming -> capturing -> uploading -> accepted
//!            ^                          |
//!            +------ retake <------ rejected
//! ```
//!
//! The flow owns the camera while mounted and the current captured image.
//! Uploads are numbered; a result whose number is not the latest, or that
//! arrives after unmount, is dropped.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::{ApiError, DocumentVerdict, Verifier};
use crate::camera::{Camera, CapturedImage, DeviceError};
use crate::types::{DocumentType, VerificationSession};

pub const NETWORK_ERROR: &str = "Network error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Device,
    Validation,
    Network,
}

/// Failure shown to the user, with what to do about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureError {
    pub category: ErrorCategory,
    pub message: String,
    pub tips: Vec<String>,
}

fn tips(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

impl CaptureError {
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self {
            category: ErrorCategory::Validation,
            message: reason.into(),
            tips: tips(&[
                "Make sure the whole document is inside the frame",
                "Avoid glare and reflections on the document",
                "Hold the camera steady while capturing",
                "Use good, even lighting",
            ]),
        }
    }

    pub fn network(err: &ApiError) -> Self {
        Self {
            category: ErrorCategory::Network,
            message: err.server_message().unwrap_or(NETWORK_ERROR).to_string(),
            tips: tips(&[
                "Check your internet connection",
                "Try again in a few moments",
                "Your photo is kept until you retake it",
            ]),
        }
    }

    pub fn device(err: &DeviceError) -> Self {
        Self {
            category: ErrorCategory::Device,
            message: err.to_string(),
            tips: tips(&[
                "Allow camera access for this application",
                "Close other applications that use the camera",
                "Check the configured capture device",
            ]),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.category {
            ErrorCategory::Device => "Camera unavailable",
            ErrorCategory::Validation => "Photo not accepted",
            ErrorCategory::Network => "Connection problem",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Streaming,
    Capturing,
    Uploading,
    Accepted,
    Rejected(CaptureError),
}

/// Work handed to the upload task after a capture.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub generation: u64,
    pub image: Arc<[u8]>,
    pub document_type: DocumentType,
    pub session: VerificationSession,
}

/// OCR submission produced by an accepted capture.
#[derive(Debug, Clone)]
pub struct OcrJob {
    pub image: Arc<[u8]>,
    pub tracking_id: String,
}

#[derive(Debug)]
pub enum FlowEvent {
    /// Photo accepted; the camera is already stopped.
    Advance(OcrJob),
    /// Photo rejected or upload failed; see [`CaptureFlow::error`].
    Rejected,
    /// Result was stale and had no effect.
    Ignored,
}

/// Result of an upload task, tagged with the ticket it answers.
#[derive(Debug)]
pub struct UploadOutcome {
    pub generation: u64,
    pub result: Result<DocumentVerdict, ApiError>,
}

pub struct CaptureFlow {
    camera: Option<Box<dyn Camera>>,
    document_type: DocumentType,
    session: VerificationSession,
    state: CaptureState,
    current: Option<CapturedImage>,
    generation: u64,
}

impl CaptureFlow {
    pub fn new(
        camera: Option<Box<dyn Camera>>,
        document_type: DocumentType,
        session: VerificationSession,
    ) -> Self {
        Self {
            camera,
            document_type,
            session,
            state: CaptureState::Idle,
            current: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match &self.state {
            CaptureState::Rejected(e) => Some(e),
            _ => None,
        }
    }

    pub fn current_image(&self) -> Option<&CapturedImage> {
        self.current.as_ref()
    }

    pub fn can_capture(&self) -> bool {
        self.state == CaptureState::Streaming
            && self.camera.as_ref().is_some_and(|c| c.is_streaming())
    }

    pub fn is_uploading(&self) -> bool {
        self.state == CaptureState::Uploading
    }

    /// Start the camera. Failures land in the rejected state as device errors.
    pub async fn mount(&mut self) {
        self.start_camera().await;
    }

    async fn start_camera(&mut self) {
        let facing = self.document_type.facing();
        let Some(camera) = self.camera.as_mut() else {
            let err = DeviceError::Unavailable {
                device: "camera".into(),
                reason: "held by another screen".into(),
            };
            self.state = CaptureState::Rejected(CaptureError::device(&err));
            return;
        };

        match camera.start(facing).await {
            Ok(()) => self.state = CaptureState::Streaming,
            Err(e) => {
                tracing::warn!(document_type = %self.document_type, error = %e, "camera start failed");
                self.state = CaptureState::Rejected(CaptureError::device(&e));
            }
        }
    }

    /// Freeze a frame and hand it out for upload.
    ///
    /// Returns `None` when capture is disabled (not streaming, or a previous
    /// capture is still in flight) or when the frame could not be read.
    pub fn capture(&mut self) -> Option<UploadTicket> {
        if !self.can_capture() {
            return None;
        }
        self.state = CaptureState::Capturing;

        let frame = match self.camera.as_mut() {
            Some(camera) => camera.capture_frame(),
            None => Err(DeviceError::NotStreaming),
        };
        let image = match frame {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(document_type = %self.document_type, error = %e, "frame capture failed");
                self.state = CaptureState::Rejected(CaptureError::device(&e));
                return None;
            }
        };

        self.release_current();
        self.generation += 1;
        tracing::info!(
            session = %self.session,
            document_type = %self.document_type,
            generation = self.generation,
            sha256 = %image.fingerprint(),
            "frame captured"
        );

        let ticket = UploadTicket {
            generation: self.generation,
            image: image.shared_data(),
            document_type: self.document_type,
            session: self.session.clone(),
        };
        self.current = Some(image);
        self.state = CaptureState::Uploading;
        Some(ticket)
    }

    /// Apply the answer to an upload.
    pub fn finish_upload(
        &mut self,
        generation: u64,
        result: Result<DocumentVerdict, ApiError>,
    ) -> FlowEvent {
        if generation != self.generation || self.state != CaptureState::Uploading {
            tracing::debug!(generation, current = self.generation, "ignoring stale upload result");
            return FlowEvent::Ignored;
        }

        match result {
            Ok(DocumentVerdict::Accepted { tracking_id, .. }) => {
                if let Some(camera) = self.camera.as_mut() {
                    camera.stop();
                }
                self.state = CaptureState::Accepted;
                let image = match &self.current {
                    Some(img) => img.shared_data(),
                    None => Arc::from(Vec::new()),
                };
                FlowEvent::Advance(OcrJob {
                    image,
                    tracking_id: tracking_id.unwrap_or_else(|| self.session.to_string()),
                })
            }
            Ok(DocumentVerdict::Rejected { reason }) => {
                tracing::info!(document_type = %self.document_type, %reason, "document rejected");
                self.state = CaptureState::Rejected(CaptureError::validation(reason));
                FlowEvent::Rejected
            }
            Err(e) => {
                tracing::warn!(document_type = %self.document_type, error = %e, "document upload failed");
                self.state = CaptureState::Rejected(CaptureError::network(&e));
                FlowEvent::Rejected
            }
        }
    }

    /// Clear the error, drop the previous photo and restart the camera.
    pub async fn retake(&mut self) {
        if !matches!(self.state, CaptureState::Rejected(_)) {
            return;
        }
        self.state = CaptureState::Idle;
        self.release_current();
        if let Some(camera) = self.camera.as_mut() {
            camera.stop();
        }
        self.start_camera().await;
    }

    /// One capture-and-classify cycle without a UI in between.
    pub async fn run_once(&mut self, verifier: &dyn Verifier) -> FlowEvent {
        let Some(ticket) = self.capture() else {
            return FlowEvent::Rejected;
        };
        let result = verifier
            .submit_document(ticket.image, ticket.document_type, &ticket.session)
            .await;
        self.finish_upload(ticket.generation, result)
    }

    /// Tear down and give the camera back. In-flight uploads become stale.
    pub fn unmount(&mut self) -> Option<Box<dyn Camera>> {
        self.generation += 1;
        self.release_current();
        self.state = CaptureState::Idle;
        let mut camera = self.camera.take()?;
        camera.stop();
        Some(camera)
    }

    fn release_current(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.release();
        }
    }
}

impl Drop for CaptureFlow {
    fn drop(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.stop();
        }
    }
}

/// Run the quality check in the background. Dropping the receiver discards
/// the result.
pub fn spawn_upload(
    verifier: Arc<dyn Verifier>,
    ticket: UploadTicket,
) -> oneshot::Receiver<UploadOutcome> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = verifier
            .submit_document(ticket.image, ticket.document_type, &ticket.session)
            .await;
        if tx.send(UploadOutcome { generation: ticket.generation, result }).is_err() {
            tracing::debug!(generation = ticket.generation, "upload finished after screen left");
        }
    });
    rx
}

/// Fire the OCR call. Its outcome is logged and never reaches the user.
pub fn dispatch_ocr(verifier: Arc<dyn Verifier>, job: OcrJob) -> JoinHandle<()> {
    tokio::spawn(async move {
        match verifier.submit_ocr(job.image, &job.tracking_id).await {
            Ok(_) => tracing::info!(tracking_id = %job.tracking_id, "OCR submitted"),
            Err(e) => tracing::warn!(tracking_id = %job.tracking_id, error = %e, "OCR submission failed"),
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::types::Facing;

    #[derive(Debug, Default)]
    pub struct CameraLog {
        pub starts: usize,
        pub stops: usize,
        pub streaming: bool,
        pub fail_start: bool,
    }

    pub struct MockCamera {
        pub log: Arc<Mutex<CameraLog>>,
    }

    impl MockCamera {
        pub fn new() -> (Self, Arc<Mutex<CameraLog>>) {
            let log = Arc::new(Mutex::new(CameraLog::default()));
            (Self { log: Arc::clone(&log) }, log)
        }
    }

    #[async_trait]
    impl Camera for MockCamera {
        async fn start(&mut self, _facing: Facing) -> Result<(), DeviceError> {
            let mut log = self.log.lock().unwrap();
            log.starts += 1;
            if log.fail_start {
                return Err(DeviceError::PermissionDenied { device: "/dev/video0".into() });
            }
            log.streaming = true;
            Ok(())
        }

        fn stop(&mut self) {
            let mut log = self.log.lock().unwrap();
            if log.streaming {
                log.stops += 1;
            }
            log.streaming = false;
        }

        fn is_streaming(&self) -> bool {
            self.log.lock().unwrap().streaming
        }

        fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError> {
            if !self.is_streaming() {
                return Err(DeviceError::NotStreaming);
            }
            CapturedImage::new(vec![0xFF, 0xD8, 0x01, 0xFF, 0xD9])
        }
    }

    pub enum Scripted {
        Message(&'static str),
        Missing,
        NetworkDown,
    }

    #[derive(Default)]
    pub struct MockVerifier {
        pub script: Mutex<VecDeque<Scripted>>,
        pub documents: Mutex<usize>,
        pub ocr_calls: Mutex<Vec<String>>,
        pub fail_ocr: bool,
    }

    impl MockVerifier {
        pub fn scripted(script: Vec<Scripted>) -> Self {
            Self { script: Mutex::new(script.into()), ..Self::default() }
        }
    }

    #[async_trait]
    impl Verifier for MockVerifier {
        async fn submit_document(
            &self,
            _image: Arc<[u8]>,
            _document_type: DocumentType,
            _session: &VerificationSession,
        ) -> Result<DocumentVerdict, ApiError> {
            *self.documents.lock().unwrap() += 1;
            let step = self.script.lock().unwrap().pop_front().unwrap_or(Scripted::Missing);
            let resp = match step {
                Scripted::Message(m) => crate::api::ProcessDocumentResponse {
                    message: Some(m.to_string()),
                    ..Default::default()
                },
                Scripted::Missing => crate::api::ProcessDocumentResponse::default(),
                Scripted::NetworkDown => return Err(ApiError::ClientInit("connection refused".into())),
            };
            Ok(crate::api::classify(resp))
        }

        async fn submit_ocr(
            &self,
            _image: Arc<[u8]>,
            tracking_id: &str,
        ) -> Result<serde_json::Value, ApiError> {
            self.ocr_calls.lock().unwrap().push(tracking_id.to_string());
            if self.fail_ocr {
                return Err(ApiError::ClientInit("ocr down".into()));
            }
            Ok(serde_json::json!({ "ok": true }))
        }
    }
}
