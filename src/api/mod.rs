//! # Verification API
//!
//! Client side of the remote document-verification service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/v1/documents/process` | Quality check of one document side |
//! | POST   | `/api/v1/documents/ocr` | OCR extraction after acceptance |
//!
//! The service reports quality with a free-text `message`; only the exact
//! string [`CLEAR_IMAGE`] means the photo passed. That comparison happens
//! once, in [`classify`], and everything above this module works with
//! [`DocumentVerdict`].

mod client;
mod error;

pub use client::KycClient;
pub use error::ApiError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{DocumentType, VerificationSession};

/// Acceptance sentinel returned by the quality gate.
pub const CLEAR_IMAGE: &str = "CLEAR IMAGE";

/// Shown when the service rejects a photo without saying why.
pub const DEFAULT_REJECTION: &str = "Image quality check failed. Please retake the photo.";

/// Raw body of `POST /documents/process`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocumentResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    /// Everything else the service sent back.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of a quality check that got an answer from the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum DocumentVerdict {
    Accepted {
        tracking_id: Option<String>,
        fields: serde_json::Map<String, serde_json::Value>,
    },
    Rejected {
        reason: String,
    },
}

impl DocumentVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DocumentVerdict::Accepted { .. })
    }
}

/// Map the service's free-text answer onto a verdict.
pub fn classify(resp: ProcessDocumentResponse) -> DocumentVerdict {
    match resp.message.as_deref() {
        Some(CLEAR_IMAGE) => DocumentVerdict::Accepted {
            tracking_id: resp.tracking_id,
            fields: resp.fields,
        },
        Some(m) if !m.trim().is_empty() => DocumentVerdict::Rejected { reason: m.to_string() },
        _ => DocumentVerdict::Rejected { reason: DEFAULT_REJECTION.to_string() },
    }
}

/// Seam between the capture flow and the verification service.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Quality-check one document side.
    async fn submit_document(
        &self,
        image: Arc<[u8]>,
        document_type: DocumentType,
        session: &VerificationSession,
    ) -> Result<DocumentVerdict, ApiError>;

    /// Auxiliary OCR extraction. Callers do not wait on it.
    async fn submit_ocr(
        &self,
        image: Arc<[u8]>,
        tracking_id: &str,
    ) -> Result<serde_json::Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(v: serde_json::Value) -> ProcessDocumentResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn clear_image_is_accepted_with_extra_fields() {
        let verdict = classify(response(json!({
            "message": "CLEAR IMAGE",
            "trackingId": "trk-1",
            "documentNumber": "X123"
        })));
        match verdict {
            DocumentVerdict::Accepted { tracking_id, fields } => {
                assert_eq!(tracking_id.as_deref(), Some("trk-1"));
                assert_eq!(fields.get("documentNumber"), Some(&json!("X123")));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_match_is_exact() {
        for msg in ["clear image", "CLEAR IMAGE ", "Clear Image", "CLEAR  IMAGE"] {
            let verdict = classify(response(json!({ "message": msg })));
            assert_eq!(verdict, DocumentVerdict::Rejected { reason: msg.to_string() });
        }
    }

    #[test]
    fn other_messages_are_rejections_verbatim() {
        let verdict = classify(response(json!({ "message": "Blurry image" })));
        assert_eq!(verdict, DocumentVerdict::Rejected { reason: "Blurry image".into() });
    }

    #[test]
    fn empty_or_missing_message_uses_default() {
        for body in [json!({}), json!({ "message": "" }), json!({ "message": null }), json!({ "message": "  " })] {
            assert_eq!(
                classify(response(body)),
                DocumentVerdict::Rejected { reason: DEFAULT_REJECTION.into() }
            );
        }
    }
}
