use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;

use super::{classify, ApiError, DocumentVerdict, ProcessDocumentResponse, Verifier};
use crate::config::ApiConfig;
use crate::types::{DocumentType, VerificationSession};

const API_PREFIX: &str = "api/v1/documents";

/// HTTP client for the verification service.
#[derive(Debug, Clone)]
pub struct KycClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl KycClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ApiError::ClientInit("API token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::ClientInit(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    fn url(&self, op: &str) -> String {
        format!("{}/{API_PREFIX}/{op}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn image_part(image: &[u8]) -> Result<Part, ApiError> {
        Part::bytes(image.to_vec())
            .file_name("document.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ApiError::ClientInit(e.to_string()))
    }

    async fn post_form(&self, endpoint: &str, url: &str, form: Form) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Http { endpoint: endpoint.to_string(), source: e })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
            return Err(ApiError::Status { endpoint: endpoint.to_string(), status, body, message });
        }
        Ok(resp)
    }
}

#[async_trait]
impl Verifier for KycClient {
    /// Calls `POST {base}/api/v1/documents/process`.
    async fn submit_document(
        &self,
        image: Arc<[u8]>,
        document_type: DocumentType,
        session: &VerificationSession,
    ) -> Result<DocumentVerdict, ApiError> {
        let endpoint = "POST /documents/process";
        let form = Form::new()
            .part("image", Self::image_part(&image)?)
            .text("type", document_type.as_str())
            .text("verificationId", session.as_str().to_string());

        tracing::debug!(%session, %document_type, bytes = image.len(), "submitting document");
        let resp = self.post_form(endpoint, &self.url("process"), form).await?;
        let body: ProcessDocumentResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Deserialization { endpoint: endpoint.to_string(), source: e })?;

        let verdict = classify(body);
        tracing::info!(%session, %document_type, accepted = verdict.is_accepted(), "document classified");
        Ok(verdict)
    }

    /// Calls `POST {base}/api/v1/documents/ocr`.
    async fn submit_ocr(
        &self,
        image: Arc<[u8]>,
        tracking_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let endpoint = "POST /documents/ocr";
        let form = Form::new()
            .part("image", Self::image_part(&image)?)
            .text("trackingId", tracking_id.to_string());

        let resp = self.post_form(endpoint, &self.url("ocr"), form).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Deserialization { endpoint: endpoint.to_string(), source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_tolerate_trailing_slash() {
        let a = KycClient::new(ApiConfig::local("http://127.0.0.1:9000").unwrap()).unwrap();
        let b = KycClient::new(ApiConfig::local("http://127.0.0.1:9000/kyc/").unwrap()).unwrap();
        assert_eq!(a.url("process"), "http://127.0.0.1:9000/api/v1/documents/process");
        assert_eq!(b.url("ocr"), "http://127.0.0.1:9000/kyc/api/v1/documents/ocr");
    }
}
