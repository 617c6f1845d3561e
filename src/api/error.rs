//! Verification API error types.

/// Errors from verification API calls. Every variant is shown to the user
/// as a network problem; quality rejections are not errors but verdicts.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure, no response received.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service answered with a non-2xx status.
    #[error("verification API {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
        /// `message` field of a JSON error body, when there was one.
        message: Option<String>,
    },
    /// Response body was not the expected JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The upload task ended without reporting back.
    #[error("upload task ended without a result")]
    Interrupted,
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(String),
}

impl ApiError {
    /// Human readable message the service attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message: Some(m), .. } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }
}
