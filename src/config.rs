//! Runtime configuration.
//!
//! Values come from environment variables with fallbacks in
//! [`Defaults`](crate::defaults::Defaults); command line flags override both.

use std::time::Duration;
use url::Url;
use zeroize::Zeroizing;

use crate::camera::StreamConfig;
use crate::defaults::Defaults;

/// Connection settings for the verification service.
///
/// `Debug` redacts the token so the config can be logged.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the verification service.
    pub base_url: Url,
    /// Optional bearer token.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Load from the environment.
    ///
    /// Variables:
    /// - `KYC_API_URL` (default: `http://127.0.0.1:8080`)
    /// - `KYC_API_TOKEN` (optional)
    /// - `KYC_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_url("KYC_API_URL", Defaults::API_URL)?,
            api_token: std::env::var("KYC_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            timeout_secs: std::env::var("KYC_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Defaults::TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at a local mock server (for tests).
    pub fn local(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_token: None,
            timeout_secs: 5,
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_url("--api-url", raw)?;
        Ok(self)
    }

    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Streamer settings from the environment.
///
/// Variables:
/// - `KYC_STREAMER` (default: `ffmpeg`)
/// - `KYC_BACK_DEVICE` environment-facing camera (default: `/dev/video0`)
pub fn stream_config_from_env() -> StreamConfig {
    let mut cfg = StreamConfig::default();
    if let Ok(program) = std::env::var("KYC_STREAMER") {
        cfg.program = program;
    }
    if let Ok(dev) = std::env::var("KYC_BACK_DEVICE") {
        cfg.environment_device = dev;
    }
    cfg
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(name.to_string(), format!("unsupported scheme {other}"))),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let cfg = ApiConfig::local("http://127.0.0.1:9000").unwrap().with_token("s3cret");
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ApiConfig::local("ftp://example.com").is_err());
        assert!(ApiConfig::local("not a url").is_err());
        assert!(ApiConfig::local("https://kyc.example.com/base/").is_ok());
    }
}
