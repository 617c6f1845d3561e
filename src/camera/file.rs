use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Camera, CapturedImage, DeviceError};
use crate::types::Facing;

/// Back camera backed by an image file on disk.
///
/// Used for documents that were scanned beforehand and for headless runs.
/// There is no user-facing source.
#[derive(Debug, Clone)]
pub struct FileCamera {
    environment: PathBuf,
    active: Option<PathBuf>,
}

impl FileCamera {
    pub fn new<P: Into<PathBuf>>(environment: P) -> Self {
        Self { environment: environment.into(), active: None }
    }

    fn source_for(&self, facing: Facing) -> Option<&Path> {
        match facing {
            Facing::Environment => Some(self.environment.as_path()),
            Facing::User => None,
        }
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn start(&mut self, facing: Facing) -> Result<(), DeviceError> {
        let Some(path) = self.source_for(facing).map(Path::to_path_buf) else {
            return Err(DeviceError::Unavailable {
                device: format!("{facing:?}").to_lowercase(),
                reason: "no image configured for this camera".into(),
            });
        };

        let device = path.display().to_string();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(DeviceError::Unavailable { device, reason: "not a file".into() });
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(DeviceError::PermissionDenied { device });
            }
            Err(e) => {
                return Err(DeviceError::Unavailable { device, reason: e.to_string() });
            }
        }

        tracing::debug!(source = %device, "file camera started");
        self.active = Some(path);
        Ok(())
    }

    fn stop(&mut self) {
        self.active = None;
    }

    fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError> {
        let path = self.active.as_ref().ok_or(DeviceError::NotStreaming)?;
        let data = std::fs::read(path)?;
        CapturedImage::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn serves_configured_file_while_streaming() {
        let mut img = tempfile::NamedTempFile::new().unwrap();
        img.write_all(b"document-front").unwrap();

        let mut cam = FileCamera::new(img.path());
        assert!(matches!(cam.capture_frame(), Err(DeviceError::NotStreaming)));

        cam.start(Facing::Environment).await.unwrap();
        let frame = cam.capture_frame().unwrap();
        assert_eq!(frame.data(), b"document-front");

        cam.stop();
        cam.stop();
        assert!(!cam.is_streaming());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let mut cam = FileCamera::new("/nonexistent/kyc/front.jpg");
        let err = cam.start(Facing::Environment).await.unwrap_err();
        assert!(matches!(err, DeviceError::Unavailable { .. }));
        assert!(!cam.is_streaming());
    }

    #[tokio::test]
    async fn user_facing_is_unavailable() {
        let img = tempfile::NamedTempFile::new().unwrap();
        let mut cam = FileCamera::new(img.path());
        let err = cam.start(Facing::User).await.unwrap_err();
        assert!(matches!(err, DeviceError::Unavailable { .. }));
        assert!(!cam.is_streaming());
    }
}
