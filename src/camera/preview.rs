use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use time::OffsetDateTime;

use super::DeviceError;

/// Temporary on-disk copy of a capture that the user can open for review.
///
/// The file lives until [`PreviewHandle::release`] is called or the handle
/// is dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl PreviewHandle {
    pub fn create(data: &[u8]) -> Result<Self, DeviceError> {
        let mut file = tempfile::Builder::new()
            .prefix("kyc-capture-")
            .suffix(".jpg")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        let path = file.path().to_path_buf();
        Ok(Self { file: Some(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove capture preview");
            }
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// A still frame taken from the camera.
#[derive(Debug)]
pub struct CapturedImage {
    data: Arc<[u8]>,
    preview: PreviewHandle,
    captured_at: OffsetDateTime,
}

impl CapturedImage {
    pub fn new(data: Vec<u8>) -> Result<Self, DeviceError> {
        let preview = PreviewHandle::create(&data)?;
        Ok(Self {
            data: data.into(),
            preview,
            captured_at: OffsetDateTime::now_utc(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Cheap clone of the bytes for handing to an upload task.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn captured_at(&self) -> OffsetDateTime {
        self.captured_at
    }

    /// Hex SHA-256 of the image bytes, used to correlate log lines.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }

    pub fn release(&mut self) {
        self.preview.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_removes_preview_file() {
        let mut img = CapturedImage::new(vec![0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        let path = img.preview().path().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), img.data());

        img.release();
        assert!(img.preview().is_released());
        assert!(!path.exists());

        // second release is a no-op
        img.release();
    }

    #[test]
    fn dropping_image_removes_preview_file() {
        let img = CapturedImage::new(b"frame".to_vec()).unwrap();
        let path = img.preview().path().to_path_buf();
        drop(img);
        assert!(!path.exists());
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let img = CapturedImage::new(b"abc".to_vec()).unwrap();
        assert_eq!(
            img.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
