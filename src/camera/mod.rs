//! Camera access: a live stream that can be frozen into a still image.
//!
//! A [`Camera`] is acquired with [`Camera::start`], sampled with
//! [`Camera::capture_frame`] and released with [`Camera::stop`]. `stop` is
//! idempotent so owners can call it from `Drop` without tracking state.

mod file;
mod preview;
mod stream;

pub use file::FileCamera;
pub use preview::{CapturedImage, PreviewHandle};
pub use stream::{StreamCamera, StreamConfig};

use async_trait::async_trait;

use crate::types::Facing;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("camera access denied for {device}")]
    PermissionDenied { device: String },
    #[error("camera {device} unavailable: {reason}")]
    Unavailable { device: String, reason: String },
    #[error("camera {device} produced no frame within {waited_ms} ms")]
    NoFrame { device: String, waited_ms: u64 },
    #[error("no active camera stream")]
    NotStreaming,
    #[error("camera I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Camera: Send {
    /// Acquire a live stream on the camera matching `facing`.
    async fn start(&mut self, facing: Facing) -> Result<(), DeviceError>;

    /// Release the stream. Safe to call when nothing is running.
    fn stop(&mut self);

    fn is_streaming(&self) -> bool;

    /// Freeze the current stream into a still image.
    fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError>;
}

/// Holder for the single camera handle of the process.
///
/// The active capture screen takes the camera on mount and puts it back on
/// unmount; while it is out, nobody else can acquire it.
#[derive(Default)]
pub struct CameraSlot {
    camera: Option<Box<dyn Camera>>,
}

impl CameraSlot {
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self { camera: Some(camera) }
    }

    pub fn take(&mut self) -> Option<Box<dyn Camera>> {
        self.camera.take()
    }

    pub fn put_back(&mut self, mut camera: Box<dyn Camera>) {
        camera.stop();
        self.camera = Some(camera);
    }

    pub fn is_available(&self) -> bool {
        self.camera.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn slot_hands_out_the_camera_once() {
        let mut img = tempfile::NamedTempFile::new().unwrap();
        img.write_all(b"jpeg").unwrap();

        let mut slot = CameraSlot::new(Box::new(FileCamera::new(img.path())));
        let mut cam = slot.take().expect("camera available");
        assert!(slot.take().is_none());
        assert!(!slot.is_available());

        cam.start(Facing::Environment).await.unwrap();
        slot.put_back(cam);
        assert!(slot.is_available());

        // put_back stops the stream
        let cam = slot.take().unwrap();
        assert!(!cam.is_streaming());
    }
}
