use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::{Child, Command};

use super::{Camera, CapturedImage, DeviceError};
use crate::defaults::Defaults;
use crate::types::Facing;

const SNAPSHOT_NAME: &str = "live.jpg";
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const SNAPSHOT_READS: usize = 3;

/// How the external streamer is launched.
///
/// `args` may contain `{device}` and `{output}` placeholders; the streamer
/// is expected to keep overwriting `{output}` with the latest frame.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Back camera; document captures use only this one.
    pub environment_device: String,
    pub first_frame_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            program: Defaults::STREAMER_PROGRAM.to_string(),
            args: Defaults::STREAMER_ARGS.iter().map(|s| s.to_string()).collect(),
            environment_device: Defaults::ENVIRONMENT_DEVICE.to_string(),
            first_frame_timeout: Duration::from_millis(Defaults::FIRST_FRAME_TIMEOUT_MS),
        }
    }
}

impl StreamConfig {
    fn device_for(&self, facing: Facing) -> Option<&str> {
        match facing {
            Facing::User => None,
            Facing::Environment => Some(&self.environment_device),
        }
    }

    fn render_args(&self, device: &str, output: &Path) -> Vec<String> {
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|a| a.replace("{device}", device).replace("{output}", &output))
            .collect()
    }
}

struct LiveStream {
    child: Child,
    // Held so the snapshot directory outlives the child.
    _dir: TempDir,
    snapshot: PathBuf,
    device: String,
    facing: Facing,
}

/// Camera fed by an external streamer process (ffmpeg on a V4L2 device by
/// default) that keeps a snapshot file up to date.
pub struct StreamCamera {
    config: StreamConfig,
    live: Option<LiveStream>,
}

impl StreamCamera {
    pub fn new(config: StreamConfig) -> Self {
        Self { config, live: None }
    }

    async fn wait_first_frame(
        child: &mut Child,
        snapshot: &Path,
        device: &str,
        timeout: Duration,
    ) -> Result<(), DeviceError> {
        let started = Instant::now();
        loop {
            if let Ok(data) = tokio::fs::read(snapshot).await {
                if is_complete_jpeg(&data) {
                    return Ok(());
                }
            }
            if let Some(status) = child.try_wait()? {
                return Err(DeviceError::Unavailable {
                    device: device.to_string(),
                    reason: format!("streamer exited with {status}"),
                });
            }
            if started.elapsed() >= timeout {
                return Err(DeviceError::NoFrame {
                    device: device.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Camera for StreamCamera {
    async fn start(&mut self, facing: Facing) -> Result<(), DeviceError> {
        if let Some(live) = &self.live {
            if live.facing == facing {
                return Ok(());
            }
        }
        self.stop();

        let Some(device) = self.config.device_for(facing).map(str::to_string) else {
            return Err(DeviceError::Unavailable {
                device: "user".into(),
                reason: "no user-facing camera configured".into(),
            });
        };
        if device.starts_with("/dev/") {
            match tokio::fs::metadata(&device).await {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Err(DeviceError::PermissionDenied { device });
                }
                Err(e) => {
                    return Err(DeviceError::Unavailable { device, reason: e.to_string() });
                }
            }
        }

        let dir = tempfile::Builder::new().prefix("kyc-stream-").tempdir()?;
        let snapshot = dir.path().join(SNAPSHOT_NAME);
        let args = self.config.render_args(&device, &snapshot);

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => DeviceError::PermissionDenied { device: device.clone() },
                ErrorKind::NotFound => DeviceError::Unavailable {
                    device: device.clone(),
                    reason: format!("streamer `{}` not found", self.config.program),
                },
                _ => DeviceError::Io(e),
            })?;

        if let Err(e) =
            Self::wait_first_frame(&mut child, &snapshot, &device, self.config.first_frame_timeout).await
        {
            let _ = child.start_kill();
            return Err(e);
        }

        tracing::info!(%device, ?facing, "camera stream started");
        self.live = Some(LiveStream { child, _dir: dir, snapshot, device, facing });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut live) = self.live.take() {
            if let Err(e) = live.child.start_kill() {
                tracing::warn!(device = %live.device, error = %e, "failed to stop streamer");
            }
            tracing::info!(device = %live.device, "camera stream stopped");
        }
    }

    fn is_streaming(&self) -> bool {
        self.live.is_some()
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError> {
        let live = self.live.as_mut().ok_or(DeviceError::NotStreaming)?;
        // a dead streamer leaves its last snapshot behind
        if let Some(status) = live.child.try_wait()? {
            let device = live.device.clone();
            tracing::warn!(%device, %status, "streamer exited");
            self.live = None;
            return Err(DeviceError::Unavailable { device, reason: format!("streamer exited with {status}") });
        }
        match read_complete_snapshot(&live.snapshot)? {
            Some(data) => CapturedImage::new(data),
            None => Err(DeviceError::NoFrame { device: live.device.clone(), waited_ms: 0 }),
        }
    }
}

impl Drop for StreamCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_complete_jpeg(data: &[u8]) -> bool {
    data.len() > JPEG_EOI.len() && data.ends_with(&JPEG_EOI)
}

/// Read the snapshot, rereading when the streamer is mid-write. `None` when
/// no read produced a complete JPEG.
fn read_complete_snapshot(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    for _ in 0..SNAPSHOT_READS {
        let data = std::fs::read(path)?;
        if is_complete_jpeg(&data) {
            return Ok(Some(data));
        }
    }
    Ok(None)
}
