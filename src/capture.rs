//! Capture adapter boundary: uploaded bytes, camera frames, and the
//! device location sensor.
//!
//! The capture devices themselves live outside this crate. They are
//! modeled as capability traits so the reconciler can be driven by real
//! hardware in an embedding shell and by mocks in tests.

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::location::Coordinates;

/// An image as handed over by a capture adapter: opaque bytes plus the
/// declared MIME type. Never mutated, only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl RawImage {
    /// Accept picker- or drag-drop-provided bytes.
    ///
    /// Any MIME type not prefixed `image/` is rejected at the boundary
    /// with a user-visible message; no pipeline state changes.
    pub fn from_upload(bytes: Vec<u8>, mime: &str) -> Result<Self> {
        if !mime.starts_with("image/") {
            bail!("Please upload an image file");
        }
        Ok(Self { bytes, mime: mime.to_string() })
    }

    /// Wrap a frame grabbed from the camera. Frames arrive JPEG-encoded.
    pub fn camera_frame(bytes: Vec<u8>) -> Self {
        Self { bytes, mime: "image/jpeg".to_string() }
    }
}

/// A live camera device (rear-facing preference is the implementor's
/// concern). The stream is a scoped resource: implementors must release
/// it in [`stop`](CameraSource::stop), and callers must reach `stop` on
/// every exit path — use [`capture_frame`] for the common one-shot flow.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire the video stream.
    async fn start(&self) -> Result<()>;
    /// Grab the current frame as encoded image bytes.
    async fn grab_frame(&self) -> Result<RawImage>;
    /// Release the stream. Infallible: implementors log their own cleanup
    /// failures.
    async fn stop(&self);
}

/// One-shot device geolocation read with high-accuracy preference.
///
/// Access and permission failures surface as errors; the reconciler
/// downgrades them to a reportable note and falls back to manual entry.
#[async_trait]
pub trait GeoSensor: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Grab a single photo from the camera, releasing the stream whether or
/// not the grab succeeds.
pub async fn capture_frame(camera: &dyn CameraSource) -> Result<RawImage> {
    camera.start().await?;
    let frame = camera.grab_frame().await;
    camera.stop().await;
    frame
}
