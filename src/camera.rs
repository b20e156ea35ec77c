/// Camera access module
///
/// Wraps the native capture backend (V4L2 / AVFoundation / MSMF via nokhwa)
/// behind a small frame-source type. The application opens one device at
/// startup, pulls one frame per display tick, and releases the device when
/// the source is dropped.

use image::RgbImage;
use log::{debug, info};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, NokhwaError};
use thiserror::Error;

/// Errors produced by the frame source.
///
/// `DeviceUnavailable` is fatal: the application notifies the user and
/// exits. `ReadFailure` is per-tick: the display loop skips the tick.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The device could not be opened or its stream could not be started
    #[error("no camera available at index {index}")]
    DeviceUnavailable {
        index: u32,
        #[source]
        source: NokhwaError,
    },

    /// The device yielded no decodable frame on this read
    #[error("failed to read a frame from the camera")]
    ReadFailure(#[source] NokhwaError),
}

/// A live frame source backed by one capture device.
///
/// The device stream is started in `open` and stopped exactly once, either
/// by an explicit `release` call or on drop, whichever comes first.
pub struct FrameSource {
    camera: Camera,
    released: bool,
}

impl FrameSource {
    /// Open the capture device at `index` and start streaming.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|source| CameraError::DeviceUnavailable { index, source })?;

        camera
            .open_stream()
            .map_err(|source| CameraError::DeviceUnavailable { index, source })?;

        let resolution = camera.resolution();
        info!(
            "Opened camera {} ({}) at {}x{}",
            index,
            camera.info().human_name(),
            resolution.width(),
            resolution.height()
        );

        Ok(FrameSource {
            camera,
            released: false,
        })
    }

    /// Read one frame and decode it to RGB8.
    ///
    /// Callers are expected to treat a `ReadFailure` as "no frame this
    /// tick" rather than a fatal condition.
    pub fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let buffer = self.camera.frame().map_err(CameraError::ReadFailure)?;
        buffer
            .decode_image::<RgbFormat>()
            .map_err(CameraError::ReadFailure)
    }

    /// Stop the device stream. Safe to call more than once; only the first
    /// call touches the device.
    pub fn release(&mut self) {
        if !self.released {
            if let Err(err) = self.camera.stop_stream() {
                debug!("Error while stopping camera stream: {err}");
            }
            self.released = true;
            info!("Camera released");
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("released", &self.released)
            .finish()
    }
}
