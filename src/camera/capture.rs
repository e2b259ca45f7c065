//! Scoped camera handle used as the bridge's frame source.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;

use super::device::find_device;
use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Frame, FrameSource, Resolution};

/// Consecutive undecodable buffers tolerated before the stream is considered dead.
const MAX_DECODE_FAILURES: u32 = 5;

/// Camera capture handle.
///
/// Owns an open nokhwa stream for its whole lifetime. Frames are pulled
/// synchronously with [`FrameSource::next_frame`]; the stream is stopped
/// when the handle is dropped, whichever way the caller exits.
pub struct CameraCapture {
    camera: Camera,
    settings: CameraSettings,
    actual_resolution: Resolution,
    actual_fps: u32,
    decode_failures: u32,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("actual_resolution", &self.actual_resolution)
            .field("actual_fps", &self.actual_fps)
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Open the configured camera and start streaming.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    /// * `CameraError::PermissionDenied` - If camera access is denied (macOS)
    /// * `CameraError::OpenFailed` - If no requested format could be opened
    /// * `CameraError::StreamFailed` - If the stream fails to start
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let info = find_device(settings.device_index)?;
        log::debug!("Opening camera {}", info);

        let mut camera = open_camera_with_fallback(&CameraIndex::Index(info.index), &settings)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let res = camera.resolution();
        let actual_resolution = Resolution {
            width: res.width(),
            height: res.height(),
        };
        let actual_fps = camera.frame_rate();
        log::info!(
            "Camera {} streaming at {} @ {} fps",
            info.name,
            actual_resolution,
            actual_fps
        );

        Ok(Self {
            camera,
            settings,
            actual_resolution,
            actual_fps,
            decode_failures: 0,
        })
    }

    /// Resolution the driver actually granted.
    pub fn actual_resolution(&self) -> Resolution {
        self.actual_resolution
    }

    /// Frame rate the driver actually granted.
    pub fn actual_fps(&self) -> u32 {
        self.actual_fps
    }
}

impl FrameSource for CameraCapture {
    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let raw = match self.camera.frame() {
                Ok(raw) => raw,
                Err(e) => {
                    log::error!("Failed to grab frame: {}", e);
                    return None;
                }
            };

            match convert_to_rgb(&raw) {
                Some(mut frame) => {
                    self.decode_failures = 0;
                    if self.settings.mirror {
                        mirror_horizontal(&mut frame);
                    }
                    return Some(frame);
                }
                None => {
                    self.decode_failures += 1;
                    if self.decode_failures >= MAX_DECODE_FAILURES {
                        log::error!(
                            "Camera produced {} undecodable frames in a row",
                            self.decode_failures
                        );
                        return None;
                    }
                    log::warn!("Skipping undecodable camera frame");
                }
            }
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Error stopping camera stream: {}", e);
        }
        log::info!("Camera released");
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let requested_resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // NV12 is native on macOS, MJPEG is the common denominator elsewhere,
    // and the last attempt lets the driver pick anything it can decode.
    let format_attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = String::from("no format attempted");

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = e.to_string();
            }
        }
    }

    Err(classify_open_error(&last_error))
}

/// Map a backend error message onto the camera error taxonomy.
fn classify_open_error(message: &str) -> CameraError {
    let msg = message.to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed(message.to_string())
    }
}
