//! Camera access for the bridge.
//!
//! - Frame and settings types, plus the [`FrameSource`] seam the loop pulls from
//! - Device enumeration via [`list_devices`] (`vision` feature)
//! - The scoped [`CameraCapture`] handle (`vision` feature)

#[cfg(feature = "vision")]
mod capture;
#[cfg(feature = "vision")]
mod device;
mod frame_utils;
mod types;

#[cfg(feature = "vision")]
pub use capture::CameraCapture;
#[cfg(feature = "vision")]
pub use device::{find_device, list_devices};
pub use frame_utils::{mirror_horizontal, rgb_to_bgr};
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, FrameFormat, FrameSource, Resolution};
