//! Frames, capture settings and the camera error type.

use std::fmt;

/// One camera as reported by the capture backend.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Index accepted by `--camera` and `camera.device`
    pub index: u32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480 (VGA), the default capture size
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layout of [`Frame::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// 8-bit R, G, B
    Rgb,
}

/// One still image, owned by the loop for a single iteration.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Tightly packed rows, `width * height * bytes_per_pixel` bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
}

impl Frame {
    /// Wrap tightly packed RGB bytes.
    pub fn rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
        }
    }

    /// Bytes per pixel for [`Frame::format`].
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }

    /// True when the buffer length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * self.bytes_per_pixel()
    }
}

/// What to ask the driver for. It may grant something close instead.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device_index: u32,
    pub resolution: Resolution,
    pub fps: u32,
    /// Flip each frame left-right before classification and preview
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: false,
        }
    }
}

/// A blocking, lazily evaluated sequence of frames.
///
/// `None` means end-of-stream: the device stopped producing frames and the
/// caller should wind down. It is not an error.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }
}

/// Why the camera could not be listed, opened or started.
///
/// All of these are fatal at startup. Once streaming, a failing device shows
/// up as end-of-stream from [`FrameSource::next_frame`] instead.
#[derive(Debug)]
pub enum CameraError {
    QueryFailed(String),
    OpenFailed(String),
    /// The OS refused access to the device.
    PermissionDenied,
    DeviceNotFound(u32),
    StreamFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::QueryFailed(msg) => write!(f, "could not enumerate cameras ({})", msg),
            CameraError::OpenFailed(msg) => write!(f, "could not open camera ({})", msg),
            CameraError::PermissionDenied => f.write_str(
                "access to the camera was denied; allow camera use for this terminal and retry",
            ),
            CameraError::DeviceNotFound(index) => write!(
                f,
                "no camera with index {} (see `emotion-bridge list-cameras`)",
                index
            ),
            CameraError::StreamFailed(msg) => write!(f, "camera opened but would not stream ({})", msg),
        }
    }
}

impl std::error::Error for CameraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 2,
            name: "USB Webcam".to_string(),
            description: "uvcvideo".to_string(),
        };
        assert_eq!(info.to_string(), "[2] USB Webcam (uvcvideo)");
    }

    #[test]
    fn test_resolution_default_is_vga() {
        let res = Resolution::default();
        assert_eq!(res, Resolution { width: 640, height: 480 });
        assert_eq!(res.to_string(), "640x480");
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert_eq!(settings.resolution, Resolution::VGA);
        assert_eq!(settings.fps, 30);
        assert!(!settings.mirror);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(
            CameraError::DeviceNotFound(5).to_string(),
            "no camera with index 5 (see `emotion-bridge list-cameras`)"
        );
        assert_eq!(
            CameraError::StreamFailed("busy".to_string()).to_string(),
            "camera opened but would not stream (busy)"
        );
        assert!(CameraError::PermissionDenied.to_string().contains("denied"));
    }

    #[test]
    fn test_frame_well_formed() {
        let frame = Frame::rgb(vec![0; 6], 2, 1);
        assert_eq!(frame.bytes_per_pixel(), 3);
        assert!(frame.is_well_formed());

        let truncated = Frame::rgb(vec![0; 5], 2, 1);
        assert!(!truncated.is_well_formed());

        let empty = Frame::rgb(Vec::new(), 0, 0);
        assert!(!empty.is_well_formed());
    }

    struct Countdown(u32);

    impl FrameSource for Countdown {
        fn next_frame(&mut self) -> Option<Frame> {
            if self.0 == 0 {
                return None;
            }
            self.0 -= 1;
            Some(Frame::rgb(vec![0; 3], 1, 1))
        }
    }

    #[test]
    fn test_boxed_frame_source_forwards() {
        let mut source: Box<dyn FrameSource> = Box::new(Countdown(2));
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
    }
}
