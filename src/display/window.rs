//! OpenCV HighGUI preview window.

use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc};

use crate::camera::{rgb_to_bgr, Frame};
use crate::emotion::{EmotionReport, FaceDetection};
use crate::error::DisplayError;

use super::{label_origin, overlay_label, DisplaySurface};

const FONT_SCALE: f64 = 0.9;
const TEXT_HEIGHT: i32 = 20;

/// A named HighGUI window, destroyed on drop.
pub struct HighguiWindow {
    title: String,
    quit_key: char,
    poll_ms: i32,
}

impl HighguiWindow {
    /// Open the window.
    ///
    /// # Errors
    /// * `DisplayError::Open` - no display server or HighGUI backend
    pub fn open(title: &str, quit_key: char, poll_ms: u32) -> Result<Self, DisplayError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE).map_err(|e| DisplayError::Open {
            title: title.to_string(),
            message: e.to_string(),
        })?;
        log::info!("Preview window '{}' open, press '{}' to quit", title, quit_key);

        Ok(Self {
            title: title.to_string(),
            quit_key,
            poll_ms: poll_ms.max(1) as i32,
        })
    }

    fn to_bgr_mat(frame: &Frame) -> opencv::Result<Mat> {
        let bgr = rgb_to_bgr(frame);
        let flat = Mat::from_slice(&bgr)?;
        flat.reshape(3, frame.height as i32)?.try_clone()
    }

    fn annotate(
        image: &mut Mat,
        detections: &[FaceDetection],
        report: Option<&EmotionReport>,
    ) -> opencv::Result<()> {
        let box_color = Scalar::new(255.0, 0.0, 0.0, 0.0);
        let text_color = Scalar::new(36.0, 255.0, 12.0, 0.0);

        for detection in detections {
            let face = &detection.face;
            let rect = Rect::new(face.x, face.y, face.width, face.height);
            imgproc::rectangle(image, rect, box_color, 2, imgproc::LINE_8, 0)?;
        }

        // Only the reported face gets a label.
        if let (Some(first), Some(report)) = (detections.first(), report) {
            let (x, y) = label_origin(&first.face, TEXT_HEIGHT);
            imgproc::put_text(
                image,
                &overlay_label(report),
                Point::new(x, y),
                imgproc::FONT_HERSHEY_SIMPLEX,
                FONT_SCALE,
                text_color,
                2,
                imgproc::LINE_8,
                false,
            )?;
        }
        Ok(())
    }
}

impl DisplaySurface for HighguiWindow {
    fn show(
        &mut self,
        frame: &Frame,
        detections: &[FaceDetection],
        report: Option<&EmotionReport>,
    ) -> Result<(), DisplayError> {
        let render_error = |e: opencv::Error| DisplayError::Render(e.to_string());
        let mut image = Self::to_bgr_mat(frame).map_err(render_error)?;
        Self::annotate(&mut image, detections, report).map_err(render_error)?;
        highgui::imshow(&self.title, &image).map_err(render_error)
    }

    fn quit_requested(&mut self) -> Result<bool, DisplayError> {
        let key = highgui::wait_key(self.poll_ms).map_err(|e| DisplayError::Poll(e.to_string()))?;
        Ok(key >= 0 && (key & 0xFF) as u32 == self.quit_key as u32)
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.title) {
            log::warn!("Failed to close preview window: {}", e);
        } else {
            log::info!("Preview window closed");
        }
    }
}
