//! Local preview of the annotated camera feed.
//!
//! The streaming loop talks to a [`DisplaySurface`]. [`Headless`] stands in
//! when the preview is disabled; [`HighguiWindow`] draws with OpenCV
//! (`vision` feature).

#[cfg(feature = "vision")]
mod window;

#[cfg(feature = "vision")]
pub use window::HighguiWindow;

use crate::camera::Frame;
use crate::emotion::{EmotionReport, FaceBox, FaceDetection};
use crate::error::DisplayError;

/// Pixels kept between a label's baseline and the top of its face box.
const LABEL_GAP: i32 = 10;

/// Somewhere to show frames and ask whether the user wants to quit.
pub trait DisplaySurface {
    /// Render `frame` with a box around each detection and `report` as the label.
    fn show(
        &mut self,
        frame: &Frame,
        detections: &[FaceDetection],
        report: Option<&EmotionReport>,
    ) -> Result<(), DisplayError>;

    /// Poll for the quit key. Also pumps the window's event queue.
    fn quit_requested(&mut self) -> Result<bool, DisplayError>;
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Box<D> {
    fn show(
        &mut self,
        frame: &Frame,
        detections: &[FaceDetection],
        report: Option<&EmotionReport>,
    ) -> Result<(), DisplayError> {
        (**self).show(frame, detections, report)
    }

    fn quit_requested(&mut self) -> Result<bool, DisplayError> {
        (**self).quit_requested()
    }
}

/// No window at all. Never asks to quit; Ctrl+C ends a headless run.
#[derive(Debug, Default)]
pub struct Headless;

impl DisplaySurface for Headless {
    fn show(
        &mut self,
        _frame: &Frame,
        _detections: &[FaceDetection],
        _report: Option<&EmotionReport>,
    ) -> Result<(), DisplayError> {
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, DisplayError> {
        Ok(false)
    }
}

/// Overlay text for a report, e.g. `happy 73.2%`.
pub fn overlay_label(report: &EmotionReport) -> String {
    format!("{} {:.1}%", report.label, report.percentage)
}

/// Baseline origin for a label drawn above `face`.
///
/// Falls back to just inside the box when the face touches the top edge.
pub fn label_origin(face: &FaceBox, text_height: i32) -> (i32, i32) {
    let above = face.y - LABEL_GAP;
    if above - text_height < 0 {
        (face.x.max(0), face.y.max(0) + text_height + LABEL_GAP)
    } else {
        (face.x.max(0), above)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{Emotion, EmotionScores};

    #[test]
    fn test_overlay_label() {
        let report = EmotionReport::new(Emotion::Happy, 73.24);
        assert_eq!(overlay_label(&report), "happy 73.2%");
    }

    #[test]
    fn test_label_origin_above_face() {
        let face = FaceBox {
            x: 40,
            y: 100,
            width: 80,
            height: 80,
        };
        assert_eq!(label_origin(&face, 20), (40, 90));
    }

    #[test]
    fn test_label_origin_clamped_at_top() {
        let face = FaceBox {
            x: -5,
            y: 4,
            width: 80,
            height: 80,
        };
        assert_eq!(label_origin(&face, 20), (0, 34));
    }

    #[test]
    fn test_headless_never_quits() {
        let mut display = Headless;
        let frame = Frame::rgb(vec![0; 12], 2, 2);
        let detection = FaceDetection::new(
            FaceBox {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
            EmotionScores::default().with(Emotion::Sad, 0.5),
        );
        display.show(&frame, &[detection], None).unwrap();
        assert!(!display.quit_requested().unwrap());
    }
}
