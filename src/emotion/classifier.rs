//! The classifier seam the streaming loop calls once per frame.

use crate::camera::Frame;
use crate::error::ClassifierError;

use super::types::FaceDetection;

/// Finds faces in a frame and scores each one.
///
/// An empty result means "no face in this frame" and is not an error.
/// Faces are returned in the detector's own order; the bridge reports the first.
pub trait EmotionDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceDetection>, ClassifierError>;
}

impl<D: EmotionDetector + ?Sized> EmotionDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceDetection>, ClassifierError> {
        (**self).detect(frame)
    }
}

/// Rejects frames whose buffer does not match their dimensions before any
/// backend touches the bytes.
pub fn ensure_well_formed(frame: &Frame) -> Result<(), ClassifierError> {
    if frame.is_well_formed() {
        Ok(())
    } else {
        Err(ClassifierError::InvalidFrame(format!(
            "{}x{} frame carries {} bytes",
            frame.width,
            frame.height,
            frame.data.len()
        )))
    }
}
