//! Emotion classification.
//!
//! - Canonical label set and per-face score tables
//! - The [`EmotionDetector`] seam and the OpenCV/ONNX [`FerDetector`] (`vision` feature)
//! - Dominant-emotion selection that produces the wire message

mod classifier;
#[cfg(feature = "vision")]
mod fer;
mod selector;
mod types;

pub use classifier::{ensure_well_formed, EmotionDetector};
#[cfg(feature = "vision")]
pub use fer::FerDetector;
pub use selector::{report_for, select_emotion, EmotionReport};
pub use types::{normalize_scores, Emotion, EmotionScores, FaceBox, FaceDetection};
