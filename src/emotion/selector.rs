//! Picks the reported emotion and renders it for the wire.

use std::fmt;

use super::types::{Emotion, EmotionScores, FaceDetection};

/// The single emotion reported to the peer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionReport {
    pub label: Emotion,
    /// `100 × confidence`, in `[0, 100]`, widened before scaling so
    /// `{:.1}` rounds the exact product
    pub percentage: f64,
}

impl EmotionReport {
    pub fn new(label: Emotion, percentage: f64) -> Self {
        Self { label, percentage }
    }

    /// Wire message: `<label>:<percentage with one decimal>`, no delimiter.
    pub fn to_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EmotionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:.1}", self.label, self.percentage)
    }
}

/// Highest-confidence emotion of one face.
///
/// Exact ties resolve to the emotion that comes first in [`Emotion::ALL`].
pub fn select_emotion(scores: &EmotionScores) -> EmotionReport {
    let (label, confidence) = scores
        .iter()
        .fold((Emotion::ALL[0], f32::NEG_INFINITY), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });
    EmotionReport::new(label, f64::from(confidence) * 100.0)
}

/// Report for the first detected face, or `None` when no face was found.
pub fn report_for(detections: &[FaceDetection]) -> Option<EmotionReport> {
    detections.first().map(|face| select_emotion(&face.scores))
}
