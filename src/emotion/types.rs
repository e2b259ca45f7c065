//! Emotion labels, per-face score tables and detections.

use std::fmt;

/// Emotion classes produced by the FER-style classifier.
///
/// Declaration order is the canonical order: model output index `i` maps to
/// `Emotion::ALL[i]`, and ties between equal scores go to the earlier entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const COUNT: usize = 7;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// Wire label, lowercase.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence for every emotion class of one face, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionScores([f32; Emotion::COUNT]);

impl EmotionScores {
    /// Build from a probability vector in canonical order.
    ///
    /// Returns `None` if the vector does not have one entry per class.
    pub fn from_probabilities(probabilities: &[f32]) -> Option<Self> {
        let values: [f32; Emotion::COUNT] = probabilities.try_into().ok()?;
        let mut scores = Self::default();
        for (emotion, value) in Emotion::ALL.into_iter().zip(values) {
            scores.set(emotion, value);
        }
        Some(scores)
    }

    /// Builder-style setter; classes never set stay at 0.
    pub fn with(mut self, emotion: Emotion, confidence: f32) -> Self {
        self.set(emotion, confidence);
        self
    }

    /// Store a confidence, clamped to `[0, 1]`. Non-finite values become 0.
    pub fn set(&mut self, emotion: Emotion, confidence: f32) {
        let value = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.0[emotion.index()] = value;
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        self.0[emotion.index()]
    }

    /// `(emotion, confidence)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.into_iter().zip(self.0.iter().copied())
    }
}

/// Axis-aligned face rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One face found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub face: FaceBox,
    pub scores: EmotionScores,
}

impl FaceDetection {
    pub fn new(face: FaceBox, scores: EmotionScores) -> Self {
        Self { face, scores }
    }
}

/// Turn raw model outputs into a probability distribution.
///
/// Outputs that already look like probabilities (every value in `[0, 1]`,
/// summing to ~1) pass through untouched; anything else is treated as logits
/// and run through a numerically stable softmax.
pub fn normalize_scores(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }

    let sum: f32 = raw.iter().sum();
    let is_distribution = raw.iter().all(|v| (0.0..=1.0).contains(v)) && (sum - 1.0).abs() < 1e-3;
    if is_distribution {
        return raw.to_vec();
    }

    let max_logit = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = raw.iter().map(|&x| (x - max_logit).exp()).collect();
    let exp_sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / exp_sum).collect()
}
