//! Haar-cascade face detection plus ONNX emotion classification.

use std::path::Path;

use ndarray::Array4;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use ort::session::Session;
use ort::value::Tensor;

use crate::camera::Frame;
use crate::error::ClassifierError;

use super::classifier::{ensure_well_formed, EmotionDetector};
use super::types::{normalize_scores, Emotion, EmotionScores, FaceBox, FaceDetection};

/// Edge length of the square grayscale crop the model consumes.
const MODEL_INPUT_SIZE: usize = 48;

/// Emotion detector backed by an OpenCV cascade and an ONNX Runtime session.
pub struct FerDetector {
    cascade: CascadeClassifier,
    session: Session,
    min_face_size: i32,
}

impl FerDetector {
    /// Load both models.
    ///
    /// # Errors
    /// * `ClassifierError::ModelLoad` - a file is missing, unreadable or empty
    pub fn load(
        cascade_path: &Path,
        model_path: &Path,
        min_face_size: u32,
    ) -> Result<Self, ClassifierError> {
        let cascade_str = cascade_path.to_str().ok_or_else(|| {
            ClassifierError::ModelLoad(format!(
                "Cascade path is not valid UTF-8: {}",
                cascade_path.display()
            ))
        })?;
        if !cascade_path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Haar cascade not found: {}",
                cascade_path.display()
            )));
        }
        let cascade = CascadeClassifier::new(cascade_str).map_err(|e| {
            ClassifierError::ModelLoad(format!("Haar cascade load failed: {}", e))
        })?;
        let is_empty = cascade
            .empty()
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;
        if is_empty {
            return Err(ClassifierError::ModelLoad(format!(
                "Haar cascade is empty: {}",
                cascade_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                ClassifierError::ModelLoad(format!("Failed to create session builder: {}", e))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                ClassifierError::ModelLoad(format!(
                    "ONNX model load failed ({}): {}",
                    model_path.display(),
                    e
                ))
            })?;

        log::info!(
            "Loaded face cascade {} and emotion model {}",
            cascade_path.display(),
            model_path.display()
        );

        Ok(Self {
            cascade,
            session,
            min_face_size: min_face_size as i32,
        })
    }

    fn to_grayscale(frame: &Frame) -> Result<Mat, ClassifierError> {
        let flat = Mat::from_slice(&frame.data).map_err(face_error("create Mat"))?;
        let rgb = flat
            .reshape(3, frame.height as i32)
            .map_err(face_error("reshape Mat"))?;

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY)
            .map_err(face_error("convert to grayscale"))?;
        Ok(gray)
    }

    fn find_faces(&mut self, gray: &Mat) -> Result<Vec<Rect>, ClassifierError> {
        let mut faces = Vector::<Rect>::new();
        self.cascade
            .detect_multi_scale(
                gray,
                &mut faces,
                1.1,
                5,
                0,
                Size::new(self.min_face_size, self.min_face_size),
                Size::new(0, 0),
            )
            .map_err(face_error("detect faces"))?;
        Ok(faces.to_vec())
    }

    /// Crop, resize to 48x48 and scale to `[0, 1]`.
    fn preprocess(gray: &Mat, rect: Rect) -> Result<Vec<f32>, ClassifierError> {
        let roi = Mat::roi(gray, rect).map_err(face_error("crop face"))?;

        let mut resized = Mat::default();
        let side = MODEL_INPUT_SIZE as i32;
        imgproc::resize(
            &roi,
            &mut resized,
            Size::new(side, side),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )
        .map_err(face_error("resize face"))?;

        let pixels = resized.data_bytes().map_err(face_error("read face pixels"))?;
        Ok(pixels.iter().map(|&p| p as f32 / 255.0).collect())
    }

    fn classify(&mut self, face: Vec<f32>) -> Result<EmotionScores, ClassifierError> {
        let input = Array4::from_shape_vec((1, 1, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE), face)
            .map_err(|e| ClassifierError::Inference(format!("Bad input shape: {}", e)))?;
        let tensor = Tensor::from_array(input)
            .map_err(|e| ClassifierError::Inference(format!("Failed to create tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifierError::Inference("Model produced no outputs".to_string()))?;
        let (_, raw) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Failed to read output: {}", e)))?;

        let probabilities = normalize_scores(raw);
        EmotionScores::from_probabilities(&probabilities).ok_or_else(|| {
            ClassifierError::Inference(format!(
                "Expected {} emotion scores, model produced {}",
                Emotion::COUNT,
                probabilities.len()
            ))
        })
    }
}

impl EmotionDetector for FerDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceDetection>, ClassifierError> {
        ensure_well_formed(frame)?;
        let gray = Self::to_grayscale(frame)?;

        let mut detections = Vec::new();
        for rect in self.find_faces(&gray)? {
            let face = Self::preprocess(&gray, rect)?;
            let scores = self.classify(face)?;
            detections.push(FaceDetection::new(
                FaceBox {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                },
                scores,
            ));
        }
        Ok(detections)
    }
}

fn face_error(step: &'static str) -> impl Fn(opencv::Error) -> ClassifierError {
    move |e| ClassifierError::FaceDetection(format!("Failed to {}: {}", step, e))
}
