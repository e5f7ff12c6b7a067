// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection backends producing raw damage detections

pub mod postprocessing;
pub mod preprocessing;
pub mod yolo;

use anyhow::Result;
use image::DynamicImage;

use crate::damage::RawDetection;

pub use postprocessing::{decode_output, nms, Candidate, PostprocessParams};
pub use preprocessing::{letterbox, Letterbox, YOLO_INPUT_SIZE};
pub use yolo::{YoloDamageDetector, YoloDetectorConfig, DEFAULT_CLASS_NAMES};

/// Source of raw detections for a decoded image
///
/// The analyzer only sees this trait, so tests and alternate runtimes can
/// stand in for the ONNX model.
pub trait DamageDetector: Send + Sync {
    /// Whether a model is loaded and inference can run
    fn is_ready(&self) -> bool;

    fn model_name(&self) -> &str;

    fn model_path(&self) -> Option<&str> {
        None
    }

    /// Class names in model output order
    fn class_names(&self) -> &[String];

    fn confidence_threshold(&self) -> f32;

    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>>;
}
