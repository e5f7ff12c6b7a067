// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 car-damage detector on ONNX Runtime
//!
//! The model is exported from Ultralytics with a single `[1, 3, 640, 640]`
//! input and a `[1, 4 + nc, 8400]` output. Inference runs on CPU.

use anyhow::{anyhow, bail, Context, Result};
use image::DynamicImage;
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::postprocessing::{decode_output, PostprocessParams};
use super::preprocessing::{letterbox, YOLO_INPUT_SIZE};
use super::DamageDetector;
use crate::damage::RawDetection;

/// Output order of the car_damage_best export (CarDD classes)
pub const DEFAULT_CLASS_NAMES: &[&str] = &[
    "dent",
    "scratch",
    "crack",
    "shattered_glass",
    "broken_lamp",
    "flat_tire",
];

#[derive(Debug, Clone)]
pub struct YoloDetectorConfig {
    pub model_path: PathBuf,
    pub class_names: Vec<String>,
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl Default for YoloDetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/car_damage_best.onnx"),
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            input_size: YOLO_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

impl YoloDetectorConfig {
    fn postprocess_params(&self) -> PostprocessParams {
        PostprocessParams {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
            num_classes: self.class_names.len(),
        }
    }

    /// Map a model class index to its id; unknown indices stay addressable
    pub fn class_name(&self, index: usize) -> String {
        self.class_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", index))
    }
}

struct LoadedModel {
    session: Mutex<Session>,
    input_name: String,
}

pub struct YoloDamageDetector {
    config: YoloDetectorConfig,
    model: Option<LoadedModel>,
    model_name: String,
    model_path: String,
}

impl std::fmt::Debug for YoloDamageDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDamageDetector")
            .field("model_path", &self.model_path)
            .field("is_ready", &self.model.is_some())
            .field("confidence_threshold", &self.config.confidence_threshold)
            .finish_non_exhaustive()
    }
}

impl YoloDamageDetector {
    /// Load the ONNX model; fails if the file is missing or invalid
    pub fn load(config: YoloDetectorConfig) -> Result<Self> {
        let model_path = config.model_path.clone();
        if !model_path.exists() {
            bail!("Damage detection model not found: {}", model_path.display());
        }

        info!("Loading damage detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(ort::Error::<()>::from)
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set intra threads")?
            .commit_from_file(&model_path)
            .context(format!(
                "Failed to load damage detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .unwrap_or_else(|| "images".to_string());

        debug!(
            "Damage model loaded - input: {}, classes: {:?}",
            input_name, config.class_names
        );
        info!("✅ Damage detection model loaded (CPU)");

        Ok(Self {
            model_name: model_name_from_path(&model_path),
            model_path: model_path.display().to_string(),
            model: Some(LoadedModel {
                session: Mutex::new(session),
                input_name,
            }),
            config,
        })
    }

    /// Load the model, or return a detector that reports not ready
    pub fn load_or_unavailable(config: YoloDetectorConfig) -> Self {
        match Self::load(config.clone()) {
            Ok(detector) => detector,
            Err(e) => {
                warn!("Damage detection model unavailable: {:#}", e);
                Self::unavailable(config)
            }
        }
    }

    pub fn unavailable(config: YoloDetectorConfig) -> Self {
        Self {
            model_name: model_name_from_path(&config.model_path),
            model_path: config.model_path.display().to_string(),
            model: None,
            config,
        }
    }

    pub fn config(&self) -> &YoloDetectorConfig {
        &self.config
    }
}

impl DamageDetector for YoloDamageDetector {
    fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn model_path(&self) -> Option<&str> {
        Some(&self.model_path)
    }

    fn class_names(&self) -> &[String] {
        &self.config.class_names
    }

    fn confidence_threshold(&self) -> f32 {
        self.config.confidence_threshold
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("Damage detection model is not loaded"))?;

        let (tensor, transform) = letterbox(image, self.config.input_size);
        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = model
            .session
            .lock()
            .map_err(|_| anyhow!("Damage detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&model.input_name => input_value])
            .context("Damage detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Damage detection output shape: {:?}", output_tensor.shape());

        let candidates = decode_output(
            output_tensor.view(),
            &transform,
            &self.config.postprocess_params(),
        )?;

        let detections: Vec<RawDetection> = candidates
            .into_iter()
            .map(|c| RawDetection::new(self.config.class_name(c.class_index), c.confidence, c.bbox))
            .collect();

        debug!("Detected {} damage regions", detections.len());
        Ok(detections)
    }
}

fn model_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}
