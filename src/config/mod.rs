// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from environment variables

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::damage::{DamageTaxonomy, ReportSettings, TaxonomyError};
use crate::detection::{YoloDetectorConfig, DEFAULT_CLASS_NAMES, YOLO_INPUT_SIZE};
use crate::imaging::DEFAULT_MAX_IMAGE_BYTES;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid listen address '{0}'")]
    InvalidListenAddr(String),

    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),

    #[error("DAMAGE_MODEL_CLASSES must name at least one class")]
    NoClasses,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub listen_addr: String,
    /// ONNX model file
    pub model_path: PathBuf,
    /// Model class names in output order
    pub class_names: Vec<String>,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
    /// Optional TOML taxonomy; the built-in table is used when unset
    pub taxonomy_path: Option<PathBuf>,
    pub max_batch_images: usize,
    pub max_image_bytes: usize,
    pub currency_symbol: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults for
    /// missing or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            listen_addr: lookup("DAMAGE_API_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            model_path: lookup("DAMAGE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            class_names: lookup("DAMAGE_MODEL_CLASSES")
                .map(|v| parse_class_list(&v))
                .unwrap_or(defaults.class_names),
            confidence_threshold: parse_var(&lookup, "DAMAGE_CONFIDENCE_THRESHOLD")
                .unwrap_or(defaults.confidence_threshold),
            iou_threshold: parse_var(&lookup, "DAMAGE_IOU_THRESHOLD")
                .unwrap_or(defaults.iou_threshold),
            intra_threads: parse_var(&lookup, "DAMAGE_INTRA_THREADS")
                .unwrap_or(defaults.intra_threads),
            taxonomy_path: lookup("DAMAGE_TAXONOMY_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            max_batch_images: parse_var(&lookup, "MAX_BATCH_IMAGES")
                .unwrap_or(defaults.max_batch_images),
            max_image_bytes: parse_var(&lookup, "MAX_IMAGE_BYTES")
                .unwrap_or(defaults.max_image_bytes),
            currency_symbol: lookup("REPORT_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidListenAddr(self.listen_addr.clone()))?;

        for (name, value) in [
            ("DAMAGE_CONFIDENCE_THRESHOLD", self.confidence_threshold),
            ("DAMAGE_IOU_THRESHOLD", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.class_names.is_empty() {
            return Err(ConfigError::NoClasses);
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Zero("DAMAGE_INTRA_THREADS"));
        }
        if self.max_batch_images == 0 {
            return Err(ConfigError::Zero("MAX_BATCH_IMAGES"));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Zero("MAX_IMAGE_BYTES"));
        }
        Ok(())
    }

    /// Largest accepted request body: a full batch of base64 images plus
    /// room for the JSON envelope
    pub fn max_request_bytes(&self) -> usize {
        self.max_image_bytes
            .saturating_mul(self.max_batch_images)
            .saturating_mul(4)
            / 3
            + 64 * 1024
    }

    /// Taxonomy from `taxonomy_path`, or the built-in table when unset
    pub fn load_taxonomy(&self) -> Result<DamageTaxonomy, TaxonomyError> {
        match &self.taxonomy_path {
            Some(path) => DamageTaxonomy::from_toml_file(path),
            None => Ok(DamageTaxonomy::builtin()),
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        let model_stem = self
            .model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "car_damage_best".to_string());

        ReportSettings {
            model: format!("YOLOv8 ({})", model_stem),
            currency_symbol: self.currency_symbol.clone(),
            ..ReportSettings::default()
        }
    }

    pub fn detector_config(&self) -> YoloDetectorConfig {
        YoloDetectorConfig {
            model_path: self.model_path.clone(),
            class_names: self.class_names.clone(),
            input_size: YOLO_INPUT_SIZE,
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            intra_threads: self.intra_threads,
            ..YoloDetectorConfig::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            model_path: PathBuf::from("./models/car_damage_best.onnx"),
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            intra_threads: 4,
            taxonomy_path: None,
            max_batch_images: 10,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            currency_symbol: "R$".to_string(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Split a comma separated class list, dropping blanks
fn parse_class_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
