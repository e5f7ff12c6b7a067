// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for integration tests
#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDate, NaiveDateTime};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use vehicle_damage_api::{
    api::AppState,
    damage::{BoundingBox, RawDetection, ReportSettings},
    DamageAnalyzer, DamageDetector, DamageTaxonomy, ServiceConfig,
};

// 1x1 red PNG - minimal valid image
pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

// 1x1 GIF - minimal valid image
pub const TINY_GIF_BASE64: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// Image width that makes `StubDetector` fail inference
pub const FAILING_WIDTH: u32 = 13;

mockall::mock! {
    pub Detector {}

    impl DamageDetector for Detector {
        fn is_ready(&self) -> bool;
        fn model_name(&self) -> &str;
        fn class_names(&self) -> &[String];
        fn confidence_threshold(&self) -> f32;
        fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<RawDetection>>;
    }
}

/// Detector returning fixed detections for every image
pub struct StubDetector {
    pub ready: bool,
    pub detections: Vec<RawDetection>,
    pub class_names: Vec<String>,
}

impl StubDetector {
    pub fn with_detections(detections: Vec<RawDetection>) -> Self {
        Self {
            ready: true,
            detections,
            class_names: ["dent", "scratch", "crack", "shattered_glass", "broken_lamp", "flat_tire"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::with_detections(vec![])
        }
    }
}

impl DamageDetector for StubDetector {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn model_name(&self) -> &str {
        "stub_damage_model"
    }

    fn model_path(&self) -> Option<&str> {
        Some("/models/stub_damage_model.onnx")
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn confidence_threshold(&self) -> f32 {
        0.25
    }

    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<RawDetection>> {
        if image.width() == FAILING_WIDTH {
            anyhow::bail!("simulated inference failure");
        }
        Ok(self.detections.clone())
    }
}

pub fn det(class_id: &str, confidence: f32) -> RawDetection {
    RawDetection::new(class_id, confidence, BoundingBox::new(0.0, 0.0, 10.0, 10.0))
}

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|d| d.and_hms_micro_opt(9, 26, 53, 589_793))
        .unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 40, 40])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(png_bytes(width, height))
}

pub fn analyzer_with(detector: impl DamageDetector + 'static) -> DamageAnalyzer {
    DamageAnalyzer::new(DamageTaxonomy::builtin(), ReportSettings::default())
        .with_detector(Arc::new(detector))
}

pub fn test_state(detector: impl DamageDetector + 'static) -> AppState {
    AppState::new(analyzer_with(detector), ServiceConfig::default())
}

/// State whose analyzer has no detector at all
pub fn state_without_detector() -> AppState {
    AppState::new(
        DamageAnalyzer::new(DamageTaxonomy::builtin(), ReportSettings::default()),
        ServiceConfig::default(),
    )
}
