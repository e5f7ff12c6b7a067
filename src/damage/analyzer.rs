// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Damage analyzer tying a detector to the report pipeline
//!
//! The analyzer owns the taxonomy and report settings and holds an optional
//! detector. Without a ready detector every image operation fails with
//! `DamageError::ModelUnavailable`; the pure pipeline stays usable.

use chrono::Local;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, warn};

use super::batch::{consolidate_batch, BatchResult, ImageDetections};
use super::error::DamageError;
use super::pipeline::{analyze_detections, ImageAnalysis};
use super::record::RawDetection;
use super::report::{ReportSettings, VehicleInfoInput};
use super::taxonomy::{DamageTaxonomy, TaxonomyError};
use crate::config::ServiceConfig;
use crate::detection::DamageDetector;
use crate::imaging::{decode_base64_image, decode_image_bytes, DEFAULT_MAX_IMAGE_BYTES};

#[derive(Clone)]
pub struct DamageAnalyzer {
    taxonomy: Arc<DamageTaxonomy>,
    settings: Arc<ReportSettings>,
    detector: Option<Arc<dyn DamageDetector>>,
    max_image_bytes: usize,
}

impl std::fmt::Debug for DamageAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageAnalyzer")
            .field("classes", &self.taxonomy.len())
            .field("settings", &self.settings)
            .field("is_ready", &self.is_ready())
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl DamageAnalyzer {
    pub fn new(taxonomy: DamageTaxonomy, settings: ReportSettings) -> Self {
        Self {
            taxonomy: Arc::new(taxonomy),
            settings: Arc::new(settings),
            detector: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Analyzer with the configured taxonomy, report settings and size limit
    pub fn from_config(
        config: &ServiceConfig,
        detector: Arc<dyn DamageDetector>,
    ) -> Result<Self, TaxonomyError> {
        let taxonomy = config.load_taxonomy()?;
        Ok(Self::new(taxonomy, config.report_settings())
            .with_detector(detector)
            .with_max_image_bytes(config.max_image_bytes))
    }

    pub fn with_detector(mut self, detector: Arc<dyn DamageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn taxonomy(&self) -> &DamageTaxonomy {
        &self.taxonomy
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn detector(&self) -> Option<&Arc<dyn DamageDetector>> {
        self.detector.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.detector.as_ref().is_some_and(|d| d.is_ready())
    }

    fn ready_detector(&self) -> Result<&Arc<dyn DamageDetector>, DamageError> {
        match &self.detector {
            Some(detector) if detector.is_ready() => Ok(detector),
            _ => Err(DamageError::ModelUnavailable),
        }
    }

    /// Run the detector on a decoded image
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, DamageError> {
        let detector = self.ready_detector()?;
        detector.detect(image).map_err(|e| {
            warn!("Damage detection failed: {:#}", e);
            DamageError::Detection(format!("{:#}", e))
        })
    }

    /// Decode a base64 payload and run the detector on it
    pub fn detect_encoded(&self, payload: &str) -> ImageDetections {
        self.ready_detector()?;
        let (image, info) = decode_base64_image(payload, self.max_image_bytes)?;
        debug!(
            "Decoded {}x{} {:?} image ({} bytes)",
            info.width, info.height, info.format, info.size_bytes
        );
        self.detect(&image)
    }

    /// Decode raw upload bytes and run the detector on them
    pub fn detect_bytes(&self, bytes: &[u8]) -> ImageDetections {
        self.ready_detector()?;
        let (image, info) = decode_image_bytes(bytes, self.max_image_bytes)?;
        debug!(
            "Decoded {}x{} {:?} image ({} bytes)",
            info.width, info.height, info.format, info.size_bytes
        );
        self.detect(&image)
    }

    /// Turn detections into records, summary and report
    pub fn analyze_detections(
        &self,
        detections: Vec<RawDetection>,
        vehicle: Option<&VehicleInfoInput>,
    ) -> ImageAnalysis {
        analyze_detections(
            detections,
            vehicle,
            &self.taxonomy,
            &self.settings,
            Local::now().naive_local(),
        )
    }

    /// Fold per-image detection outcomes into a batch result
    pub fn consolidate(
        &self,
        outcomes: Vec<ImageDetections>,
        vehicle: Option<&VehicleInfoInput>,
    ) -> BatchResult {
        consolidate_batch(outcomes, vehicle, &self.taxonomy, &self.settings)
    }
}
