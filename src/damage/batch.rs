// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-image consolidation with per-image failure isolation
//!
//! Each image arrives as an already resolved detection outcome, in original
//! order. Decoding and inference happen upstream and may run concurrently;
//! this module only folds the outcomes, so the result depends on the
//! outcomes alone.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::error::DamageError;
use super::pipeline::{analyze_detections, ImageAnalysis};
use super::record::{round_cents, RawDetection};
use super::report::{format_currency, ReportSettings, VehicleInfo, VehicleInfoInput};
use super::summary::{raw_cost_total, Urgency};
use super::taxonomy::DamageTaxonomy;

/// Detection outcome for one image of a batch
pub type ImageDetections = Result<Vec<RawDetection>, DamageError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub image_index: usize,
    #[serde(flatten)]
    pub analysis: ImageAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedImage {
    pub image_index: usize,
    pub error_type: String,
    pub error: String,
}

/// Per-image slot of a batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageResult {
    Processed(ProcessedImage),
    Failed(FailedImage),
}

impl ImageResult {
    pub fn image_index(&self) -> usize {
        match self {
            ImageResult::Processed(p) => p.image_index,
            ImageResult::Failed(f) => f.image_index,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ImageResult::Failed(_))
    }

    pub fn processed(&self) -> Option<&ProcessedImage> {
        match self {
            ImageResult::Processed(p) => Some(p),
            ImageResult::Failed(_) => None,
        }
    }
}

/// Cross-image totals over successfully processed images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub total_images: usize,
    pub processed_images: usize,
    pub failed_images: usize,
    pub total_damages: usize,
    pub total_cost: f64,
    pub estimated_total_cost: String,
    pub overall_urgency: Urgency,
    pub unique_damage_types: BTreeSet<String>,
    pub vehicle_info: VehicleInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<ImageResult>,
    pub consolidated_report: ConsolidatedReport,
}

/// Consolidate a batch stamped with the current local time
pub fn consolidate_batch(
    outcomes: Vec<ImageDetections>,
    vehicle: Option<&VehicleInfoInput>,
    taxonomy: &DamageTaxonomy,
    settings: &ReportSettings,
) -> BatchResult {
    consolidate_batch_at(outcomes, vehicle, taxonomy, settings, Local::now().naive_local())
}

/// Fold per-image outcomes into a batch result.
///
/// Failed outcomes keep their slot and never stop the rest. The total cost
/// sums raw record costs across images and is rounded once at the end.
pub fn consolidate_batch_at(
    outcomes: Vec<ImageDetections>,
    vehicle: Option<&VehicleInfoInput>,
    taxonomy: &DamageTaxonomy,
    settings: &ReportSettings,
    timestamp: NaiveDateTime,
) -> BatchResult {
    let total_images = outcomes.len();
    let mut results = Vec::with_capacity(total_images);
    let mut total_damages = 0;
    let mut raw_total_cost = 0.0;
    let mut overall_urgency = Urgency::Low;
    let mut unique_damage_types = BTreeSet::new();

    for (image_index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(detections) => {
                let analysis = analyze_detections(detections, vehicle, taxonomy, settings, timestamp);

                total_damages += analysis.summary.total_damages;
                raw_total_cost += raw_cost_total(&analysis.damage_analysis);
                overall_urgency = overall_urgency.max(analysis.summary.urgency);
                unique_damage_types.extend(analysis.summary.damage_types.iter().cloned());

                results.push(ImageResult::Processed(ProcessedImage {
                    image_index,
                    analysis,
                }));
            }
            Err(err) => {
                debug!("Batch image {} failed: {}", image_index, err);
                results.push(ImageResult::Failed(FailedImage {
                    image_index,
                    error_type: err.kind().to_string(),
                    error: format!("Failed to process image {}: {}", image_index, err),
                }));
            }
        }
    }

    let failed_images = results.iter().filter(|r| r.is_failed()).count();
    let total_cost = round_cents(raw_total_cost);

    BatchResult {
        results,
        consolidated_report: ConsolidatedReport {
            total_images,
            processed_images: total_images - failed_images,
            failed_images,
            total_damages,
            total_cost,
            estimated_total_cost: format_currency(total_cost, &settings.currency_symbol),
            overall_urgency,
            unique_damage_types,
            vehicle_info: VehicleInfo::resolve(vehicle),
        },
    }
}
