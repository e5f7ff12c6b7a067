// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-image pipeline: detections -> records -> summary -> report

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::record::{build_damage_records, DamageRecord, RawDetection};
use super::report::{compose_report, DamageReport, ReportSettings, VehicleInfoInput};
use super::summary::{summarize, DamageSummary};
use super::taxonomy::DamageTaxonomy;

/// Everything derived from one image's detections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub detections: Vec<RawDetection>,
    pub damage_analysis: Vec<DamageRecord>,
    pub summary: DamageSummary,
    pub full_report: DamageReport,
}

pub fn analyze_detections(
    detections: Vec<RawDetection>,
    vehicle: Option<&VehicleInfoInput>,
    taxonomy: &DamageTaxonomy,
    settings: &ReportSettings,
    timestamp: NaiveDateTime,
) -> ImageAnalysis {
    let damages = build_damage_records(&detections, taxonomy);
    let summary = summarize(&damages);
    let full_report = compose_report(&summary, &damages, vehicle, settings, timestamp);

    ImageAnalysis {
        detections,
        damage_analysis: damages,
        summary,
        full_report,
    }
}
