// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect response types

use serde::{Deserialize, Serialize};

use crate::damage::ImageAnalysis;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingInfo {
    pub total_detections: usize,
    pub model_version: String,
    pub confidence_threshold: f32,
    pub processing_time_ms: u64,
}

/// Response from POST /api/damage/detect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    /// detections, damage_analysis, summary and full_report
    #[serde(flatten)]
    pub analysis: ImageAnalysis,
    pub processing_info: ProcessingInfo,
}

impl DetectResponse {
    pub fn new(
        analysis: ImageAnalysis,
        model_version: &str,
        confidence_threshold: f32,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            processing_info: ProcessingInfo {
                total_detections: analysis.detections.len(),
                model_version: model_version.to_string(),
                confidence_threshold,
                processing_time_ms,
            },
            analysis,
        }
    }
}
