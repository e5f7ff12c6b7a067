// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health and model-info endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::server::AppState;
use crate::damage::Severity;
use crate::imaging::SUPPORTED_INPUT_FORMATS;
use crate::version::{SERVICE_NAME, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model_loaded: bool,
}

/// Model details; the `model_loaded: false` form carries only `error`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Class id to display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_names: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_damage_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_levels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_formats: Option<Vec<String>>,
    /// Upload limit per image, in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_image_bytes: Option<usize>,
}

/// GET /api/damage/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION_NUMBER.to_string(),
        model_loaded: state.analyzer.is_ready(),
    })
}

/// GET /api/damage/model-info
pub async fn model_info_handler(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let detector = match state.analyzer.detector() {
        Some(detector) if detector.is_ready() => detector,
        _ => {
            return Json(ModelInfoResponse {
                model_loaded: false,
                error: Some("Model not loaded".to_string()),
                model_path: None,
                class_names: None,
                supported_damage_types: None,
                severity_levels: None,
                model_version: None,
                confidence_threshold: None,
                input_formats: None,
                max_image_bytes: None,
            });
        }
    };

    let taxonomy = state.analyzer.taxonomy();
    let class_names: BTreeMap<String, String> = detector
        .class_names()
        .iter()
        .map(|id| (id.clone(), taxonomy.lookup(id).display_name))
        .collect();

    Json(ModelInfoResponse {
        model_loaded: true,
        error: None,
        model_path: detector.model_path().map(str::to_string),
        supported_damage_types: Some(detector.class_names().to_vec()),
        class_names: Some(class_names),
        severity_levels: Some(Severity::KNOWN.iter().map(|s| s.to_string()).collect()),
        model_version: Some(detector.model_name().to_string()),
        confidence_threshold: Some(detector.confidence_threshold()),
        input_formats: Some(SUPPORTED_INPUT_FORMATS.iter().map(|s| s.to_string()).collect()),
        max_image_bytes: Some(state.analyzer.max_image_bytes()),
    })
}
