// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-image damage detection handler

use axum::{
    extract::{Request, State},
    Json,
};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::request::{extract_detect_input, DetectInput, ImagePayload};
use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::damage::DamageError;

/// POST /api/damage/detect - Detect and price damage in one vehicle photo
///
/// # Request
/// Either `multipart/form-data` with an `image` file field and optional
/// `plate`, `model`, `year`, `color` fields, or JSON
/// `{"image_base64": "...", "vehicle_info": {...}}`.
///
/// # Errors
/// - 400 Bad Request: missing or undecodable image, unsupported content type
/// - 503 Service Unavailable: detection model not loaded
/// - 500 Internal Server Error: inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<DetectResponse>, ApiError> {
    let started = Instant::now();

    let DetectInput {
        image,
        vehicle_info,
    } = extract_detect_input(request).await.map_err(|e| {
        warn!("Detect request rejected: {}", e);
        e
    })?;

    let detector = match state.analyzer.detector() {
        Some(detector) if detector.is_ready() => detector.clone(),
        _ => {
            warn!("Detect request while model not loaded");
            return Err(ApiError::ModelUnavailable);
        }
    };

    let analyzer = state.analyzer.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let detections = match &image {
            ImagePayload::Bytes(bytes) => analyzer.detect_bytes(bytes),
            ImagePayload::Base64(payload) => analyzer.detect_encoded(payload),
        }?;
        Ok::<_, DamageError>(analyzer.analyze_detections(detections, vehicle_info.as_ref()))
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Detection task failed: {}", e)))?
    .map_err(|e| {
        warn!("Damage detection failed: {}", e);
        ApiError::from(e)
    })?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        "Damage detection complete: {} damages, {} total, {}ms",
        analysis.summary.total_damages,
        analysis.full_report.damage_analysis.estimated_total_cost,
        elapsed_ms
    );
    debug!("Damage types: {:?}", analysis.summary.damage_types);

    Ok(Json(DetectResponse::new(
        analysis,
        detector.model_name(),
        detector.confidence_threshold(),
        elapsed_ms,
    )))
}
