// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch damage analysis handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use futures::future::join_all;
use std::time::Instant;
use tracing::{info, warn};

use super::request::{image_payload, BatchRequest};
use super::response::BatchResponse;
use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::damage::{DamageError, ImageDetections};

/// POST /api/damage/analyze-batch - Analyze several photos of one vehicle
///
/// Images are decoded and run through the detector on blocking tasks;
/// results keep request order and a failing image never fails the batch.
pub async fn analyze_batch_handler(
    State(state): State<AppState>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let started = Instant::now();

    let Json(request) = body.map_err(|e| {
        warn!("Batch request rejected: {}", e.body_text());
        ApiError::InvalidRequest(e.body_text())
    })?;

    let vehicle_info = request.vehicle_info.clone();
    let entries = request.validate(state.config.max_batch_images).map_err(|e| {
        warn!("Batch validation failed: {}", e);
        e
    })?;

    if !state.analyzer.is_ready() {
        warn!("Batch request while model not loaded");
        return Err(ApiError::ModelUnavailable);
    }

    let tasks = entries.into_iter().map(|entry| {
        let analyzer = state.analyzer.clone();
        tokio::task::spawn_blocking(move || {
            let payload = image_payload(&entry)?;
            analyzer.detect_encoded(payload)
        })
    });

    let outcomes: Vec<ImageDetections> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined.unwrap_or_else(|e| Err(DamageError::Detection(format!("task failed: {}", e))))
        })
        .collect();

    let batch = state.analyzer.consolidate(outcomes, vehicle_info.as_ref());

    let report = &batch.consolidated_report;
    info!(
        "Batch analysis complete: {}/{} images, {} damages, {}, {}ms",
        report.processed_images,
        report.total_images,
        report.total_damages,
        report.estimated_total_cost,
        started.elapsed().as_millis()
    );

    Ok(Json(BatchResponse::from(batch)))
}
