// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/damage/analyze-batch

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use vehicle_damage_api::api::create_router;

use crate::common::{
    det, png_base64, state_without_detector, test_state, StubDetector, FAILING_WIDTH,
    TINY_GIF_BASE64, TINY_PNG_BASE64,
};

fn app() -> Router {
    create_router(test_state(StubDetector::with_detections(vec![det("dent", 0.8)])))
}

async fn post_batch(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/damage/analyze-batch")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_batch_with_malformed_entry() {
    let (status, body) = post_batch(
        app(),
        json!({
            "images": [TINY_PNG_BASE64, "!!definitely-not-base64!!", TINY_GIF_BASE64],
            "vehicle_info": {"plate": "BRA2E19"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["image_index"], i);
    }
    assert_eq!(results[0]["summary"]["total_damages"], 1);
    assert_eq!(results[1]["error_type"], "invalid_image_input");
    assert!(results[1]["error"].is_string());
    assert!(results[1].get("summary").is_none());
    assert_eq!(results[2]["full_report"]["vehicle_info"]["plate"], "BRA2E19");

    let report = &body["consolidated_report"];
    assert_eq!(report["total_images"], 3);
    assert_eq!(report["processed_images"], 2);
    assert_eq!(report["failed_images"], 1);
    assert_eq!(report["total_damages"], 2);
    assert_eq!(report["total_cost"], 2560.0);
    assert_eq!(report["estimated_total_cost"], "R$ 2,560.00");
    assert_eq!(report["overall_urgency"], "Medium");
    assert_eq!(report["unique_damage_types"], json!(["Dent"]));
    assert_eq!(report["vehicle_info"]["plate"], "BRA2E19");
}

#[tokio::test]
async fn test_batch_object_entries() {
    let (status, body) = post_batch(
        app(),
        json!({
            "images": [
                {"image_base64": TINY_PNG_BASE64},
                {"image_base64": 42},
                17
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report = &body["consolidated_report"];
    assert_eq!(report["processed_images"], 1);
    assert_eq!(report["failed_images"], 2);
    assert_eq!(report["vehicle_info"]["plate"], "Not informed");
}

#[tokio::test]
async fn test_batch_inference_failure_keeps_slot() {
    let (status, body) = post_batch(
        app(),
        json!({ "images": [png_base64(FAILING_WIDTH, 4), TINY_PNG_BASE64] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["error_type"], "detection_failed");
    assert_eq!(body["results"][1]["summary"]["total_cost"], 1280.0);
    assert_eq!(body["consolidated_report"]["failed_images"], 1);
}

#[tokio::test]
async fn test_batch_all_failed() {
    let (status, body) = post_batch(app(), json!({ "images": ["bad", "worse"] })).await;

    assert_eq!(status, StatusCode::OK);
    let report = &body["consolidated_report"];
    assert_eq!(report["processed_images"], 0);
    assert_eq!(report["total_cost"], 0.0);
    assert_eq!(report["overall_urgency"], "Low");
    assert_eq!(report["unique_damage_types"], json!([]));
}

#[tokio::test]
async fn test_batch_too_many_images() {
    let images: Vec<&str> = std::iter::repeat(TINY_PNG_BASE64).take(11).collect();
    let (status, body) = post_batch(app(), json!({ "images": images })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["message"], "A maximum of 10 images per request is allowed");
}

#[tokio::test]
async fn test_batch_images_must_be_list() {
    for body in [json!({}), json!({ "images": TINY_PNG_BASE64 }), json!({ "images": [] })] {
        let (status, response) = post_batch(app(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["details"]["field"], "images");
    }
}

#[tokio::test]
async fn test_batch_invalid_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/damage/analyze-batch")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_model_not_loaded() {
    let (status, body) = post_batch(
        create_router(state_without_detector()),
        json!({ "images": [TINY_PNG_BASE64] }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_type"], "model_unavailable");
}
