// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/damage/detect over JSON and multipart bodies

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use vehicle_damage_api::api::create_router;

use crate::common::{
    det, png_base64, png_bytes, state_without_detector, test_state, StubDetector, FAILING_WIDTH,
    TINY_PNG_BASE64,
};

const BOUNDARY: &str = "damage-test-boundary";

fn app() -> Router {
    create_router(test_state(StubDetector::with_detections(vec![
        det("dent", 0.8),
        det("scratch", 0.2),
    ])))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn json_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/damage/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a multipart body with an optional image part and text fields
fn multipart_request(image: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/damage/detect")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_detect_json() {
    let (status, body) = send(
        app(),
        json_request(json!({
            "image_base64": TINY_PNG_BASE64,
            "vehicle_info": {"plate": "ABC-1234", "year": 2020}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["detections"].as_array().unwrap().len(), 2);
    assert_eq!(body["damage_analysis"][0]["damage_id"], "DMG_001");
    assert_eq!(body["damage_analysis"][1]["damage_id"], "DMG_002");
    assert_eq!(body["summary"]["total_damages"], 2);
    // 1280 + (150 + 650 * 0.2)
    assert_eq!(body["summary"]["total_cost"], 1560.0);
    assert_eq!(body["summary"]["urgency"], "Medium");
    assert_eq!(body["full_report"]["vehicle_info"]["plate"], "ABC-1234");
    assert_eq!(body["full_report"]["vehicle_info"]["year"], "2020");
    assert_eq!(body["full_report"]["vehicle_info"]["model"], "Not informed");
    assert_eq!(
        body["full_report"]["damage_analysis"]["estimated_total_cost"],
        "R$ 1,560.00"
    );

    let info = &body["processing_info"];
    assert_eq!(info["total_detections"], 2);
    assert_eq!(info["model_version"], "stub_damage_model");
    assert!(info["processing_time_ms"].is_u64());
}

#[tokio::test]
async fn test_detect_non_string_vehicle_fields() {
    let (status, body) = send(
        app(),
        json_request(json!({
            "image_base64": TINY_PNG_BASE64,
            "vehicle_info": {"plate": "ABC1D23", "model": {"name": "Onix"}, "year": 2021, "color": 7}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let vehicle = &body["full_report"]["vehicle_info"];
    assert_eq!(vehicle["plate"], "ABC1D23");
    assert_eq!(vehicle["model"], "Not informed");
    assert_eq!(vehicle["year"], "2021");
    assert_eq!(vehicle["color"], "7");
}

#[tokio::test]
async fn test_detect_data_url_payload() {
    let payload = format!("data:image/png;base64,{}", png_base64(16, 16));
    let (status, body) = send(app(), json_request(json!({ "image_base64": payload }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_damages"], 2);
}

#[tokio::test]
async fn test_detect_multipart() {
    let image = png_bytes(20, 10);
    let (status, body) = send(
        app(),
        multipart_request(Some(("car.png", image.as_slice())), &[("plate", "XYZ-9876"), ("color", "Red")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["full_report"]["vehicle_info"]["plate"], "XYZ-9876");
    assert_eq!(body["full_report"]["vehicle_info"]["color"], "Red");
    assert_eq!(body["full_report"]["vehicle_info"]["year"], "Not informed");
}

#[tokio::test]
async fn test_detect_no_damages() {
    let app = create_router(test_state(StubDetector::with_detections(vec![])));
    let (status, body) = send(app, json_request(json!({ "image_base64": TINY_PNG_BASE64 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_damages"], 0);
    assert_eq!(body["summary"]["urgency"], "Low");
    assert_eq!(body["damage_analysis"], json!([]));
    assert_eq!(body["processing_info"]["total_detections"], 0);
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let (status, body) = send(app(), json_request(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "image_base64");

    let (status, body) = send(app(), multipart_request(None, &[("plate", "ABC")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "image");
}

#[tokio::test]
async fn test_empty_filename_rejected() {
    let (status, body) = send(app(), multipart_request(Some(("", &b""[..])), &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_base64_rejected() {
    let (status, body) = send(app(), json_request(json!({ "image_base64": "###not base64###" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_image_input");
}

#[tokio::test]
async fn test_non_image_bytes_rejected() {
    let (status, body) = send(
        app(),
        multipart_request(Some(("notes.txt", &b"plain text, not a photo"[..])), &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_image_input");
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/damage/detect")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
    assert_eq!(body["details"]["content_type"], "text/plain");
}

#[tokio::test]
async fn test_model_not_loaded() {
    let request = json_request(json!({ "image_base64": TINY_PNG_BASE64 }));
    let (status, body) = send(create_router(state_without_detector()), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_type"], "model_unavailable");

    let request = json_request(json!({ "image_base64": TINY_PNG_BASE64 }));
    let (status, _) = send(create_router(test_state(StubDetector::not_ready())), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_validation_precedes_readiness() {
    let (status, _) = send(create_router(state_without_detector()), json_request(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inference_failure() {
    let payload = png_base64(FAILING_WIDTH, 8);
    let (status, body) = send(app(), json_request(json!({ "image_base64": payload }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "internal_error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("simulated inference failure"));
}
