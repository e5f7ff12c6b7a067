// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect request parsing for multipart uploads and JSON bodies

use axum::{
    extract::{FromRequest, Request},
    http::header,
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::damage::VehicleInfoInput;

/// Image as it arrived on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// Raw file bytes from a multipart upload
    Bytes(Vec<u8>),
    /// Base64 text from a JSON body
    Base64(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectInput {
    pub image: ImagePayload,
    pub vehicle_info: Option<VehicleInfoInput>,
}

/// JSON form of POST /api/damage/detect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectJsonRequest {
    #[serde(default)]
    pub image_base64: Option<String>,

    #[serde(default, deserialize_with = "deserialize_vehicle_info")]
    pub vehicle_info: Option<VehicleInfoInput>,
}

impl DetectJsonRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.image_base64.as_deref() {
            Some(image) if !image.trim().is_empty() => Ok(()),
            _ => Err(ApiError::ValidationError {
                field: "image_base64".to_string(),
                message: "image_base64 is required".to_string(),
            }),
        }
    }

    pub fn into_input(self) -> Result<DetectInput, ApiError> {
        self.validate()?;
        Ok(DetectInput {
            image: ImagePayload::Base64(self.image_base64.unwrap_or_default()),
            vehicle_info: self.vehicle_info,
        })
    }
}

/// Vehicle info that is not an object is ignored rather than rejected
pub(crate) fn deserialize_vehicle_info<'de, D>(
    deserializer: D,
) -> Result<Option<VehicleInfoInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Parse a detect request by content type
pub async fn extract_detect_input(request: Request) -> Result<DetectInput, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<DetectJsonRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
        body.into_input()
    } else {
        Err(ApiError::UnsupportedMediaType(content_type))
    }
}

/// Read the `image` file field plus optional vehicle fields
pub async fn read_multipart(mut multipart: Multipart) -> Result<DetectInput, ApiError> {
    let mut image = None;
    let mut vehicle = VehicleInfoInput::default();
    let mut has_vehicle_fields = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                if field.file_name() == Some("") {
                    return Err(ApiError::ValidationError {
                        field: "image".to_string(),
                        message: "No file selected".to_string(),
                    });
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                debug!("Received multipart image ({} bytes)", bytes.len());
                image = Some(bytes.to_vec());
            }
            "plate" | "model" | "year" | "color" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                let slot = match name.as_str() {
                    "plate" => &mut vehicle.plate,
                    "model" => &mut vehicle.model,
                    "year" => &mut vehicle.year,
                    _ => &mut vehicle.color,
                };
                *slot = Some(text);
                has_vehicle_fields = true;
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let image = image.ok_or_else(|| ApiError::ValidationError {
        field: "image".to_string(),
        message: "image file is required".to_string(),
    })?;

    Ok(DetectInput {
        image: ImagePayload::Bytes(image),
        vehicle_info: has_vehicle_fields.then_some(vehicle),
    })
}
