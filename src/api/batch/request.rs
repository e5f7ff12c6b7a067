// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch request types and validation

use serde::{Deserialize, Serialize};

use crate::api::detect::request::deserialize_vehicle_info;
use crate::api::errors::ApiError;
use crate::damage::{DamageError, VehicleInfoInput};

/// JSON body of POST /api/damage/analyze-batch
///
/// `images` stays untyped so a malformed entry fails only its own slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub images: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "deserialize_vehicle_info")]
    pub vehicle_info: Option<VehicleInfoInput>,
}

impl BatchRequest {
    /// Check the image list and hand back its entries
    pub fn validate(self, max_images: usize) -> Result<Vec<serde_json::Value>, ApiError> {
        let images = match self.images {
            Some(serde_json::Value::Array(images)) => images,
            _ => {
                return Err(ApiError::ValidationError {
                    field: "images".to_string(),
                    message: "images must be a list".to_string(),
                })
            }
        };

        if images.is_empty() {
            return Err(ApiError::ValidationError {
                field: "images".to_string(),
                message: "images must not be empty".to_string(),
            });
        }

        if images.len() > max_images {
            return Err(ApiError::ValidationError {
                field: "images".to_string(),
                message: format!("A maximum of {} images per request is allowed", max_images),
            });
        }

        Ok(images)
    }
}

/// Base64 payload of one entry: a bare string or `{"image_base64": "..."}`
pub fn image_payload(entry: &serde_json::Value) -> Result<&str, DamageError> {
    match entry {
        serde_json::Value::String(payload) => Ok(payload),
        serde_json::Value::Object(map) => map
            .get("image_base64")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DamageError::InvalidImageInput("image_base64 must be a string".to_string())
            }),
        _ => Err(DamageError::InvalidImageInput(
            "expected a base64 string or an object with image_base64".to_string(),
        )),
    }
}
