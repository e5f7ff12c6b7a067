// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::damage::DamageError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    InvalidImage(String),
    UnsupportedMediaType(String),
    ModelUnavailable,
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::InvalidImage(msg) => ("invalid_image_input", msg.clone(), None),
            ApiError::UnsupportedMediaType(content_type) => {
                let mut details = HashMap::new();
                details.insert(
                    "content_type".to_string(),
                    serde_json::Value::String(content_type.clone()),
                );
                (
                    "invalid_request",
                    "Use multipart/form-data with an image file or JSON with image_base64"
                        .to_string(),
                    Some(details),
                )
            }
            ApiError::ModelUnavailable => (
                "model_unavailable",
                "Damage detection model is not loaded".to_string(),
                None,
            ),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            success: false,
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_)
            | ApiError::ValidationError { .. }
            | ApiError::InvalidImage(_)
            | ApiError::UnsupportedMediaType(_) => 400,
            ApiError::ModelUnavailable => 503,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::UnsupportedMediaType(content_type) => {
                write!(f, "Unsupported content type: {}", content_type)
            }
            ApiError::ModelUnavailable => write!(f, "Damage detection model is not loaded"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DamageError> for ApiError {
    fn from(err: DamageError) -> Self {
        match err {
            DamageError::ModelUnavailable => ApiError::ModelUnavailable,
            DamageError::InvalidImageInput(msg) => ApiError::InvalidImage(msg),
            DamageError::Detection(msg) => {
                ApiError::InternalError(format!("Damage detection failed: {}", msg))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
