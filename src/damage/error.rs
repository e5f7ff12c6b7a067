// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::imaging::ImageInputError;

/// Failures of the damage pipeline. Unknown damage classes are not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DamageError {
    #[error("Damage detection model is not loaded")]
    ModelUnavailable,

    #[error("Invalid image input: {0}")]
    InvalidImageInput(String),

    #[error("Damage detection failed: {0}")]
    Detection(String),
}

impl DamageError {
    pub fn kind(&self) -> &'static str {
        match self {
            DamageError::ModelUnavailable => "model_unavailable",
            DamageError::InvalidImageInput(_) => "invalid_image_input",
            DamageError::Detection(_) => "detection_failed",
        }
    }
}

impl From<ImageInputError> for DamageError {
    fn from(err: ImageInputError) -> Self {
        DamageError::InvalidImageInput(err.to_string())
    }
}
