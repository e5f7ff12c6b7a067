// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::damage::BatchResult;

/// Response from POST /api/damage/analyze-batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub batch: BatchResult,
}

impl From<BatchResult> for BatchResponse {
    fn from(batch: BatchResult) -> Self {
        Self {
            success: true,
            batch,
        }
    }
}
