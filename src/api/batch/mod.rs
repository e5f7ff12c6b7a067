// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch analysis endpoint module
//!
//! Provides POST /api/damage/analyze-batch for up to `MAX_BATCH_IMAGES`
//! photos per request.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::analyze_batch_handler;
pub use request::{image_payload, BatchRequest};
pub use response::BatchResponse;
