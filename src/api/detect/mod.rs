// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Damage detection endpoint module
//!
//! Provides POST /api/damage/detect for analyzing a single vehicle photo.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::detect_handler;
pub use request::{DetectInput, DetectJsonRequest, ImagePayload};
pub use response::{DetectResponse, ProcessingInfo};
