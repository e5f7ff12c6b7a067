// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod batch;
pub mod detect;
pub mod errors;
pub mod health;
pub mod server;

pub use batch::{analyze_batch_handler, BatchRequest, BatchResponse};
pub use detect::{detect_handler, DetectJsonRequest, DetectResponse, ProcessingInfo};
pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, model_info_handler, HealthResponse, ModelInfoResponse};
pub use server::{create_router, start_server, AppState};
