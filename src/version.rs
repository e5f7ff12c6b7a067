// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the vehicle damage API

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-damage-analysis-2025-10-13";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Version stamped into `inspection_info.version` of every report
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "YOLO Damage Detection API";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Vehicle Damage API {} ({})", VERSION_NUMBER, BUILD_DATE)
}
