// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod damage;
pub mod detection;
pub mod imaging;
pub mod version;

// Re-export main types
pub use config::{ConfigError, ServiceConfig};
pub use damage::{
    BatchResult, DamageAnalyzer, DamageError, DamageRecord, DamageReport, DamageSummary,
    DamageTaxonomy, RawDetection, Severity, Urgency, VehicleInfoInput,
};
pub use detection::{DamageDetector, YoloDamageDetector, YoloDetectorConfig};
