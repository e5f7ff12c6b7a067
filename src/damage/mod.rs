// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vehicle damage analysis pipeline
//!
//! Raw detections flow through the taxonomy into priced damage records, a
//! summary, and an inspection report. Batches fold per-image outcomes into a
//! consolidated report.

pub mod analyzer;
pub mod batch;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod summary;
pub mod taxonomy;

pub use analyzer::DamageAnalyzer;
pub use batch::{
    consolidate_batch, consolidate_batch_at, BatchResult, ConsolidatedReport, FailedImage,
    ImageDetections, ImageResult, ProcessedImage,
};
pub use error::DamageError;
pub use pipeline::{analyze_detections, ImageAnalysis};
pub use record::{
    build_damage_record, build_damage_records, format_damage_id, round_cents, BoundingBox,
    DamageRecord, RawDetection,
};
pub use report::{
    compose_report, format_currency, format_timestamp, DamageAnalysis,
    DamageReport, InspectionInfo, ReportSettings, VehicleInfo, VehicleInfoInput, NOT_INFORMED,
    TIMESTAMP_FORMAT,
};
pub use summary::{raw_cost_total, summarize, DamageSummary, SeverityCount, Urgency};
pub use taxonomy::{
    humanize_class_id, ClassProfile, CostRange, DamageTaxonomy, Severity, TaxonomyEntry,
    TaxonomyError, DEFAULT_COST_RANGE, UNKNOWN_LOCATION,
};
