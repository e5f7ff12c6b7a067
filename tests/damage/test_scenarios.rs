// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end pipeline scenarios from raw detections to the final report

use crate::common::{det, fixed_time};
use vehicle_damage_api::damage::{
    analyze_detections, consolidate_batch_at, DamageError, DamageSummary, DamageTaxonomy,
    ImageResult, ReportSettings, Severity, Urgency, VehicleInfoInput, NOT_INFORMED,
};

fn analyze(detections: Vec<vehicle_damage_api::RawDetection>) -> vehicle_damage_api::damage::ImageAnalysis {
    analyze_detections(
        detections,
        None,
        &DamageTaxonomy::builtin(),
        &ReportSettings::default(),
        fixed_time(),
    )
}

#[test]
fn test_single_dent() {
    let analysis = analyze(vec![det("dent", 0.8)]);

    let record = &analysis.damage_analysis[0];
    assert_eq!(record.damage_id, "DMG_001");
    assert_eq!(record.severity, Severity::Moderate);
    assert_eq!(record.location, "Bodywork");
    assert_eq!(record.display_name, "Dent");
    assert_eq!(record.estimated_cost, 1280.0);

    let summary = &analysis.summary;
    assert_eq!(summary.total_damages, 1);
    assert_eq!(summary.total_cost, 1280.0);
    assert_eq!(summary.urgency, Urgency::Medium);
    assert_eq!(summary.damage_types.iter().collect::<Vec<_>>(), vec!["Dent"]);

    let report = &analysis.full_report;
    assert_eq!(report.inspection_info.timestamp, "2025-03-14T09:26:53.589793");
    assert_eq!(report.damage_analysis.estimated_total_cost, "R$ 1,280.00");
    assert_eq!(report.damage_analysis.repair_urgency, Urgency::Medium);
    assert_eq!(report.vehicle_info.plate, NOT_INFORMED);
}

#[test]
fn test_empty_detections() {
    let analysis = analyze(vec![]);
    assert!(analysis.damage_analysis.is_empty());
    assert_eq!(analysis.summary, DamageSummary::empty());

    let json = serde_json::to_value(&analysis.summary).unwrap();
    assert_eq!(json["total_damages"], 0);
    assert_eq!(json["total_cost"], 0.0);
    assert_eq!(json["urgency"], "Low");
    assert_eq!(json["severity_count"]["Light"], 0);
    assert_eq!(json["severity_count"]["Moderate"], 0);
    assert_eq!(json["severity_count"]["Severe"], 0);
    assert_eq!(json["damage_types"], serde_json::json!([]));
}

#[test]
fn test_unknown_class_falls_back() {
    let analysis = analyze(vec![det("unknown_x", 0.5)]);
    let record = &analysis.damage_analysis[0];

    assert_eq!(record.severity, Severity::Undefined);
    assert_eq!(record.location, "N/A");
    assert_eq!(record.display_name, "Unknown X");
    assert_eq!(record.estimated_cost, 300.0);
    assert_eq!(analysis.summary.urgency, Urgency::Low);
    assert_eq!(analysis.summary.severity_count.total(), 0);
}

#[test]
fn test_vehicle_info_carried_into_report() {
    let vehicle = VehicleInfoInput {
        plate: Some("ABC-1D23".to_string()),
        model: Some("Onix".to_string()),
        year: Some("2021".to_string()),
        color: None,
    };
    let analysis = analyze_detections(
        vec![det("scratch", 0.2)],
        Some(&vehicle),
        &DamageTaxonomy::builtin(),
        &ReportSettings::default(),
        fixed_time(),
    );

    let info = &analysis.full_report.vehicle_info;
    assert_eq!(info.plate, "ABC-1D23");
    assert_eq!(info.model, "Onix");
    assert_eq!(info.year, "2021");
    assert_eq!(info.color, NOT_INFORMED);
}

#[test]
fn test_batch_with_malformed_middle_image() {
    let outcomes = vec![
        Ok(vec![det("dent", 0.8)]),
        Err(DamageError::InvalidImageInput("Invalid base64 encoding".to_string())),
        Ok(vec![det("shattered_glass", 0.5), det("scratch", 0.1)]),
    ];
    let batch = consolidate_batch_at(
        outcomes,
        None,
        &DamageTaxonomy::builtin(),
        &ReportSettings::default(),
        fixed_time(),
    );

    let successes = batch.results.iter().filter(|r| !r.is_failed()).count();
    assert_eq!(successes, 2);
    match &batch.results[1] {
        ImageResult::Failed(failed) => {
            assert_eq!(failed.image_index, 1);
            assert_eq!(failed.error_type, "invalid_image_input");
        }
        other => panic!("expected failed entry, got {:?}", other),
    }

    let report = &batch.consolidated_report;
    assert_eq!(report.total_images, 3);
    assert_eq!(report.processed_images, 2);
    assert_eq!(report.failed_images, 1);
    assert_eq!(report.total_damages, 3);
    // 1280 + (800 + 1700 * 0.5) + (150 + 650 * 0.1)
    assert_eq!(report.total_cost, 3145.0);
    assert_eq!(report.estimated_total_cost, "R$ 3,145.00");
    assert_eq!(report.overall_urgency, Urgency::High);
    assert_eq!(
        report.unique_damage_types.iter().collect::<Vec<_>>(),
        vec!["Dent", "Scratch", "Shattered Glass"]
    );
}
