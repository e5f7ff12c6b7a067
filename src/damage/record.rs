// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Raw detections and the enriched damage records built from them

use serde::{Deserialize, Serialize};

use super::taxonomy::{DamageTaxonomy, Severity};

/// Axis-aligned box in original image pixel coordinates: (x1, y1, x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox(pub [f32; 4]);

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self([x1, y1, x2, y2])
    }

    pub fn x1(&self) -> f32 {
        self.0[0]
    }

    pub fn y1(&self) -> f32 {
        self.0[1]
    }

    pub fn x2(&self) -> f32 {
        self.0[2]
    }

    pub fn y2(&self) -> f32 {
        self.0[3]
    }

    pub fn width(&self) -> f32 {
        (self.x2() - self.x1()).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2() - self.y1()).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1().max(other.x1());
        let iy1 = self.y1().max(other.y1());
        let ix2 = self.x2().min(other.x2());
        let iy2 = self.y2().min(other.y2());

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// One detector-reported damage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Damage class label as named by the model
    #[serde(rename = "class")]
    pub class_id: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl RawDetection {
    pub fn new(class_id: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id: class_id.into(),
            confidence,
            bbox,
        }
    }
}

/// Damage record enriched with taxonomy data and a cost estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// "DMG_001", unique within one image
    pub damage_id: String,
    #[serde(rename = "class")]
    pub class_id: String,
    #[serde(rename = "class_display")]
    pub display_name: String,
    pub confidence: f32,
    pub severity: Severity,
    pub location: String,
    pub estimated_cost: f64,
    pub bbox: BoundingBox,
}

/// Round to 2 decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_damage_id(position: usize) -> String {
    format!("DMG_{:03}", position)
}

/// Build the record for the detection at 1-based `position` within its image.
///
/// Cost is interpolated inside the class band by confidence:
/// `min + (max - min) * confidence`. Confidence is a stand-in for damage
/// extent, not a measurement.
pub fn build_damage_record(
    detection: &RawDetection,
    position: usize,
    taxonomy: &DamageTaxonomy,
) -> DamageRecord {
    let profile = taxonomy.lookup(&detection.class_id);
    let weight = f64::from(detection.confidence).clamp(0.0, 1.0);
    let band = profile.cost_range.max - profile.cost_range.min;
    let estimated_cost = round_cents(profile.cost_range.min + band * weight);

    DamageRecord {
        damage_id: format_damage_id(position),
        class_id: detection.class_id.clone(),
        display_name: profile.display_name,
        confidence: detection.confidence,
        severity: profile.severity,
        location: profile.location,
        estimated_cost,
        bbox: detection.bbox,
    }
}

/// Build records for one image's detections, preserving input order
pub fn build_damage_records(
    detections: &[RawDetection],
    taxonomy: &DamageTaxonomy,
) -> Vec<DamageRecord> {
    detections
        .iter()
        .enumerate()
        .map(|(i, detection)| build_damage_record(detection, i + 1, taxonomy))
        .collect()
}
