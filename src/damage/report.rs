// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Final inspection report composition

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use super::record::DamageRecord;
use super::summary::{DamageSummary, SeverityCount, Urgency};

/// Placeholder for vehicle fields the caller did not supply
pub const NOT_INFORMED: &str = "Not informed";

/// ISO-8601 without offset, microsecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Vehicle metadata as supplied by the caller; every field optional.
///
/// Numbers and booleans are kept as their string form; any other shape
/// leaves only that field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfoInput {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub plate: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub color: Option<String>,
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(n @ serde_json::Value::Number(_)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Vehicle metadata with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub plate: String,
    pub model: String,
    pub year: String,
    pub color: String,
}

impl Default for VehicleInfo {
    fn default() -> Self {
        Self {
            plate: NOT_INFORMED.to_string(),
            model: NOT_INFORMED.to_string(),
            year: NOT_INFORMED.to_string(),
            color: NOT_INFORMED.to_string(),
        }
    }
}

impl VehicleInfo {
    /// Fill each missing field with "Not informed"
    pub fn resolve(input: Option<&VehicleInfoInput>) -> Self {
        let Some(input) = input else {
            return Self::default();
        };

        fn or_default(field: &Option<String>) -> String {
            field.clone().unwrap_or_else(|| NOT_INFORMED.to_string())
        }

        Self {
            plate: or_default(&input.plate),
            model: or_default(&input.model),
            year: or_default(&input.year),
            color: or_default(&input.color),
        }
    }
}

impl From<VehicleInfoInput> for VehicleInfo {
    fn from(input: VehicleInfoInput) -> Self {
        Self::resolve(Some(&input))
    }
}

/// Static fields stamped onto every report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub inspector: String,
    pub version: String,
    pub model: String,
    pub currency_symbol: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            inspector: "Automated YOLO Damage Inspector".to_string(),
            version: crate::version::REPORT_FORMAT_VERSION.to_string(),
            model: "YOLOv8 (car_damage_best)".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionInfo {
    pub timestamp: String,
    pub inspector: String,
    pub version: String,
    pub model: String,
}

/// Summary fields as presented in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAnalysis {
    pub total_damages: usize,
    pub severity_count: SeverityCount,
    pub damage_types: BTreeSet<String>,
    /// Raw numeric total, same value as the summary
    pub total_cost: f64,
    /// Currency-formatted total, e.g. "R$ 1,280.00"
    pub estimated_total_cost: String,
    pub repair_urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    pub inspection_info: InspectionInfo,
    pub vehicle_info: VehicleInfo,
    pub damage_analysis: DamageAnalysis,
    pub damages: Vec<DamageRecord>,
}

/// Format an amount with thousands separators and 2 decimals
///
/// `format_currency(1234567.891, "R$")` -> `"R$ 1,234,567.89"`
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    if symbol.is_empty() {
        format!("{}{}.{}", sign, grouped, fraction)
    } else {
        format!("{}{} {}.{}", sign, symbol, grouped, fraction)
    }
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Compose a report from already computed parts. Pure given its inputs.
pub fn compose_report(
    summary: &DamageSummary,
    damages: &[DamageRecord],
    vehicle: Option<&VehicleInfoInput>,
    settings: &ReportSettings,
    timestamp: NaiveDateTime,
) -> DamageReport {
    DamageReport {
        inspection_info: InspectionInfo {
            timestamp: format_timestamp(timestamp),
            inspector: settings.inspector.clone(),
            version: settings.version.clone(),
            model: settings.model.clone(),
        },
        vehicle_info: VehicleInfo::resolve(vehicle),
        damage_analysis: DamageAnalysis {
            total_damages: summary.total_damages,
            severity_count: summary.severity_count,
            damage_types: summary.damage_types.clone(),
            total_cost: summary.total_cost,
            estimated_total_cost: format_currency(summary.total_cost, &settings.currency_symbol),
            repair_urgency: summary.urgency,
        },
        damages: damages.to_vec(),
    }
}
