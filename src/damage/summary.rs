// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Aggregation of damage records into a per-image summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::record::{round_cents, DamageRecord};
use super::taxonomy::Severity;

/// Repair priority derived from the worst severity present
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record counts per known severity tier. `Undefined` has no bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    #[serde(rename = "Light")]
    pub light: usize,
    #[serde(rename = "Moderate")]
    pub moderate: usize,
    #[serde(rename = "Severe")]
    pub severe: usize,
}

impl SeverityCount {
    /// Count one record. Returns false if the tier has no bucket.
    pub fn record(&mut self, severity: Severity) -> bool {
        match severity {
            Severity::Light => self.light += 1,
            Severity::Moderate => self.moderate += 1,
            Severity::Severe => self.severe += 1,
            Severity::Undefined => return false,
        }
        true
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Light => self.light,
            Severity::Moderate => self.moderate,
            Severity::Severe => self.severe,
            Severity::Undefined => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.light + self.moderate + self.severe
    }

    /// Priority rule: any Severe -> High, else any Moderate -> Medium, else Low
    pub fn urgency(&self) -> Urgency {
        if self.severe > 0 {
            Urgency::High
        } else if self.moderate > 0 {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

/// Aggregate view over one image's damage records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageSummary {
    pub total_damages: usize,
    pub total_cost: f64,
    pub urgency: Urgency,
    pub severity_count: SeverityCount,
    /// Distinct display names, ascending
    pub damage_types: BTreeSet<String>,
}

impl DamageSummary {
    pub fn empty() -> Self {
        Self {
            total_damages: 0,
            total_cost: 0.0,
            urgency: Urgency::Low,
            severity_count: SeverityCount::default(),
            damage_types: BTreeSet::new(),
        }
    }

    /// Records whose severity is `Undefined`
    pub fn undefined_count(&self) -> usize {
        self.total_damages - self.severity_count.total()
    }
}

/// Sum of record costs, unrounded
pub fn raw_cost_total(records: &[DamageRecord]) -> f64 {
    records.iter().map(|r| r.estimated_cost).sum()
}

pub fn summarize(records: &[DamageRecord]) -> DamageSummary {
    if records.is_empty() {
        return DamageSummary::empty();
    }

    let mut severity_count = SeverityCount::default();
    let mut damage_types = BTreeSet::new();

    for record in records {
        severity_count.record(record.severity);
        damage_types.insert(record.display_name.clone());
    }

    DamageSummary {
        total_damages: records.len(),
        total_cost: round_cents(raw_cost_total(records)),
        urgency: severity_count.urgency(),
        severity_count,
        damage_types,
    }
}
