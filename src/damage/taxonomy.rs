// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Damage taxonomy: per-class severity, repair location, display name and cost band
//!
//! The taxonomy is the only tunable domain input of the pipeline. It is built
//! once at startup (either the built-in tables or a TOML file) and shared
//! read-only with the record builder and report composer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Location reported for classes missing from the taxonomy
pub const UNKNOWN_LOCATION: &str = "N/A";

/// Cost band used for classes missing from the taxonomy
pub const DEFAULT_COST_RANGE: CostRange = CostRange {
    min: 100.0,
    max: 500.0,
};

/// Coarse damage-impact tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Light,
    Moderate,
    Severe,
    Undefined,
}

impl Severity {
    /// Tiers that are tracked in severity counts
    pub const KNOWN: [Severity; 3] = [Severity::Light, Severity::Moderate, Severity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Light => "Light",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
            Severity::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repair cost band for a damage class, in report currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl CostRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, class_id: &str) -> Result<(), TaxonomyError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max
        {
            return Err(TaxonomyError::InvalidCostRange {
                class_id: class_id.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Taxonomy entry for one known damage class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub severity: Severity,
    pub location: String,
    pub display_name: String,
    pub cost_range: CostRange,
}

impl TaxonomyEntry {
    fn new(severity: Severity, location: &str, display_name: &str, min: f64, max: f64) -> Self {
        Self {
            severity,
            location: location.to_string(),
            display_name: display_name.to_string(),
            cost_range: CostRange::new(min, max),
        }
    }
}

/// Resolved profile for any class id, known or not
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProfile {
    pub severity: Severity,
    pub location: String,
    pub display_name: String,
    pub cost_range: CostRange,
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid cost range for '{class_id}': min={min}, max={max}")]
    InvalidCostRange { class_id: String, min: f64, max: f64 },

    #[error("Taxonomy defines no damage classes")]
    Empty,
}

/// On-disk layout of a taxonomy file
///
/// ```toml
/// [fallback]
/// cost_range = { min = 100.0, max = 500.0 }
///
/// [classes.dent]
/// severity = "Moderate"
/// location = "Bodywork"
/// display_name = "Dent"
/// cost_range = { min = 400.0, max = 1500.0 }
/// ```
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    fallback: Option<FallbackSection>,
    classes: BTreeMap<String, TaxonomyEntry>,
}

#[derive(Debug, Deserialize)]
struct FallbackSection {
    cost_range: CostRange,
}

/// Immutable mapping from damage class id to its taxonomy entry
#[derive(Debug, Clone)]
pub struct DamageTaxonomy {
    classes: HashMap<String, TaxonomyEntry>,
    fallback_cost_range: CostRange,
}

impl Default for DamageTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DamageTaxonomy {
    /// Built-in tables for the six classes of the car damage model
    pub fn builtin() -> Self {
        let classes = [
            (
                "shattered_glass",
                TaxonomyEntry::new(Severity::Severe, "Windshield/Windows", "Shattered Glass", 800.0, 2500.0),
            ),
            (
                "broken_lamp",
                TaxonomyEntry::new(Severity::Severe, "Headlights/Taillights", "Broken Lamp", 300.0, 800.0),
            ),
            (
                "flat_tire",
                TaxonomyEntry::new(Severity::Severe, "Wheels", "Flat Tire", 200.0, 600.0),
            ),
            (
                "dent",
                TaxonomyEntry::new(Severity::Moderate, "Bodywork", "Dent", 400.0, 1500.0),
            ),
            (
                "scratch",
                TaxonomyEntry::new(Severity::Light, "Paintwork", "Scratch", 150.0, 800.0),
            ),
            (
                "crack",
                TaxonomyEntry::new(Severity::Light, "Bumper/Plastics", "Crack", 200.0, 1000.0),
            ),
        ];

        Self {
            classes: classes
                .into_iter()
                .map(|(id, entry)| (id.to_string(), entry))
                .collect(),
            fallback_cost_range: DEFAULT_COST_RANGE,
        }
    }

    /// Build a taxonomy from explicit entries
    pub fn from_entries<I>(entries: I, fallback_cost_range: CostRange) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (String, TaxonomyEntry)>,
    {
        fallback_cost_range.validate("<fallback>")?;

        let classes: HashMap<String, TaxonomyEntry> = entries.into_iter().collect();
        if classes.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        for (class_id, entry) in &classes {
            entry.cost_range.validate(class_id)?;
        }

        Ok(Self {
            classes,
            fallback_cost_range,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = toml::from_str(content)?;
        let fallback = file
            .fallback
            .map(|f| f.cost_range)
            .unwrap_or(DEFAULT_COST_RANGE);
        Self::from_entries(file.classes, fallback)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve a class id. Never fails: unknown ids get the fallback profile.
    pub fn lookup(&self, class_id: &str) -> ClassProfile {
        match self.classes.get(class_id) {
            Some(entry) => ClassProfile {
                severity: entry.severity,
                location: entry.location.clone(),
                display_name: entry.display_name.clone(),
                cost_range: entry.cost_range,
            },
            None => ClassProfile {
                severity: Severity::Undefined,
                location: UNKNOWN_LOCATION.to_string(),
                display_name: humanize_class_id(class_id),
                cost_range: self.fallback_cost_range,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn fallback_cost_range(&self) -> CostRange {
        self.fallback_cost_range
    }

    /// Known class ids, sorted
    pub fn class_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.classes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All entries sorted by class id
    pub fn entries(&self) -> BTreeMap<String, TaxonomyEntry> {
        self.classes
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }
}

/// "flat_tire" -> "Flat Tire"
///
/// Each word is capitalized on its first letter and lowercased after, so
/// "BROKEN_lamp" becomes "Broken Lamp".
pub fn humanize_class_id(class_id: &str) -> String {
    let spaced = class_id.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;

    for c in spaced.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}
