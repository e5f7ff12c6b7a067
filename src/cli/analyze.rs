// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::damage::{DamageAnalyzer, DamageError, DamageTaxonomy, ImageDetections, VehicleInfoInput};
use crate::detection::YoloDamageDetector;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image files; several files produce a consolidated batch result
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// ONNX model file
    #[arg(long, env = "DAMAGE_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// TOML taxonomy file (built-in table when omitted)
    #[arg(long, env = "DAMAGE_TAXONOMY_PATH")]
    pub taxonomy: Option<PathBuf>,

    /// License plate
    #[arg(long)]
    pub plate: Option<String>,

    /// Vehicle model name
    #[arg(long = "vehicle-model")]
    pub vehicle_model: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl AnalyzeArgs {
    pub fn vehicle_info(&self) -> Option<VehicleInfoInput> {
        let info = VehicleInfoInput {
            plate: self.plate.clone(),
            model: self.vehicle_model.clone(),
            year: self.year.clone(),
            color: self.color.clone(),
        };
        (info != VehicleInfoInput::default()).then_some(info)
    }
}

/// Arguments for the taxonomy command
#[derive(Args, Debug)]
pub struct TaxonomyArgs {
    /// TOML taxonomy file (built-in table when omitted)
    #[arg(long, env = "DAMAGE_TAXONOMY_PATH")]
    pub taxonomy: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run_analyze(args: AnalyzeArgs) -> Result<String> {
    dotenv::dotenv().ok();

    let mut config = ServiceConfig::from_env();
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if args.taxonomy.is_some() {
        config.taxonomy_path = args.taxonomy.clone();
    }
    config.validate().context("Invalid configuration")?;

    let detector = YoloDamageDetector::load(config.detector_config())?;
    let analyzer = DamageAnalyzer::from_config(&config, Arc::new(detector))
        .context("Failed to load damage taxonomy")?;

    let vehicle = args.vehicle_info();
    let images = args.images;
    let pretty = args.pretty;

    info!("Analyzing {} image(s)", images.len());
    let value = tokio::task::spawn_blocking(move || {
        analyze_files(&analyzer, &images, vehicle.as_ref())
    })
    .await
    .context("Analysis task failed")??;

    render(&value, pretty)
}

/// Report for a single image, or a batch result for several
pub fn analyze_files(
    analyzer: &DamageAnalyzer,
    paths: &[PathBuf],
    vehicle: Option<&VehicleInfoInput>,
) -> Result<serde_json::Value> {
    if let [path] = paths {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let detections = analyzer
            .detect_bytes(&bytes)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;
        let analysis = analyzer.analyze_detections(detections, vehicle);
        return Ok(serde_json::to_value(analysis.full_report)?);
    }

    let outcomes: Vec<ImageDetections> = paths
        .iter()
        .map(|path| read_image(path).and_then(|bytes| analyzer.detect_bytes(&bytes)))
        .collect();
    Ok(serde_json::to_value(analyzer.consolidate(outcomes, vehicle))?)
}

fn read_image(path: &Path) -> Result<Vec<u8>, DamageError> {
    std::fs::read(path)
        .map_err(|e| DamageError::InvalidImageInput(format!("{}: {}", path.display(), e)))
}

pub fn run_taxonomy(args: TaxonomyArgs) -> Result<String> {
    let taxonomy = match &args.taxonomy {
        Some(path) => DamageTaxonomy::from_toml_file(path)
            .with_context(|| format!("Failed to load taxonomy {}", path.display()))?,
        None => DamageTaxonomy::builtin(),
    };

    let value = serde_json::json!({
        "classes": taxonomy.entries(),
        "fallback_cost_range": taxonomy.fallback_cost_range(),
    });
    render(&value, args.pretty)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
