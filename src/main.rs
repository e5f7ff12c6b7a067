// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vehicle_damage_api::{
    api::{start_server, AppState},
    DamageAnalyzer, DamageDetector, ServiceConfig, YoloDamageDetector,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default `info` level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚀 Starting {}", vehicle_damage_api::version::get_version_string());
    info!("📦 BUILD VERSION: {}", vehicle_damage_api::version::VERSION);

    let config = ServiceConfig::from_env();
    config.validate().context("Invalid configuration")?;

    let detector = YoloDamageDetector::load_or_unavailable(config.detector_config());
    if detector.is_ready() {
        info!("✅ Damage model ready: {}", config.model_path.display());
    } else {
        warn!(
            "⚠️ Serving without a damage model; detection endpoints return 503 until {} exists",
            config.model_path.display()
        );
    }

    let analyzer = DamageAnalyzer::from_config(&config, Arc::new(detector))
        .context("Failed to load damage taxonomy")?;
    info!(
        "Damage taxonomy loaded: {} classes ({})",
        analyzer.taxonomy().len(),
        config
            .taxonomy_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );

    start_server(AppState::new(analyzer, config)).await
}
