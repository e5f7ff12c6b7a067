// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Vehicle damage analysis CLI
#[derive(Parser, Debug)]
#[command(name = "damage-cli")]
#[command(version)]
#[command(about = "Analyze vehicle photos for damage without running the API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect damage in one or more images and print the report
    Analyze(analyze::AnalyzeArgs),

    /// Print the active damage taxonomy
    Taxonomy(analyze::TaxonomyArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => {
            let output = analyze::run_analyze(args).await?;
            println!("{}", output);
            Ok(())
        }
        Commands::Taxonomy(args) => {
            println!("{}", analyze::run_taxonomy(args)?);
            Ok(())
        }
    }
}
