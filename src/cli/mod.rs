//! Command-line interface for operando-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Rank catalog cells against an experiment's requirements
//! - **catalog**: List, show, validate, export, or tabulate the catalog
//!
//! ## Usage
//!
//! ```text
//! # Which cells work for X-ray at 50 °C with TRL >= 5?
//! operando-match match --beam x-ray --temperature 50 --min-trl 5
//!
//! # Query from a JSON file against a custom catalog, JSON output
//! operando-match match --query needs.json --catalog cells.json --format json
//!
//! # Check a catalog file, listing every problem
//! operando-match catalog validate cells.json
//!
//! # Technique compatibility matrix
//! operando-match catalog matrix
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::catalog::store::CatalogModel;

pub mod catalog;
pub mod evaluate;

#[derive(Parser)]
#[command(name = "operando-match")]
#[command(version)]
#[command(about = "Match experiment requirements against operando sample-environment hardware")]
#[command(
    long_about = "operando-match helps you choose a sample environment (electrochemical test cell) for an operando experiment.\n\nIt checks every cell in a catalog against your beam, temperature, pressure and TRL requirements and provides:\n- A ranked list of compatible cells\n- Signed margins showing how much headroom each cell has\n- Every reason a cell was excluded\n- Trade-off notes on reliability, representativeness and reproducibility"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank catalog cells against an experiment's requirements
    Match(evaluate::MatchArgs),

    /// Inspect and maintain the hardware catalog
    Catalog(catalog::CatalogArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load a custom catalog, or the embedded registry when no path is given
pub(crate) fn load_catalog(path: Option<&Path>, verbose: bool) -> anyhow::Result<CatalogModel> {
    let catalog = match path {
        Some(path) => CatalogModel::load_from_file(path)?,
        None => CatalogModel::load_embedded()?,
    };

    if verbose {
        eprintln!("Loaded catalog with {} records", catalog.len());
    }

    Ok(catalog)
}
