use std::path::PathBuf;

use clap::Args;

use crate::catalog::store::CatalogModel;
use crate::cli::{load_catalog, OutputFormat};
use crate::core::interval::Interval;
use crate::core::query::{QueryBuilder, RequirementQuery};
use crate::core::types::{BeamType, Dimension, Margin, ReliabilityTolerance};
use crate::matching::engine::{MatchResult, MatchingConfig, MatchingEngine};
use crate::matching::scoring::ScoringConfig;

#[derive(Args)]
pub struct MatchArgs {
    /// Query JSON file; flags given alongside it override its fields
    #[arg(long)]
    pub query: Option<PathBuf>,

    /// Path to custom catalog file (defaults to the embedded registry)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Required beam/probe (neutron, x-ray, muon, electrochemical-only)
    #[arg(long)]
    pub beam: Option<BeamType>,

    /// Target temperature in °C (lower bound when --temperature-max is given)
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Upper bound of the target temperature range in °C
    #[arg(long, requires = "temperature", allow_hyphen_values = true)]
    pub temperature_max: Option<f64>,

    /// Target pressure in bar (lower bound when --pressure-max is given)
    #[arg(long)]
    pub pressure: Option<f64>,

    /// Upper bound of the target pressure range in bar
    #[arg(long, requires = "pressure")]
    pub pressure_max: Option<f64>,

    /// Minimum technology readiness level (1-9)
    #[arg(long)]
    pub min_trl: Option<u8>,

    /// Admit cells below --min-trl with a score penalty instead of excluding them
    #[arg(long)]
    pub allow_lower_trl: bool,

    /// How harshly documented failure modes are penalized
    #[arg(long, value_enum)]
    pub tolerance: Option<ReliabilityTolerance>,

    /// Required technique (repeatable; any one suffices)
    #[arg(long = "technique")]
    pub techniques: Vec<String>,

    /// Required instrument (repeatable; any one suffices)
    #[arg(long = "instrument")]
    pub instruments: Vec<String>,

    /// Only cells with a published CAD model (digital twin)
    #[arg(long)]
    pub require_cad: bool,

    /// Only cells with active pressure control
    #[arg(long)]
    pub require_pressure_control: bool,

    /// Number of results to show
    #[arg(short = 'n', long, default_value = "10")]
    pub max_results: usize,

    /// Hide excluded cells
    #[arg(long)]
    pub compatible_only: bool,

    /// Scoring configuration JSON (weights, scales, penalties)
    #[arg(long)]
    pub scoring: Option<PathBuf>,

    // === Scoring weight options ===
    /// Weight for beam match (0-100, default 30)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_beam: Option<u32>,

    /// Weight for TRL headroom (0-100, default 25)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_trl: Option<u32>,

    /// Weight for temperature headroom (0-100, default 15)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_temperature: Option<u32>,

    /// Weight for pressure headroom (0-100, default 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_pressure: Option<u32>,

    /// Weight for assembly reproducibility (0-100, default 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_reproducibility: Option<u32>,

    /// Weight for reliability (0-100, default 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub weight_reliability: Option<u32>,
}

/// Execute match subcommand
///
/// # Errors
///
/// Returns an error if the catalog, query, or scoring configuration cannot be
/// loaded or is invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = build_query(&args)?;
    let catalog = load_catalog(args.catalog.as_deref(), verbose)?;

    // An empty catalog still yields an (empty) result set
    if catalog.is_empty() {
        eprintln!("Warning: Catalog is empty, no records to match against.");
    }

    let scoring = build_scoring(&args)?;
    if verbose {
        let w = scoring.weights.normalized();
        eprintln!(
            "Scoring weights: {:.0}% beam, {:.0}% TRL, {:.0}% temperature, {:.0}% pressure, {:.0}% reproducibility, {:.0}% reliability",
            w.beam * 100.0,
            w.trl * 100.0,
            w.temperature * 100.0,
            w.pressure * 100.0,
            w.reproducibility * 100.0,
            w.reliability * 100.0,
        );
    }

    let engine = MatchingEngine::with_config(&catalog, MatchingConfig { scoring });
    let results = engine.evaluate(&query);
    let compatible = results.iter().filter(|r| r.compatible).count();

    let shown: Vec<&MatchResult> = results
        .iter()
        .filter(|r| r.compatible || !args.compatible_only)
        .take(args.max_results)
        .collect();

    match format {
        OutputFormat::Text => print_text_results(&shown, &catalog, compatible, results.len(), verbose),
        OutputFormat::Json => print_json_results(&shown, &catalog)?,
        OutputFormat::Tsv => print_tsv_results(&shown, &catalog),
    }

    Ok(())
}

/// Merge the optional query file with command-line flags and validate
fn build_query(args: &MatchArgs) -> anyhow::Result<RequirementQuery> {
    let mut builder = match &args.query {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<QueryBuilder>(&content)?
        }
        None => RequirementQuery::builder(),
    };

    if let Some(beam) = args.beam {
        builder.required_beam = Some(beam);
    }
    if let Some(min) = args.temperature {
        builder.target_temperature = Some(Interval::new(min, args.temperature_max.unwrap_or(min)));
    }
    if let Some(min) = args.pressure {
        builder.target_pressure = Some(Interval::new(min, args.pressure_max.unwrap_or(min)));
    }
    if let Some(trl) = args.min_trl {
        builder.min_trl = Some(trl);
    }
    if args.allow_lower_trl {
        builder.allow_lower_trl = true;
    }
    if let Some(tolerance) = args.tolerance {
        builder.reliability_tolerance = tolerance;
    }
    builder.techniques.extend(args.techniques.iter().cloned());
    builder.instruments.extend(args.instruments.iter().cloned());
    if args.require_cad {
        builder.require_cad = true;
    }
    if args.require_pressure_control {
        builder.require_pressure_control = true;
    }

    Ok(builder.build()?)
}

/// Scoring config from file (or defaults), with per-weight flag overrides
fn build_scoring(args: &MatchArgs) -> anyhow::Result<ScoringConfig> {
    let mut scoring = match &args.scoring {
        Some(path) => ScoringConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ScoringConfig::default(),
    };

    let overrides = [
        (args.weight_beam, &mut scoring.weights.beam),
        (args.weight_trl, &mut scoring.weights.trl),
        (args.weight_temperature, &mut scoring.weights.temperature),
        (args.weight_pressure, &mut scoring.weights.pressure),
        (args.weight_reproducibility, &mut scoring.weights.reproducibility),
        (args.weight_reliability, &mut scoring.weights.reliability),
    ];
    for (flag, weight) in overrides {
        if let Some(percent) = flag {
            *weight = f64::from(percent) / 100.0;
        }
    }

    Ok(scoring)
}

fn record_name<'a>(catalog: &'a CatalogModel, result: &MatchResult) -> &'a str {
    catalog
        .get(&result.record_id)
        .map_or("", |r| r.name.as_str())
}

fn format_margins(result: &MatchResult) -> String {
    result
        .dimension_margins
        .iter()
        .map(|(dim, margin)| match margin {
            Margin::Finite(_) => format!("{dim} {margin} {}", dim.unit()),
            Margin::Unbounded => format!("{dim} unbounded"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_text_results(
    results: &[&MatchResult],
    catalog: &CatalogModel,
    compatible: usize,
    total: usize,
    verbose: bool,
) {
    println!("{compatible} of {total} cells compatible\n");

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }

        let status = if result.compatible { "COMPATIBLE" } else { "EXCLUDED" };
        println!(
            "\n#{} {} [{}] ({})",
            i + 1,
            record_name(catalog, result),
            result.record_id,
            status
        );

        if result.compatible {
            println!("   Score: {:.1}%", result.score_percentage());
        }
        println!("   TRL: {}", result.trl);
        println!("   Margins: {}", format_margins(result));

        if !result.exclusion_reasons.is_empty() {
            println!("\n   Excluded because:");
            for reason in &result.exclusion_reasons {
                println!("   - {reason}");
            }
        }

        if !result.trade_off_notes.is_empty() {
            println!("\n   Trade-offs:");
            for note in &result.trade_off_notes {
                println!("   - {note}");
            }
        }

        if verbose {
            if let Some(record) = catalog.get(&result.record_id) {
                if let Some(email) = &record.contact_email {
                    println!("\n   Contact: {email}");
                }
                if !record.facility_affinity.is_empty() {
                    println!("   Facility: {}", record.facility_affinity);
                }
            }
        }
    }

    println!();
}

fn print_json_results(results: &[&MatchResult], catalog: &CatalogModel) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = results
        .iter()
        .enumerate()
        .map(|(i, m)| {
            serde_json::json!({
                "rank": i + 1,
                "record_id": m.record_id,
                "name": record_name(catalog, m),
                "trl": m.trl,
                "compatible": m.compatible,
                "score": m.score,
                "dimension_margins": m.dimension_margins,
                "exclusion_reasons": m.exclusion_reasons,
                "exclusion_messages": m
                    .exclusion_reasons
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                "trade_off_notes": m.trade_off_notes,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(results: &[&MatchResult], catalog: &CatalogModel) {
    println!("rank\tid\tname\ttrl\tcompatible\tscore\ttemperature_margin\tpressure_margin\ttrl_margin\texclusions\tnotes");
    for (i, m) in results.iter().enumerate() {
        let margin = |dim: Dimension| {
            m.dimension_margins
                .get(&dim)
                .map_or_else(String::new, ToString::to_string)
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            m.record_id,
            record_name(catalog, m),
            m.trl,
            m.compatible,
            m.score,
            margin(Dimension::Temperature),
            margin(Dimension::Pressure),
            margin(Dimension::Trl),
            m.exclusion_reasons.len(),
            m.trade_off_notes.len(),
        );
    }
}
