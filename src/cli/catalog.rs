use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::filter::{all_instruments, is_high_temperature, CatalogFilter};
use crate::catalog::matrix::TechniqueMatrix;
use crate::catalog::store::{CatalogError, CatalogModel};
use crate::cli::{load_catalog, OutputFormat};
use crate::core::hardware::HardwareRecord;
use crate::core::interval::Interval;
use crate::core::technique;
use crate::core::types::{BeamType, RecordId};

/// Most cells shown side by side by `compare`
pub const MAX_COMPARE: usize = 3;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

/// Browsing filters shared by `list`, `export` and `matrix`
#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Only cells supporting this technique (repeatable; any one suffices)
    #[arg(long = "technique")]
    pub techniques: Vec<String>,

    /// Only cells qualified on this instrument (repeatable; any one suffices)
    #[arg(long = "instrument")]
    pub instruments: Vec<String>,

    /// Only cells with a published CAD model
    #[arg(long)]
    pub cad_only: bool,

    /// Only cells rated to 100 °C or above
    #[arg(long)]
    pub high_temp: bool,

    /// Only cells with active pressure control
    #[arg(long)]
    pub pressure_control: bool,
}

impl From<FilterArgs> for CatalogFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            techniques: args.techniques,
            instruments: args.instruments,
            cad_only: args.cad_only,
            high_temperature_only: args.high_temp,
            pressure_control_only: args.pressure_control,
        }
    }
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List cells in the catalog
    List {
        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show details of a specific cell
    Show {
        /// Cell ID
        #[arg(required = true)]
        id: String,

        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Compare up to three cells side by side
    Compare {
        /// Cell IDs to compare
        #[arg(required = true, num_args = 1..=MAX_COMPARE)]
        ids: Vec<String>,

        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Check a catalog file and report every problem found
    Validate {
        /// Catalog file to check
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Export the (optionally filtered) catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom catalog file to export (defaults to embedded)
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show which cells support which techniques
    Matrix {
        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, fails validation, or the
/// requested cell does not exist.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { catalog, filter } => {
            run_list(catalog, filter.into(), format, verbose)
        }
        CatalogCommands::Show { id, catalog } => run_show(&id, catalog, format, verbose),
        CatalogCommands::Compare { ids, catalog } => run_compare(&ids, catalog, format, verbose),
        CatalogCommands::Validate { file } => run_validate(file, format),
        CatalogCommands::Export {
            output,
            catalog,
            filter,
        } => run_export(output, catalog, filter.into(), verbose),
        CatalogCommands::Matrix { catalog, filter } => {
            run_matrix(catalog, filter.into(), format, verbose)
        }
    }
}

fn format_range(range: Option<&Interval>, unit: &str) -> String {
    range.map_or_else(|| "-".to_string(), |r| format!("{r} {unit}"))
}

fn beam_list(record: &HardwareRecord) -> String {
    record
        .beam_compatibility
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Machine-readable beam tags for TSV output
fn beam_tags(record: &HardwareRecord) -> String {
    record
        .beam_compatibility
        .iter()
        .map(|b| b.tag())
        .collect::<Vec<_>>()
        .join(";")
}

fn run_list(
    catalog_path: Option<PathBuf>,
    filter: CatalogFilter,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref(), verbose)?;
    let filtered = filter.apply(&catalog);

    match format {
        OutputFormat::Text => {
            // Calculate column widths dynamically
            let id_width = filtered
                .iter()
                .map(|r| r.id.as_str().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let name_width = filtered
                .iter()
                .map(|r| r.name.chars().count().min(40))
                .max()
                .unwrap_or(4)
                .max(4);
            let facility_width = filtered
                .iter()
                .map(|r| r.facility_affinity.chars().count().min(20))
                .max()
                .unwrap_or(8)
                .max(8);

            let total_width = id_width + name_width + facility_width + 5 + 30 + 4;

            let cad_ready = filtered.iter().filter(|r| r.cad_available).count();
            let high_temp = filtered
                .iter()
                .filter(|r| is_high_temperature(r))
                .count();
            println!(
                "Operando Cell Catalog ({} cells, {cad_ready} CAD-ready, {high_temp} high-temperature capable)",
                filtered.len()
            );
            let coverage: Vec<String> = BeamType::ALL
                .iter()
                .map(|&beam| {
                    let count = filtered.iter().filter(|r| r.supports_beam(beam)).count();
                    format!("{beam} {count}")
                })
                .collect();
            println!("Beams: {}", coverage.join(", "));
            if verbose {
                let instruments = all_instruments(&catalog);
                if !instruments.is_empty() {
                    println!("Instruments: {}", instruments.join(", "));
                }
            }
            println!();
            println!(
                "{:<id_w$} {:<name_w$} {:<fac_w$} {:>5} Beams",
                "ID",
                "Name",
                "Facility",
                "TRL",
                id_w = id_width,
                name_w = name_width,
                fac_w = facility_width,
            );
            println!("{}", "-".repeat(total_width));

            for r in &filtered {
                println!(
                    "{:<id_w$} {:<name_w$} {:<fac_w$} {:>5} {}",
                    r.id.as_str(),
                    truncate(&r.name, name_width),
                    truncate(&r.facility_affinity, facility_width),
                    r.trl,
                    beam_list(r),
                    id_w = id_width,
                    name_w = name_width,
                    fac_w = facility_width,
                );
                if verbose {
                    println!(
                        "  └─ Temperature: {}  Pressure: {}  Techniques: {}",
                        format_range(r.temperature_range.as_ref(), "°C"),
                        format_range(r.pressure_range.as_ref(), "bar"),
                        if r.techniques.is_empty() {
                            "-".to_string()
                        } else {
                            r.techniques.join(", ")
                        }
                    );
                }
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "name": r.name,
                        "facility_affinity": r.facility_affinity,
                        "cell_type": r.cell_type,
                        "trl": r.trl,
                        "temperature_range": r.temperature_range,
                        "pressure_range": r.pressure_range,
                        "beam_compatibility": r.beam_compatibility,
                        "techniques": r.techniques,
                        "instruments": r.instruments,
                        "failure_mode_count": r.failure_modes.len(),
                        "worst_severity": r.worst_severity(),
                        "assembly_reproducibility_score": r.assembly_reproducibility_score,
                        "cad_available": r.cad_available,
                        "pressure_control": r.pressure_control,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tfacility\ttrl\ttemperature_range\tpressure_range\tbeams\ttechniques\tcad_available\tpressure_control");
            for r in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    r.id,
                    r.name,
                    r.facility_affinity,
                    r.trl,
                    r.temperature_range.map(|i| i.to_string()).unwrap_or_default(),
                    r.pressure_range.map(|i| i.to_string()).unwrap_or_default(),
                    beam_tags(r),
                    r.techniques.join(";"),
                    r.cad_available,
                    r.pressure_control,
                );
            }
        }
    }

    Ok(())
}

fn print_section(title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!("\n{title}:");
    for line in lines {
        println!("  - {line}");
    }
}

fn run_show(
    id: &str,
    catalog_path: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref(), verbose)?;

    let record = catalog
        .get(&RecordId::new(id))
        .ok_or_else(|| anyhow::anyhow!("Cell '{}' not found", id))?;

    match format {
        OutputFormat::Text => {
            println!("Cell: {}\n", record.name);
            println!("ID:          {}", record.id);
            if !record.facility_affinity.is_empty() {
                println!("Facility:    {}", record.facility_affinity);
            }
            if let Some(cell_type) = &record.cell_type {
                println!("Cell type:   {cell_type}");
            }
            println!("TRL:         {}", record.trl);
            println!(
                "Temperature: {}",
                format_range(record.temperature_range.as_ref(), "°C")
            );
            println!(
                "Pressure:    {}{}",
                format_range(record.pressure_range.as_ref(), "bar"),
                if record.pressure_control {
                    " (actively controlled)"
                } else {
                    ""
                }
            );
            println!("Beams:       {}", beam_list(record));
            println!(
                "Reproducibility: {:.2}",
                record.assembly_reproducibility_score
            );
            println!(
                "CAD model:   {}",
                if record.cad_available {
                    "available"
                } else {
                    "not available"
                }
            );

            if !record.instruments.is_empty() {
                println!("\nInstruments: {}", record.instruments.join(", "));
            }

            if !record.techniques.is_empty() {
                println!("\nTechniques:");
                for name in &record.techniques {
                    match technique::describe(name) {
                        Some(definition) => println!("  - {name}: {definition}"),
                        None => println!("  - {name}"),
                    }
                }
            }

            if !record.failure_modes.is_empty() {
                println!("\nFailure modes:");
                for fm in &record.failure_modes {
                    print!("  - [{}] {}", fm.severity, fm.mode);
                    if !fm.trigger_condition.is_empty() {
                        print!(" (trigger: {})", fm.trigger_condition);
                    }
                    if !fm.affected_beams.is_empty() {
                        let beams: Vec<String> =
                            fm.affected_beams.iter().map(ToString::to_string).collect();
                        print!(" [{}]", beams.join(", "));
                    }
                    println!();
                }
            }

            print_section("Reliability", &record.limitations.reliability);
            print_section("Representativeness", &record.limitations.representativeness);
            print_section("Reproducibility", &record.limitations.reproducibility);

            if let Some(email) = &record.contact_email {
                println!("\nContact: {email}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Tsv => {
            println!("mode\tseverity\ttrigger_condition\taffected_beams");
            for fm in &record.failure_modes {
                let beams: Vec<String> = fm.affected_beams.iter().map(ToString::to_string).collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    fm.mode,
                    fm.severity,
                    fm.trigger_condition,
                    beams.join(";")
                );
            }
        }
    }

    Ok(())
}

fn run_compare(
    ids: &[String],
    catalog_path: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    if ids.len() > MAX_COMPARE {
        anyhow::bail!("At most {MAX_COMPARE} cells can be compared, got {}", ids.len());
    }

    let catalog = load_catalog(catalog_path.as_deref(), verbose)?;
    let records = ids
        .iter()
        .map(|id| {
            catalog
                .get(&RecordId::new(id.as_str()))
                .ok_or_else(|| anyhow::anyhow!("Cell '{}' not found", id))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    match format {
        OutputFormat::Text => print_text_comparison(&records),
        OutputFormat::Json => print_json_comparison(&records)?,
        OutputFormat::Tsv => print_tsv_comparison(&records),
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_text_comparison(records: &[&HardwareRecord]) {
    println!("Cell Comparison ({} cells)", records.len());
    println!("{}", "=".repeat(60));

    for record in records {
        println!("\n{} [{}]", record.name, record.id);
        println!("  TRL: {}", record.trl);
        println!(
            "  Temperature: {}",
            format_range(record.temperature_range.as_ref(), "°C")
        );
        println!(
            "  Pressure: {}",
            format_range(record.pressure_range.as_ref(), "bar")
        );
        println!("  Pressure control: {}", yes_no(record.pressure_control));
        println!("  Beams: {}", beam_list(record));
        println!("  CAD model: {}", yes_no(record.cad_available));

        if !record.techniques.is_empty() {
            println!("  Techniques:");
            for name in &record.techniques {
                match technique::describe(name) {
                    Some(definition) => println!("    - {name}: {definition}"),
                    None => println!("    - {name}"),
                }
            }
        }

        println!("  3Rs profile:");
        println!(
            "    Reproducibility score: {:.2}",
            record.assembly_reproducibility_score
        );
        println!(
            "    Worst failure severity: {}",
            record
                .worst_severity()
                .map_or_else(|| "none".to_string(), |s| s.to_string())
        );
        for (label, notes) in [
            ("Reliability", &record.limitations.reliability),
            ("Representativeness", &record.limitations.representativeness),
            ("Reproducibility", &record.limitations.reproducibility),
        ] {
            if !notes.is_empty() {
                println!("    {label}: {}", notes.join("; "));
            }
        }

        println!(
            "  Contact: {}",
            record.contact_email.as_deref().unwrap_or("-")
        );
    }
}

fn print_json_comparison(records: &[&HardwareRecord]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            let techniques: Vec<serde_json::Value> = r
                .techniques
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "definition": technique::describe(name),
                    })
                })
                .collect();
            serde_json::json!({
                "id": r.id,
                "name": r.name,
                "trl": r.trl,
                "temperature_range": r.temperature_range,
                "pressure_range": r.pressure_range,
                "pressure_control": r.pressure_control,
                "beam_compatibility": r.beam_compatibility,
                "cad_available": r.cad_available,
                "techniques": techniques,
                "three_rs": {
                    "assembly_reproducibility_score": r.assembly_reproducibility_score,
                    "worst_severity": r.worst_severity(),
                    "limitations": r.limitations,
                },
                "contact_email": r.contact_email,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn tsv_row(records: &[&HardwareRecord], field: &str, value: impl Fn(&HardwareRecord) -> String) {
    let values: Vec<String> = records.iter().map(|&r| value(r)).collect();
    println!("{field}\t{}", values.join("\t"));
}

/// One row per attribute, one column per cell
fn print_tsv_comparison(records: &[&HardwareRecord]) {
    tsv_row(records, "id", |r| r.id.to_string());
    tsv_row(records, "name", |r| r.name.clone());
    tsv_row(records, "trl", |r| r.trl.to_string());
    tsv_row(records, "temperature_range", |r| {
        r.temperature_range.map(|i| i.to_string()).unwrap_or_default()
    });
    tsv_row(records, "pressure_range", |r| {
        r.pressure_range.map(|i| i.to_string()).unwrap_or_default()
    });
    tsv_row(records, "pressure_control", |r| r.pressure_control.to_string());
    tsv_row(records, "beams", beam_tags);
    tsv_row(records, "cad_available", |r| r.cad_available.to_string());
    tsv_row(records, "techniques", |r| r.techniques.join(";"));
    tsv_row(records, "assembly_reproducibility_score", |r| {
        format!("{:.2}", r.assembly_reproducibility_score)
    });
    tsv_row(records, "worst_severity", |r| {
        r.worst_severity().map(|s| s.to_string()).unwrap_or_default()
    });
    tsv_row(records, "contact_email", |r| {
        r.contact_email.clone().unwrap_or_default()
    });
}

fn run_validate(file: PathBuf, format: OutputFormat) -> anyhow::Result<()> {
    match CatalogModel::load_from_file(&file) {
        Ok(catalog) => {
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "valid": true,
                        "records": catalog.len(),
                        "violations": [],
                    }))?
                ),
                OutputFormat::Text | OutputFormat::Tsv => {
                    println!("{}: OK ({} records)", file.display(), catalog.len());
                }
            }
            Ok(())
        }
        Err(CatalogError::Invalid(err)) => {
            let messages: Vec<String> = err.violations.iter().map(ToString::to_string).collect();
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "valid": false,
                        "violations": messages,
                    }))?
                ),
                OutputFormat::Tsv => {
                    println!("violation");
                    for message in &messages {
                        println!("{message}");
                    }
                }
                OutputFormat::Text => {
                    println!("{}: {} violation(s)", file.display(), messages.len());
                    for message in &messages {
                        println!("  - {message}");
                    }
                }
            }
            anyhow::bail!(
                "{} failed validation with {} violation(s)",
                file.display(),
                messages.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn run_export(
    output: PathBuf,
    catalog_path: Option<PathBuf>,
    filter: CatalogFilter,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref(), verbose)?;
    let records = filter.apply(&catalog);

    let json = CatalogModel::records_to_json(records.iter().copied())?;
    std::fs::write(&output, json)?;

    println!(
        "Exported {} of {} cells to {}",
        records.len(),
        catalog.len(),
        output.display()
    );

    Ok(())
}

fn run_matrix(
    catalog_path: Option<PathBuf>,
    filter: CatalogFilter,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref(), verbose)?;
    let matrix = TechniqueMatrix::build(&catalog, filter.apply(&catalog));

    match format {
        OutputFormat::Text => {
            if matrix.techniques.is_empty() {
                println!("No techniques recorded in catalog");
                return Ok(());
            }

            let technique_width = matrix
                .techniques
                .iter()
                .map(|t| t.chars().count())
                .max()
                .unwrap_or(9)
                .max(9);

            println!(
                "Technique Compatibility Matrix ({} cells x {} techniques)\n",
                matrix.rows.len(),
                matrix.techniques.len()
            );
            for (col, (name, count)) in matrix
                .techniques
                .iter()
                .zip(matrix.column_counts())
                .enumerate()
            {
                let marks: String = matrix
                    .rows
                    .iter()
                    .map(|row| if row.supported[col] { '●' } else { '·' })
                    .collect();
                println!("{name:<technique_width$} {marks} ({count})");
            }

            println!("\nColumns:");
            for (i, row) in matrix.rows.iter().enumerate() {
                println!("  {:>2}. {} [{}]", i + 1, row.name, row.record_id);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&matrix)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\t{}", matrix.techniques.join("\t"));
            for row in &matrix.rows {
                let flags: Vec<&str> = row
                    .supported
                    .iter()
                    .map(|&s| if s { "1" } else { "0" })
                    .collect();
                println!("{}\t{}\t{}", row.record_id, row.name, flags.join("\t"));
            }
        }
    }

    Ok(())
}

/// Truncate to `max_len` characters, marking the cut with "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
