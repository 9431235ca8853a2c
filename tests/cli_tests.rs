//! Command-line tests for the `operando-match` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn operando_match() -> Command {
    Command::cargo_bin("operando-match").expect("binary should build")
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

const SMALL_CATALOG: &str = r#"[
    {
        "id": "C1",
        "name": "Coin cell",
        "trl": 6,
        "temperature_range": [20, 80],
        "beam_compatibility": ["x-ray"],
        "techniques": ["XRD"],
        "assembly_reproducibility_score": 0.9
    },
    {
        "id": "N1",
        "name": "Neutron pouch",
        "trl": 7,
        "temperature_range": { "min": -20, "max": 60 },
        "beam_compatibility": ["neutron"],
        "assembly_reproducibility_score": 0.7
    }
]"#;

#[test]
fn test_match_json_output() {
    let catalog = write_temp(SMALL_CATALOG);

    let output = operando_match()
        .args(["match", "--beam", "x-ray", "--temperature", "50", "--min-trl", "5"])
        .arg("--catalog")
        .arg(catalog.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["record_id"], "C1");
    assert_eq!(results[0]["compatible"], true);
    assert_eq!(results[0]["dimension_margins"]["temperature"], 30.0);

    assert_eq!(results[1]["record_id"], "N1");
    assert_eq!(results[1]["compatible"], false);
    assert_eq!(results[1]["score"], 0.0);
    assert!(!results[1]["exclusion_reasons"].as_array().unwrap().is_empty());
}

#[test]
fn test_match_text_lists_exclusions() {
    let catalog = write_temp(SMALL_CATALOG);

    operando_match()
        .args(["match", "--beam", "x-ray", "--temperature", "100"])
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 2 cells compatible"))
        .stdout(predicate::str::contains("EXCLUDED"))
        .stdout(predicate::str::contains("margin -20"));
}

#[test]
fn test_match_compatible_only_hides_excluded() {
    let catalog = write_temp(SMALL_CATALOG);

    operando_match()
        .args(["match", "--beam", "neutron", "--compatible-only", "--format", "tsv"])
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("N1"))
        .stdout(predicate::str::contains("C1").not());
}

#[test]
fn test_match_query_file_with_flag_override() {
    let catalog = write_temp(SMALL_CATALOG);
    let query = write_temp(r#"{ "required_beam": "neutron", "target_temperature": 40 }"#);

    let output = operando_match()
        .arg("match")
        .arg("--query")
        .arg(query.path())
        .args(["--beam", "x-ray", "--format", "json"])
        .arg("--catalog")
        .arg(catalog.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results[0]["record_id"], "C1");
    assert_eq!(results[0]["compatible"], true);
}

#[test]
fn test_match_invalid_query_names_every_field() {
    operando_match()
        .args([
            "match",
            "--temperature",
            "80",
            "--temperature-max",
            "20",
            "--min-trl",
            "12",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target_temperature"))
        .stderr(predicate::str::contains("min_trl"));
}

#[test]
fn test_match_rejects_unknown_beam() {
    operando_match()
        .args(["match", "--beam", "gamma"])
        .assert()
        .failure();
}

#[test]
fn test_catalog_validate_reports_every_violation() {
    let bad = write_temp(
        r#"[
        { "id": "A", "name": "a", "trl": 12, "beam_compatibility": [], "assembly_reproducibility_score": 0.5 },
        { "id": "A", "name": "dup", "trl": 5, "beam_compatibility": [], "assembly_reproducibility_score": 0.5 },
        { "id": "B", "name": "b", "trl": 5, "temperature_range": { "min": 80, "max": 20 },
          "beam_compatibility": [], "assembly_reproducibility_score": 1.5 }
    ]"#,
    );

    operando_match()
        .args(["catalog", "validate"])
        .arg(bad.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("4 violation(s)"))
        .stdout(predicate::str::contains("trl 12"))
        .stdout(predicate::str::contains("duplicate id 'A'"))
        .stdout(predicate::str::contains("temperature_range"))
        .stdout(predicate::str::contains("assembly_reproducibility_score 1.5"));
}

#[test]
fn test_catalog_validate_accepts_good_catalog() {
    let good = write_temp(SMALL_CATALOG);

    operando_match()
        .args(["catalog", "validate"])
        .arg(good.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OK (2 records)"));
}

#[test]
fn test_catalog_list_embedded_with_filter() {
    operando_match()
        .args(["catalog", "list", "--high-temp", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("high-temp-solid-state"))
        .stdout(predicate::str::contains("xpdf-capillary"))
        .stdout(predicate::str::contains("diamond-i11-coin").not());
}

#[test]
fn test_catalog_show_includes_glossary_and_contact() {
    operando_match()
        .args(["catalog", "show", "diamond-i11-coin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("X-ray Diffraction"))
        .stdout(predicate::str::contains("window_delamination"))
        .stdout(predicate::str::contains("coin-cells@diamond.example.org"));
}

#[test]
fn test_catalog_show_unknown_id_fails() {
    operando_match()
        .args(["catalog", "show", "no-such-cell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_catalog_export_filtered_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cad_cells.json");

    operando_match()
        .args(["catalog", "export"])
        .arg(&output)
        .arg("--cad-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let exported = operando_match::CatalogModel::load_from_file(&output).unwrap();
    assert!(!exported.is_empty());
    assert!(exported.iter().all(|r| r.cad_available));
}

#[test]
fn test_catalog_matrix_json() {
    let catalog = write_temp(SMALL_CATALOG);

    let output = operando_match()
        .args(["catalog", "matrix", "--format", "json"])
        .arg("--catalog")
        .arg(catalog.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let matrix: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(matrix["techniques"], serde_json::json!(["XRD"]));
    assert_eq!(matrix["rows"][0]["supported"], serde_json::json!([true]));
    assert_eq!(matrix["rows"][1]["supported"], serde_json::json!([false]));
}

#[test]
fn test_catalog_validate_reports_untypable_record_with_duplicate() {
    let bad = write_temp(
        r#"[
        { "id": "A", "name": "a", "trl": 300, "beam_compatibility": [], "assembly_reproducibility_score": 0.5 },
        { "id": "A", "trl": 5, "beam_compatibility": [], "assembly_reproducibility_score": 0.5 }
    ]"#,
    );

    operando_match()
        .args(["catalog", "validate"])
        .arg(bad.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("3 violation(s)"))
        .stdout(predicate::str::contains("trl 300"))
        .stdout(predicate::str::contains("duplicate id 'A'"))
        .stdout(predicate::str::contains("missing required field 'name'"));
}

#[test]
fn test_match_query_file_with_misspelled_field_fails() {
    let query = write_temp(r#"{ "required_beam": "x-ray", "target_temp": 500, "min_trl_level": 9 }"#);

    operando_match()
        .arg("match")
        .arg("--query")
        .arg(query.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("target_temp: unknown field"))
        .stderr(predicate::str::contains("min_trl_level: unknown field"));
}

#[test]
fn test_match_empty_catalog_prints_empty_json_array() {
    let catalog = write_temp("[]");

    let output = operando_match()
        .args(["match", "--beam", "x-ray", "--format", "json"])
        .arg("--catalog")
        .arg(catalog.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results, serde_json::json!([]));
}

#[test]
fn test_catalog_list_header_counts() {
    operando_match()
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(7 cells, 4 CAD-ready, 2 high-temperature capable)",
        ))
        .stdout(predicate::str::contains("Muon 1"));

    operando_match()
        .args(["--verbose", "catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Instruments: "))
        .stdout(predicate::str::contains("POLARIS"));
}

#[test]
fn test_catalog_compare_text_shows_each_cell() {
    operando_match()
        .args(["catalog", "compare", "diamond-i11-coin", "stack-pressure-pouch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Comparison (2 cells)"))
        .stdout(predicate::str::contains("X-ray Diffraction"))
        .stdout(predicate::str::contains("Pressure control: yes"))
        .stdout(predicate::str::contains("3Rs profile"))
        .stdout(predicate::str::contains("coin-cells@diamond.example.org"))
        .stdout(predicate::str::contains("pressure-cells@diamond.example.org"));
}

#[test]
fn test_catalog_compare_json_and_tsv() {
    let catalog = write_temp(SMALL_CATALOG);

    let output = operando_match()
        .args(["catalog", "compare", "N1", "C1", "--format", "json"])
        .arg("--catalog")
        .arg(catalog.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let cells: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cells[0]["id"], "N1");
    assert_eq!(cells[1]["id"], "C1");
    assert_eq!(cells[1]["techniques"][0]["name"], "XRD");
    assert!(cells[1]["techniques"][0]["definition"].is_string());
    assert_eq!(cells[1]["three_rs"]["assembly_reproducibility_score"], 0.9);

    operando_match()
        .args(["catalog", "compare", "C1", "N1", "--format", "tsv"])
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("id\tC1\tN1"))
        .stdout(predicate::str::contains("beams\tx-ray\tneutron"));
}

#[test]
fn test_catalog_compare_limits_and_unknown_ids() {
    operando_match()
        .args(["catalog", "compare", "diamond-i11-coin", "no-such-cell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'no-such-cell' not found"));

    operando_match()
        .args([
            "catalog",
            "compare",
            "diamond-i11-coin",
            "xpdf-capillary",
            "isis-muon-cell",
            "bench-reference",
        ])
        .assert()
        .failure();
}
