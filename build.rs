use std::collections::HashSet;
use std::path::Path;

const CATALOG_PATH: &str = "catalogs/operando_cells.json";

fn main() {
    let catalog_path = Path::new(CATALOG_PATH);
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the catalog file before building.\n",
        catalog_path.display()
    );

    // Read catalog file
    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    // Parse and validate JSON
    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    assert!(
        catalog.get("version").and_then(|v| v.as_str()).is_some(),
        "\n\nCATALOG BUILD ERROR: Missing 'version' field\n"
    );

    let records = catalog.get("records").unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing 'records' field\n\
             The catalog must have a top-level 'records' array.\n"
        );
    });

    let records = records.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: 'records' must be an array\n\
             Got: {records}\n"
        );
    });

    let total_failure_modes = validate_records(records);

    println!(
        "cargo:warning=Validated catalog: {} cells, {total_failure_modes} documented failure modes",
        records.len()
    );
}

fn validate_records(records: &[serde_json::Value]) -> usize {
    let mut seen = HashSet::new();
    let mut total_failure_modes = 0;

    for (i, record) in records.iter().enumerate() {
        let record_id = record
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        validate_record_fields(record, record_id, i);

        assert!(
            seen.insert(record_id.to_string()),
            "\n\nCATALOG BUILD ERROR: Duplicate record id '{record_id}' (index {i})\n"
        );

        validate_record_trl(record, record_id);
        validate_record_range(record, record_id, "temperature_range");
        validate_record_range(record, record_id, "pressure_range");

        total_failure_modes += record
            .get("failure_modes")
            .and_then(|f| f.as_array())
            .map_or(0, Vec::len);
    }

    total_failure_modes
}

fn validate_record_fields(record: &serde_json::Value, record_id: &str, index: usize) {
    for field in ["id", "name", "trl", "beam_compatibility", "assembly_reproducibility_score"] {
        assert!(
            record.get(field).is_some(),
            "\n\nCATALOG BUILD ERROR: Record '{record_id}' (index {index}) missing '{field}' field\n"
        );
    }

    assert!(
        !record_id.trim().is_empty(),
        "\n\nCATALOG BUILD ERROR: Record at index {index} has an empty 'id'\n"
    );
}

fn validate_record_trl(record: &serde_json::Value, record_id: &str) {
    let trl = record.get("trl").and_then(serde_json::Value::as_u64);
    assert!(
        matches!(trl, Some(1..=9)),
        "\n\nCATALOG BUILD ERROR: Record '{record_id}' has TRL {trl:?}\n\
         TRL must be an integer between 1 and 9.\n"
    );
}

fn validate_record_range(record: &serde_json::Value, record_id: &str, field: &str) {
    let Some(range) = record.get(field) else {
        return;
    };

    // Ranges are written as `{"min": a, "max": b}` or `[a, b]`
    let (min, max) = match range {
        serde_json::Value::Array(bounds) if bounds.len() == 2 => (
            bounds[0].as_f64(),
            bounds[1].as_f64(),
        ),
        _ => (
            range.get("min").and_then(serde_json::Value::as_f64),
            range.get("max").and_then(serde_json::Value::as_f64),
        ),
    };

    if let (Some(min), Some(max)) = (min, max) {
        assert!(
            min <= max,
            "\n\nCATALOG BUILD ERROR: Record '{record_id}' has {field} with min {min} > max {max}\n"
        );
    }
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed={CATALOG_PATH}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
