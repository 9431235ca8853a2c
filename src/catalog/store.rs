use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::hardware::HardwareRecord;
use crate::core::types::RecordId;
use crate::utils::validation::{
    check_record_limit, describe_interval_problem, is_unit_score, is_valid_trl, MAX_TRL, MIN_TRL,
};

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// A single problem found while validating a catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogViolation {
    EmptyId {
        index: usize,
    },
    DuplicateId {
        id: RecordId,
        first_index: usize,
        duplicate_index: usize,
    },
    MalformedRange {
        id: RecordId,
        field: &'static str,
        problem: String,
    },
    TrlOutOfRange {
        id: RecordId,
        trl: i64,
    },
    MissingField {
        index: usize,
        field: &'static str,
    },
    InvalidField {
        index: usize,
        field: &'static str,
        problem: String,
    },
    InvalidRecord {
        index: usize,
        problem: String,
    },
    ReproducibilityOutOfRange {
        id: RecordId,
        score: f64,
    },
    TooManyRecords {
        message: String,
    },
}

impl std::fmt::Display for CatalogViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { index } => write!(f, "record #{index} has an empty id"),
            Self::DuplicateId {
                id,
                first_index,
                duplicate_index,
            } => write!(
                f,
                "duplicate id '{id}' (records #{first_index} and #{duplicate_index})"
            ),
            Self::MalformedRange { id, field, problem } => {
                write!(f, "'{id}': malformed {field}: {problem}")
            }
            Self::TrlOutOfRange { id, trl } => {
                write!(f, "'{id}': trl {trl} is outside [{MIN_TRL}, {MAX_TRL}]")
            }
            Self::ReproducibilityOutOfRange { id, score } => write!(
                f,
                "'{id}': assembly_reproducibility_score {score} is outside [0, 1]"
            ),
            Self::MissingField { index, field } => {
                write!(f, "record #{index}: missing required field '{field}'")
            }
            Self::InvalidField {
                index,
                field,
                problem,
            } => write!(f, "record #{index}: invalid {field}: {problem}"),
            Self::InvalidRecord { index, problem } => write!(f, "record #{index}: {problem}"),
            Self::TooManyRecords { message } => write!(f, "{message}"),
        }
    }
}

/// Every violation found in a rejected catalog, in record order
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Catalog validation failed with {} violation(s):\n  - {}", .violations.len(), join_violations(.violations))]
pub struct CatalogValidationError {
    pub violations: Vec<CatalogViolation>,
}

fn join_violations(violations: &[CatalogViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  - ")
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] CatalogValidationError),
}

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    pub records: Vec<HardwareRecord>,
}

/// Envelope read before records are typed individually
#[derive(Deserialize)]
struct CatalogEnvelope {
    version: String,
    records: Vec<serde_json::Value>,
}

/// A validated, immutable snapshot of hardware records
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogModel {
    /// Records in input order
    records: Vec<HardwareRecord>,

    /// Index: record ID -> index in records vec
    id_to_index: HashMap<RecordId, usize>,
}

/// Validate raw records into a catalog.
///
/// Collects every violation rather than stopping at the first, so a catalog
/// maintainer can fix all of them in one pass.
///
/// # Errors
///
/// Returns `CatalogValidationError` if any record is malformed or any id is
/// duplicated.
pub fn validate_catalog(records: Vec<HardwareRecord>) -> Result<CatalogModel, CatalogValidationError> {
    validate_entries(records.into_iter().map(Entry::Typed).collect())
}

/// Fields every raw record must carry
const REQUIRED_FIELDS: [&str; 5] = [
    "id",
    "name",
    "trl",
    "beam_compatibility",
    "assembly_reproducibility_score",
];

/// One input record: typed, or rejected before typing with what was wrong
enum Entry {
    Typed(HardwareRecord),
    Rejected {
        id: Option<RecordId>,
        violations: Vec<CatalogViolation>,
    },
}

fn validate_entries(entries: Vec<Entry>) -> Result<CatalogModel, CatalogValidationError> {
    let mut violations = Vec::new();
    let mut records = Vec::with_capacity(entries.len());
    let mut id_to_index: HashMap<RecordId, usize> = HashMap::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        if let Some(message) = check_record_limit(index) {
            violations.push(CatalogViolation::TooManyRecords { message });
            break;
        }

        let id = match &entry {
            Entry::Typed(record) => Some(record.id.clone()),
            Entry::Rejected { id, .. } => id.clone(),
        };
        // A missing id is already reported by the raw checks
        if let Some(id) = id {
            if id.as_str().trim().is_empty() {
                violations.push(CatalogViolation::EmptyId { index });
            } else if let Some(&first_index) = id_to_index.get(&id) {
                violations.push(CatalogViolation::DuplicateId {
                    id,
                    first_index,
                    duplicate_index: index,
                });
            } else {
                id_to_index.insert(id, index);
            }
        }

        match entry {
            Entry::Typed(record) => {
                violations.extend(check_record(&record));
                records.push(record);
            }
            Entry::Rejected {
                violations: rejected,
                ..
            } => violations.extend(rejected),
        }
    }

    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "catalog rejected");
        return Err(CatalogValidationError { violations });
    }

    tracing::debug!(records = records.len(), "catalog validated");
    Ok(CatalogModel {
        records,
        id_to_index,
    })
}

/// Explain why a raw JSON record could not be typed
fn reject_raw_record(index: usize, raw: &serde_json::Value, error: &serde_json::Error) -> Entry {
    let Some(object) = raw.as_object() else {
        return Entry::Rejected {
            id: None,
            violations: vec![CatalogViolation::InvalidRecord {
                index,
                problem: "expected a JSON object".to_string(),
            }],
        };
    };

    let id = object
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map(RecordId::new);
    let mut violations = Vec::new();

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            violations.push(CatalogViolation::MissingField { index, field });
        }
    }

    if let Some(trl) = object.get("trl") {
        match (trl.as_i64(), &id) {
            (Some(value), Some(id)) if !(i64::from(MIN_TRL)..=i64::from(MAX_TRL)).contains(&value) => {
                violations.push(CatalogViolation::TrlOutOfRange {
                    id: id.clone(),
                    trl: value,
                });
            }
            (Some(value), None) if !(i64::from(MIN_TRL)..=i64::from(MAX_TRL)).contains(&value) => {
                violations.push(CatalogViolation::InvalidField {
                    index,
                    field: "trl",
                    problem: format!("{value} is outside [{MIN_TRL}, {MAX_TRL}]"),
                });
            }
            (Some(_), _) => {}
            (None, _) => violations.push(CatalogViolation::InvalidField {
                index,
                field: "trl",
                problem: format!("expected an integer, got {trl}"),
            }),
        }
    }

    // Nothing recognizable: fall back to the parser's own message
    if violations.is_empty() {
        violations.push(CatalogViolation::InvalidRecord {
            index,
            problem: error.to_string(),
        });
    }

    Entry::Rejected { id, violations }
}

/// Field-level checks for a single record
fn check_record(record: &HardwareRecord) -> Vec<CatalogViolation> {
    let mut violations = Vec::new();

    if !is_valid_trl(record.trl) {
        violations.push(CatalogViolation::TrlOutOfRange {
            id: record.id.clone(),
            trl: i64::from(record.trl),
        });
    }

    let ranges = [
        ("temperature_range", record.temperature_range),
        ("pressure_range", record.pressure_range),
    ];
    for (field, range) in ranges {
        if let Some(problem) = range.as_ref().and_then(describe_interval_problem) {
            violations.push(CatalogViolation::MalformedRange {
                id: record.id.clone(),
                field,
                problem,
            });
        }
    }

    if !is_unit_score(record.assembly_reproducibility_score) {
        violations.push(CatalogViolation::ReproducibilityOutOfRange {
            id: record.id.clone(),
            score: record.assembly_reproducibility_score,
        });
    }

    violations
}

impl CatalogModel {
    /// Load the embedded sample registry
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Checked at compile time via build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/operando_cells.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string.
    ///
    /// Accepts the versioned envelope written by [`CatalogModel::to_json`] or
    /// a bare array of records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let raw_records = match value {
            serde_json::Value::Array(items) => items,
            other => {
                let envelope: CatalogEnvelope = serde_json::from_value(other)?;
                // Version check (warn but don't fail)
                if envelope.version != CATALOG_VERSION {
                    tracing::warn!(
                        expected = CATALOG_VERSION,
                        found = %envelope.version,
                        "catalog version mismatch"
                    );
                }
                envelope.records
            }
        };

        // Type each record on its own so one bad record does not hide the rest
        let entries = raw_records
            .iter()
            .enumerate()
            .map(|(index, raw)| match HardwareRecord::deserialize(raw) {
                Ok(record) => Entry::Typed(record),
                Err(e) => reject_raw_record(index, raw, &e),
            })
            .collect();

        Ok(validate_entries(entries)?)
    }

    /// Export catalog to JSON
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Self::records_to_json(self.records.iter())
    }

    /// Export a subset of records (e.g. a filtered view) in the catalog format
    pub fn records_to_json<'a>(
        records: impl Iterator<Item = &'a HardwareRecord>,
    ) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            records: records.cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Get a record by ID
    pub fn get(&self, id: &RecordId) -> Option<&HardwareRecord> {
        self.id_to_index.get(id).map(|&idx| &self.records[idx])
    }

    /// Records in input order
    pub fn records(&self) -> &[HardwareRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HardwareRecord> {
        self.records.iter()
    }

    /// Number of records in catalog
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand the records back, e.g. to re-validate or edit them
    pub fn into_records(self) -> Vec<HardwareRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a CatalogModel {
    type Item = &'a HardwareRecord;
    type IntoIter = std::slice::Iter<'a, HardwareRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
