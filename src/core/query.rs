use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::interval::Interval;
use crate::core::types::{BeamType, ReliabilityTolerance};
use crate::utils::validation::{describe_requirement_problem, is_valid_trl, MAX_TRL, MIN_TRL};

/// One offending field of a rejected query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFieldError {
    pub field: String,
    pub problem: String,
}

impl std::fmt::Display for QueryFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid query: {}", join_fields(.0))]
    InvalidQuery(Vec<QueryFieldError>),

    #[error("Failed to parse query: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to read query: {0}")]
    ReadError(#[from] std::io::Error),
}

impl QueryError {
    /// Names of the offending fields (empty for parse/read errors)
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::InvalidQuery(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_fields(errors: &[QueryFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unvalidated query fields, as collected from a caller or a JSON document.
///
/// Every dimension left unset is unconstrained. Call [`QueryBuilder::build`]
/// to obtain a [`RequirementQuery`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryBuilder {
    pub required_beam: Option<BeamType>,
    pub target_temperature: Option<Interval>,
    pub target_pressure: Option<Interval>,
    pub min_trl: Option<u8>,
    pub allow_lower_trl: bool,
    pub reliability_tolerance: ReliabilityTolerance,
    pub techniques: Vec<String>,
    pub instruments: Vec<String>,
    pub require_cad: bool,
    pub require_pressure_control: bool,

    /// Keys not recognized above; any entry here fails `build()`
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_json::Value>,
}

impl QueryBuilder {
    #[must_use]
    pub fn beam(mut self, beam: BeamType) -> Self {
        self.required_beam = Some(beam);
        self
    }

    #[must_use]
    pub fn temperature(mut self, value: f64) -> Self {
        self.target_temperature = Some(Interval::point(value));
        self
    }

    #[must_use]
    pub fn temperature_range(mut self, min: f64, max: f64) -> Self {
        self.target_temperature = Some(Interval::new(min, max));
        self
    }

    #[must_use]
    pub fn pressure(mut self, value: f64) -> Self {
        self.target_pressure = Some(Interval::point(value));
        self
    }

    #[must_use]
    pub fn pressure_range(mut self, min: f64, max: f64) -> Self {
        self.target_pressure = Some(Interval::new(min, max));
        self
    }

    #[must_use]
    pub fn min_trl(mut self, trl: u8) -> Self {
        self.min_trl = Some(trl);
        self
    }

    /// Admit records below `min_trl` with a scoring penalty instead of excluding them
    #[must_use]
    pub fn allow_lower_trl(mut self, allow: bool) -> Self {
        self.allow_lower_trl = allow;
        self
    }

    #[must_use]
    pub fn tolerance(mut self, tolerance: ReliabilityTolerance) -> Self {
        self.reliability_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn technique(mut self, technique: impl Into<String>) -> Self {
        self.techniques.push(technique.into());
        self
    }

    #[must_use]
    pub fn instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instruments.push(instrument.into());
        self
    }

    #[must_use]
    pub fn require_cad(mut self, require: bool) -> Self {
        self.require_cad = require;
        self
    }

    #[must_use]
    pub fn require_pressure_control(mut self, require: bool) -> Self {
        self.require_pressure_control = require;
        self
    }

    /// Validate and freeze the query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidQuery` listing every offending field.
    pub fn build(self) -> Result<RequirementQuery, QueryError> {
        let mut errors = Vec::new();

        if let Some(t) = &self.target_temperature {
            if let Some(problem) = describe_requirement_problem(t) {
                errors.push(QueryFieldError {
                    field: "target_temperature".to_string(),
                    problem,
                });
            }
        }

        if let Some(p) = &self.target_pressure {
            if let Some(problem) = describe_requirement_problem(p) {
                errors.push(QueryFieldError {
                    field: "target_pressure".to_string(),
                    problem,
                });
            }
        }

        if let Some(trl) = self.min_trl {
            if !is_valid_trl(trl) {
                errors.push(QueryFieldError {
                    field: "min_trl".to_string(),
                    problem: format!("{trl} is outside [{MIN_TRL}, {MAX_TRL}]"),
                });
            }
        }

        if self.techniques.iter().any(|t| t.trim().is_empty()) {
            errors.push(QueryFieldError {
                field: "techniques".to_string(),
                problem: "empty technique name".to_string(),
            });
        }

        if self.instruments.iter().any(|i| i.trim().is_empty()) {
            errors.push(QueryFieldError {
                field: "instruments".to_string(),
                problem: "empty instrument name".to_string(),
            });
        }

        // A misspelled key would otherwise leave its dimension unconstrained
        for key in self.unknown_fields.keys() {
            errors.push(QueryFieldError {
                field: key.clone(),
                problem: "unknown field".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(QueryError::InvalidQuery(errors));
        }

        Ok(RequirementQuery { fields: self })
    }
}

/// A validated, immutable statement of an experiment's requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueryBuilder", into = "QueryBuilder")]
pub struct RequirementQuery {
    fields: QueryBuilder,
}

impl TryFrom<QueryBuilder> for RequirementQuery {
    type Error = QueryError;

    fn try_from(builder: QueryBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<RequirementQuery> for QueryBuilder {
    fn from(query: RequirementQuery) -> Self {
        query.fields
    }
}

impl RequirementQuery {
    /// Start a query with every dimension unconstrained
    #[must_use]
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Parse and validate a query from JSON
    ///
    /// # Errors
    ///
    /// Returns `QueryError::ParseError` for malformed JSON and
    /// `QueryError::InvalidQuery` for structurally invalid values.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let builder: QueryBuilder = serde_json::from_str(json)?;
        builder.build()
    }

    /// Load a query from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, QueryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn required_beam(&self) -> Option<BeamType> {
        self.fields.required_beam
    }

    pub fn target_temperature(&self) -> Option<Interval> {
        self.fields.target_temperature
    }

    pub fn target_pressure(&self) -> Option<Interval> {
        self.fields.target_pressure
    }

    pub fn min_trl(&self) -> Option<u8> {
        self.fields.min_trl
    }

    /// TRL floor applied by the evaluator (`min_trl`, or the lowest TRL)
    pub fn effective_min_trl(&self) -> u8 {
        self.fields.min_trl.unwrap_or(MIN_TRL)
    }

    pub fn allows_lower_trl(&self) -> bool {
        self.fields.allow_lower_trl
    }

    pub fn reliability_tolerance(&self) -> ReliabilityTolerance {
        self.fields.reliability_tolerance
    }

    pub fn techniques(&self) -> &[String] {
        &self.fields.techniques
    }

    pub fn instruments(&self) -> &[String] {
        &self.fields.instruments
    }

    pub fn requires_cad(&self) -> bool {
        self.fields.require_cad
    }

    pub fn requires_pressure_control(&self) -> bool {
        self.fields.require_pressure_control
    }

    /// Stable fingerprint of this query, used as a cache key.
    ///
    /// MD5 of the canonical JSON form; identical queries always hash equal.
    pub fn fingerprint(&self) -> String {
        // Serializing a plain struct of numbers, strings and enums cannot fail
        let canonical = serde_json::to_string(&self.fields).unwrap_or_default();
        let digest = md5::compute(canonical.as_bytes());
        format!("{digest:x}")
    }

    /// Copy of this query with a different TRL floor
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidQuery` if `min_trl` is out of range.
    pub fn with_min_trl(&self, min_trl: u8) -> Result<Self, QueryError> {
        self.fields.clone().min_trl(min_trl).build()
    }
}

impl Default for RequirementQuery {
    /// A query with every dimension unconstrained
    fn default() -> Self {
        Self {
            fields: QueryBuilder::default(),
        }
    }
}
