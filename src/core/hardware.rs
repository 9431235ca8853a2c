use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::interval::Interval;
use crate::core::types::{BeamType, RecordId, Severity};

/// A documented way in which a cell misbehaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    /// Short tag, e.g. "vibration" or "window_delamination"
    pub mode: String,

    pub severity: Severity,

    /// Free-text description of what triggers the failure
    #[serde(default)]
    pub trigger_condition: String,

    /// Beams under which this failure has been observed (empty = any)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub affected_beams: BTreeSet<BeamType>,
}

impl FailureMode {
    pub fn new(mode: impl Into<String>, severity: Severity) -> Self {
        Self {
            mode: mode.into(),
            severity,
            trigger_condition: String::new(),
            affected_beams: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger_condition = trigger.into();
        self
    }

    #[must_use]
    pub fn with_affected_beams(mut self, beams: impl IntoIterator<Item = BeamType>) -> Self {
        self.affected_beams = beams.into_iter().collect();
        self
    }

    /// Whether this failure mode applies to an experiment using `beam`
    #[must_use]
    pub fn is_relevant_to(&self, beam: Option<BeamType>) -> bool {
        match beam {
            Some(beam) => self.affected_beams.is_empty() || self.affected_beams.contains(&beam),
            None => true,
        }
    }
}

/// Free-text "3Rs" profile: reliability, representativeness, reproducibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limitations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reliability: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub representativeness: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reproducibility: Vec<String>,
}

impl Limitations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reliability.is_empty()
            && self.representativeness.is_empty()
            && self.reproducibility.is_empty()
    }
}

/// One sample-environment cell in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Human-readable name
    pub name: String,

    /// Facility the cell is usually deployed at (e.g. "ISIS", "Diamond")
    #[serde(default)]
    pub facility_affinity: String,

    /// Geometry or form factor (coin, pouch, capillary, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_type: Option<String>,

    /// Technology readiness level, 1-9
    pub trl: u8,

    /// Operating temperature range in °C (absent = not limited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_range: Option<Interval>,

    /// Operating pressure range in bar (absent = not limited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_range: Option<Interval>,

    /// Whether the cell has active pressure control
    #[serde(default)]
    pub pressure_control: bool,

    pub beam_compatibility: BTreeSet<BeamType>,

    /// Measurement techniques the cell has been used for (e.g. "XRD")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub techniques: Vec<String>,

    /// Beamlines/instruments the cell is qualified on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_modes: Vec<FailureMode>,

    /// Normalized 0-1 score of documented assembly reproducibility
    pub assembly_reproducibility_score: f64,

    /// A CAD model (digital twin) is published for this cell
    #[serde(default)]
    pub cad_available: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(default, skip_serializing_if = "Limitations::is_empty")]
    pub limitations: Limitations,

    /// Fields this crate does not interpret, kept for round-tripping
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HardwareRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, trl: u8) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.into(),
            facility_affinity: String::new(),
            cell_type: None,
            trl,
            temperature_range: None,
            pressure_range: None,
            pressure_control: false,
            beam_compatibility: BTreeSet::new(),
            techniques: Vec::new(),
            instruments: Vec::new(),
            failure_modes: Vec::new(),
            assembly_reproducibility_score: 1.0,
            cad_available: false,
            contact_email: None,
            limitations: Limitations::default(),
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_temperature_range(mut self, min: f64, max: f64) -> Self {
        self.temperature_range = Some(Interval::new(min, max));
        self
    }

    #[must_use]
    pub fn with_pressure_range(mut self, min: f64, max: f64) -> Self {
        self.pressure_range = Some(Interval::new(min, max));
        self
    }

    #[must_use]
    pub fn with_beams(mut self, beams: impl IntoIterator<Item = BeamType>) -> Self {
        self.beam_compatibility = beams.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_modes.push(failure_mode);
        self
    }

    #[must_use]
    pub fn with_reproducibility(mut self, score: f64) -> Self {
        self.assembly_reproducibility_score = score;
        self
    }

    #[must_use]
    pub fn with_techniques(mut self, techniques: &[&str]) -> Self {
        self.techniques = techniques.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_instruments(mut self, instruments: &[&str]) -> Self {
        self.instruments = instruments.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility_affinity = facility.into();
        self
    }

    #[must_use]
    pub fn with_cad(mut self, available: bool) -> Self {
        self.cad_available = available;
        self
    }

    #[must_use]
    pub fn with_pressure_control(mut self, control: bool) -> Self {
        self.pressure_control = control;
        self
    }

    pub fn supports_beam(&self, beam: BeamType) -> bool {
        self.beam_compatibility.contains(&beam)
    }

    /// Case-insensitive technique lookup
    pub fn supports_technique(&self, technique: &str) -> bool {
        self.techniques
            .iter()
            .any(|t| t.eq_ignore_ascii_case(technique))
    }

    /// Case-insensitive instrument lookup
    pub fn qualified_on(&self, instrument: &str) -> bool {
        self.instruments
            .iter()
            .any(|i| i.eq_ignore_ascii_case(instrument))
    }

    /// Maximum operating temperature, if the record states one
    pub fn max_temperature(&self) -> Option<f64> {
        self.temperature_range.map(|r| r.max)
    }

    /// Highest severity among all documented failure modes
    pub fn worst_severity(&self) -> Option<Severity> {
        self.failure_modes.iter().map(|f| f.severity).max()
    }
}
