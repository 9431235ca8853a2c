use serde::{Deserialize, Serialize};

use crate::core::hardware::HardwareRecord;
use crate::core::query::RequirementQuery;
use crate::core::types::{Dimension, Margin, ReliabilityTolerance, Severity};
use crate::matching::evaluator::Evaluation;

/// Configurable weights for the components of the fitness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight for beam match
    pub beam: f64,
    /// Weight for TRL headroom
    pub trl: f64,
    /// Weight for temperature headroom
    pub temperature: f64,
    /// Weight for pressure headroom
    pub pressure: f64,
    /// Weight for assembly reproducibility
    pub reproducibility: f64,
    /// Weight for reliability (one minus the failure-mode penalty)
    pub reliability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            beam: 0.30,            // 30%
            trl: 0.25,             // 25%
            temperature: 0.15,     // 15%
            pressure: 0.10,        // 10%
            reproducibility: 0.10, // 10%
            reliability: 0.10,     // 10%
        }
    }
}

impl ScoringWeights {
    /// Normalize weights to sum to 1.0
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total = self.beam
            + self.trl
            + self.temperature
            + self.pressure
            + self.reproducibility
            + self.reliability;

        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }

        Self {
            beam: self.beam / total,
            trl: self.trl / total,
            temperature: self.temperature / total,
            pressure: self.pressure / total,
            reproducibility: self.reproducibility / total,
            reliability: self.reliability / total,
        }
    }
}

/// Base reliability deduction per relevant failure mode, by severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPenalties {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityPenalties {
    fn default() -> Self {
        Self {
            low: 0.05,
            medium: 0.15,
            high: 0.35,
        }
    }
}

impl SeverityPenalties {
    #[must_use]
    pub fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

/// Every tunable number used by the fitness scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,

    /// Score for a dimension one side leaves unconstrained
    pub neutral_score: f64,

    /// Headroom (°C) at which the temperature score reaches 0.75
    pub temperature_scale: f64,

    /// Headroom (bar) at which the pressure score reaches 0.75
    pub pressure_scale: f64,

    /// TRL levels above the floor at which the TRL score reaches 0.75
    pub trl_scale: f64,

    pub severity_penalties: SeverityPenalties,

    pub strict_multiplier: f64,
    pub moderate_multiplier: f64,
    pub lenient_multiplier: f64,

    /// Deduction per TRL level below `min_trl` for leniently admitted records
    pub trl_gap_penalty: f64,

    /// Reproducibility below this emits a trade-off note
    pub reproducibility_note_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            neutral_score: 0.75,
            temperature_scale: 20.0,
            pressure_scale: 1.0,
            trl_scale: 2.0,
            severity_penalties: SeverityPenalties::default(),
            strict_multiplier: 1.5,
            moderate_multiplier: 1.0,
            lenient_multiplier: 0.4,
            trl_gap_penalty: 0.10,
            reproducibility_note_threshold: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Load a scoring configuration from JSON; omitted fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn multiplier(&self, tolerance: ReliabilityTolerance) -> f64 {
        match tolerance {
            ReliabilityTolerance::Strict => self.strict_multiplier,
            ReliabilityTolerance::Moderate => self.moderate_multiplier,
            ReliabilityTolerance::Lenient => self.lenient_multiplier,
        }
    }

    fn scale(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Temperature => self.temperature_scale,
            Dimension::Pressure => self.pressure_scale,
            Dimension::Trl => self.trl_scale,
            Dimension::Beam => 1.0,
        }
    }
}

/// Component scores and final fitness of one compatible record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessScore {
    pub beam: f64,
    pub trl: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub reproducibility: f64,

    /// Failure-mode deduction in [0, 1] after the tolerance multiplier
    pub reliability_penalty: f64,

    /// Deduction applied for leniently admitted low-TRL records
    pub trl_gap_penalty: f64,

    /// Weighted composite in [0, 1]
    pub composite: f64,

    /// Advisory trade-offs, never a cause for exclusion
    pub notes: Vec<String>,
}

/// Map a margin to [0, 1]: 0 → 0.5, saturating towards 1 with headroom.
///
/// `scale` is the headroom at which the score reaches 0.75. Negative margins
/// (only seen for leniently admitted TRL) fall towards 0.
#[must_use]
pub fn normalize_margin(margin: f64, scale: f64) -> f64 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    0.5 + 0.5 * margin / (margin.abs() + scale)
}

/// Score a record that passed the compatibility evaluator.
#[must_use]
pub fn score_record(
    record: &HardwareRecord,
    query: &RequirementQuery,
    evaluation: &Evaluation,
    config: &ScoringConfig,
) -> FitnessScore {
    let weights = config.weights.normalized();
    let mut notes = Vec::new();

    let dimension_score = |dimension: Dimension| -> f64 {
        match evaluation.margins.get(&dimension) {
            Some(Margin::Finite(m)) => normalize_margin(*m, config.scale(dimension)),
            Some(Margin::Unbounded) | None => config.neutral_score,
        }
    };

    let beam = if query.required_beam().is_some() {
        1.0
    } else {
        config.neutral_score
    };
    let trl = dimension_score(Dimension::Trl);
    let temperature = dimension_score(Dimension::Temperature);
    let pressure = dimension_score(Dimension::Pressure);
    let reproducibility = record.assembly_reproducibility_score;

    let (reliability_penalty, forced_zero) = reliability_penalty(record, query, config, &mut notes);

    let trl_gap_penalty = config.trl_gap_penalty * f64::from(evaluation.trl_gap);
    if evaluation.trl_gap > 0 {
        notes.push(format!(
            "TRL {} is below the requested minimum {}; admitted with a {:.2} score penalty",
            record.trl,
            query.effective_min_trl(),
            trl_gap_penalty
        ));
    }

    let weighted = weights.beam * beam
        + weights.trl * trl
        + weights.temperature * temperature
        + weights.pressure * pressure
        + weights.reproducibility * reproducibility
        + weights.reliability * (1.0 - reliability_penalty);

    let composite = if forced_zero {
        0.0
    } else {
        (weighted - trl_gap_penalty).clamp(0.0, 1.0)
    };

    notes.extend(trade_off_notes(record, config));

    FitnessScore {
        beam,
        trl,
        temperature,
        pressure,
        reproducibility,
        reliability_penalty,
        trl_gap_penalty,
        composite,
        notes,
    }
}

/// Failure-mode deduction for the query's beam, and whether strict mode zeroes the score
fn reliability_penalty(
    record: &HardwareRecord,
    query: &RequirementQuery,
    config: &ScoringConfig,
    notes: &mut Vec<String>,
) -> (f64, bool) {
    let tolerance = query.reliability_tolerance();
    let relevant: Vec<_> = record
        .failure_modes
        .iter()
        .filter(|f| f.is_relevant_to(query.required_beam()))
        .collect();

    if relevant.is_empty() {
        return (0.0, false);
    }

    let base: f64 = relevant
        .iter()
        .map(|f| config.severity_penalties.for_severity(f.severity))
        .sum();
    let penalty = (base * config.multiplier(tolerance)).clamp(0.0, 1.0);

    let strict_high = tolerance == ReliabilityTolerance::Strict
        && relevant.iter().any(|f| f.severity == Severity::High);

    if strict_high {
        let modes: Vec<&str> = relevant
            .iter()
            .filter(|f| f.severity == Severity::High)
            .map(|f| f.mode.as_str())
            .collect();
        notes.push(format!(
            "strict reliability: score set to 0 because of high-severity failure mode(s) {}",
            modes.join(", ")
        ));
    } else if tolerance == ReliabilityTolerance::Lenient {
        notes.push(format!(
            "lenient reliability: {} relevant failure mode(s) deducted {:.2} from reliability",
            relevant.len(),
            penalty
        ));
    }

    (penalty, strict_high)
}

/// Advisory notes that apply regardless of the score
fn trade_off_notes(record: &HardwareRecord, config: &ScoringConfig) -> Vec<String> {
    let mut notes = Vec::new();

    for failure in &record.failure_modes {
        if failure.severity >= Severity::Medium {
            let mut note = format!(
                "TRL {} but documented {} severity '{}' failure mode",
                record.trl, failure.severity, failure.mode
            );
            if !failure.trigger_condition.is_empty() {
                note.push_str(&format!(" (trigger: {})", failure.trigger_condition));
            }
            notes.push(note);
        }
    }

    if record.assembly_reproducibility_score < config.reproducibility_note_threshold {
        notes.push(format!(
            "low assembly reproducibility ({:.2}); expect run-to-run variation",
            record.assembly_reproducibility_score
        ));
    }

    for limitation in &record.limitations.representativeness {
        notes.push(format!("representativeness: {limitation}"));
    }

    notes
}
