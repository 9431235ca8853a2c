use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::hardware::HardwareRecord;
use crate::core::interval::Interval;
use crate::core::query::RequirementQuery;
use crate::core::types::{BeamType, Dimension, Margin};

/// Why a record was hard-excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exclusion {
    /// The record does not list the required beam
    BeamUnsupported { required: BeamType },

    /// The requirement is not contained in the record's operating range
    OutOfRange {
        dimension: Dimension,
        required: Interval,
        supported: Interval,
        margin: f64,
    },

    /// The record's TRL is below the requested floor
    TrlBelowMinimum { trl: u8, min_trl: u8 },

    /// None of the requested techniques is supported
    TechniqueUnsupported { requested: Vec<String> },

    /// The record is qualified on none of the requested instruments
    InstrumentUnavailable { requested: Vec<String> },

    CadUnavailable,

    NoPressureControl,
}

impl Exclusion {
    /// Dimension this exclusion concerns, for the ones that have a margin or tag
    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::BeamUnsupported { .. } => Some(Dimension::Beam),
            Self::OutOfRange { dimension, .. } => Some(*dimension),
            Self::TrlBelowMinimum { .. } => Some(Dimension::Trl),
            Self::NoPressureControl => Some(Dimension::Pressure),
            _ => None,
        }
    }
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeamUnsupported { required } => {
                write!(f, "beam: {required} is not supported")
            }
            Self::OutOfRange {
                dimension,
                required,
                supported,
                margin,
            } => write!(
                f,
                "{dimension}: required {required} {unit} is outside supported {supported} {unit} (margin {margin:+} {unit})",
                unit = dimension.unit()
            ),
            Self::TrlBelowMinimum { trl, min_trl } => {
                write!(f, "trl: {trl} is below the required minimum {min_trl}")
            }
            Self::TechniqueUnsupported { requested } => {
                write!(f, "techniques: none of [{}] supported", requested.join(", "))
            }
            Self::InstrumentUnavailable { requested } => {
                write!(f, "instruments: not qualified on any of [{}]", requested.join(", "))
            }
            Self::CadUnavailable => write!(f, "cad: no CAD model (digital twin) available"),
            Self::NoPressureControl => write!(f, "pressure: no pressure control"),
        }
    }
}

/// Outcome of checking one record against one query
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Signed headroom for temperature, pressure and TRL
    pub margins: BTreeMap<Dimension, Margin>,

    /// Every violated constraint, in a fixed dimension order
    pub exclusions: Vec<Exclusion>,

    /// Levels below `min_trl` admitted because the query allows lower TRL
    pub trl_gap: u8,
}

impl Evaluation {
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.exclusions.is_empty()
    }
}

/// Decide hard compatibility of `record` against `query`.
///
/// Every dimension is checked even after a violation, so the caller sees the
/// complete mismatch. Margins are recorded for violated dimensions too.
#[must_use]
pub fn evaluate_record(record: &HardwareRecord, query: &RequirementQuery) -> Evaluation {
    let mut margins = BTreeMap::new();
    let mut exclusions = Vec::new();

    if let Some(beam) = query.required_beam() {
        if !record.supports_beam(beam) {
            exclusions.push(Exclusion::BeamUnsupported { required: beam });
        }
    }

    let ranged = [
        (
            Dimension::Temperature,
            query.target_temperature(),
            record.temperature_range,
        ),
        (
            Dimension::Pressure,
            query.target_pressure(),
            record.pressure_range,
        ),
    ];
    for (dimension, required, supported) in ranged {
        let margin = range_margin(required.as_ref(), supported.as_ref());
        if let (Margin::Finite(m), Some(required), Some(supported)) = (margin, required, supported)
        {
            if !supported.contains(&required) {
                exclusions.push(Exclusion::OutOfRange {
                    dimension,
                    required,
                    supported,
                    margin: m,
                });
            }
        }
        margins.insert(dimension, margin);
    }

    let min_trl = query.effective_min_trl();
    let trl_margin = i16::from(record.trl) - i16::from(min_trl);
    margins.insert(Dimension::Trl, Margin::Finite(f64::from(trl_margin)));

    let mut trl_gap = 0;
    if record.trl < min_trl {
        if query.allows_lower_trl() {
            trl_gap = min_trl - record.trl;
        } else {
            exclusions.push(Exclusion::TrlBelowMinimum {
                trl: record.trl,
                min_trl,
            });
        }
    }

    if !query.techniques().is_empty()
        && !query.techniques().iter().any(|t| record.supports_technique(t))
    {
        exclusions.push(Exclusion::TechniqueUnsupported {
            requested: query.techniques().to_vec(),
        });
    }

    if !query.instruments().is_empty()
        && !query.instruments().iter().any(|i| record.qualified_on(i))
    {
        exclusions.push(Exclusion::InstrumentUnavailable {
            requested: query.instruments().to_vec(),
        });
    }

    if query.requires_cad() && !record.cad_available {
        exclusions.push(Exclusion::CadUnavailable);
    }

    if query.requires_pressure_control() && !record.pressure_control {
        exclusions.push(Exclusion::NoPressureControl);
    }

    Evaluation {
        margins,
        exclusions,
        trl_gap,
    }
}

/// Headroom of `required` inside `supported`; unbounded if either side is absent
fn range_margin(required: Option<&Interval>, supported: Option<&Interval>) -> Margin {
    match (required, supported) {
        (Some(required), Some(supported)) => {
            let headroom = supported.headroom(required);
            // Only a fully open record range ([-inf, inf]) gets here
            if headroom.is_infinite() {
                Margin::Unbounded
            } else {
                Margin::Finite(headroom)
            }
        }
        _ => Margin::Unbounded,
    }
}
