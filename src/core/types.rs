use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for a hardware record in the catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Probe or radiation type a sample environment can be used with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BeamType {
    #[serde(rename = "neutron", alias = "Neutron")]
    Neutron,
    #[serde(rename = "x-ray", alias = "X-ray", alias = "xray", alias = "x_ray")]
    XRay,
    #[serde(rename = "muon", alias = "Muon")]
    Muon,
    #[serde(
        rename = "electrochemical-only",
        alias = "electrochemical",
        alias = "echem"
    )]
    ElectrochemicalOnly,
}

impl BeamType {
    pub const ALL: [BeamType; 4] = [
        Self::Neutron,
        Self::XRay,
        Self::Muon,
        Self::ElectrochemicalOnly,
    ];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Neutron => "neutron",
            Self::XRay => "x-ray",
            Self::Muon => "muon",
            Self::ElectrochemicalOnly => "electrochemical-only",
        }
    }
}

impl std::fmt::Display for BeamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neutron => write!(f, "Neutron"),
            Self::XRay => write!(f, "X-ray"),
            Self::Muon => write!(f, "Muon"),
            Self::ElectrochemicalOnly => write!(f, "Electrochemical only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown beam type '{0}' (expected neutron, x-ray, muon or electrochemical-only)")]
pub struct UnknownBeamType(pub String);

impl FromStr for BeamType {
    type Err = UnknownBeamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "neutron" | "neutrons" => Ok(Self::Neutron),
            "xray" | "xrays" => Ok(Self::XRay),
            "muon" | "muons" => Ok(Self::Muon),
            "electrochemicalonly" | "electrochemical" | "echem" => Ok(Self::ElectrochemicalOnly),
            _ => Err(UnknownBeamType(s.to_string())),
        }
    }
}

/// Severity of a documented failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// How harshly failure-mode severity is penalized during scoring
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTolerance {
    /// Any relevant high-severity failure mode zeroes the score
    Strict,
    /// Proportional deduction per relevant failure mode
    #[default]
    Moderate,
    /// Reduced deduction, reported as a trade-off note
    Lenient,
}

impl std::fmt::Display for ReliabilityTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Moderate => write!(f, "moderate"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// A dimension along which a record is compared to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Beam,
    Temperature,
    Pressure,
    Trl,
}

impl Dimension {
    /// Unit label used when printing margins
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Pressure => "bar",
            Self::Trl => "levels",
            Self::Beam => "",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beam => write!(f, "beam"),
            Self::Temperature => write!(f, "temperature"),
            Self::Pressure => write!(f, "pressure"),
            Self::Trl => write!(f, "trl"),
        }
    }
}

/// Signed headroom along one dimension.
///
/// Positive values are slack before the record's limit, negative values are
/// how far the requirement overshoots it. `Unbounded` marks a dimension that
/// one side leaves unconstrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Margin {
    Finite(f64),
    Unbounded,
}

impl Margin {
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded => None,
        }
    }

    #[must_use]
    pub fn is_violation(self) -> bool {
        matches!(self, Self::Finite(v) if v < 0.0)
    }
}

impl std::fmt::Display for Margin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:+}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl Serialize for Margin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(v) => serializer.serialize_f64(*v),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for Margin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Self::Finite(v)),
            Repr::Text(s) if s == "unbounded" => Ok(Self::Unbounded),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid margin '{s}', expected a number or \"unbounded\""
            ))),
        }
    }
}
