use serde::{Deserialize, Serialize};

/// Closed numeric interval `[min, max]`.
///
/// A point requirement is an interval with `min == max`. Construction does not
/// check ordering; catalog and query validation reject malformed intervals at
/// the boundary so the evaluator can assume `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "IntervalRepr")]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

/// Accepted JSON spellings: `50`, `[20, 80]`, `{"min": 20, "max": 80}`
#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalRepr {
    Point(f64),
    Pair([f64; 2]),
    Bounds { min: f64, max: f64 },
}

impl From<IntervalRepr> for Interval {
    fn from(repr: IntervalRepr) -> Self {
        match repr {
            IntervalRepr::Point(v) => Self::point(v),
            IntervalRepr::Pair([min, max]) | IntervalRepr::Bounds { min, max } => {
                Self::new(min, max)
            }
        }
    }
}

impl Interval {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// True when neither endpoint is NaN and `min <= max`
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.min.is_nan() && !self.max.is_nan() && self.min <= self.max
    }

    #[must_use]
    pub fn contains(&self, other: &Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Signed headroom of `requirement` inside `self`.
    ///
    /// `min(requirement.min - self.min, self.max - requirement.max)`; negative
    /// when the requirement sticks out of this interval, by the amount it
    /// overshoots on the worse side.
    #[must_use]
    pub fn headroom(&self, requirement: &Interval) -> f64 {
        (requirement.min - self.min).min(self.max - requirement.max)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_point() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}
