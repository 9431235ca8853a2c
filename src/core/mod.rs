//! Core data types for sample-environment matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`HardwareRecord`](hardware::HardwareRecord): one sample-environment cell with its
//!   operating ranges, beam compatibility, TRL and failure modes
//! - [`RequirementQuery`](query::RequirementQuery): an experiment's validated requirements
//! - [`Interval`](interval::Interval): closed `[min, max]` ranges, points have `min == max`
//! - [`BeamType`](types::BeamType), [`Severity`](types::Severity),
//!   [`ReliabilityTolerance`](types::ReliabilityTolerance), [`Margin`](types::Margin):
//!   shared enumerations
//!
//! ## Units
//!
//! | Dimension   | Unit | Absent on a record means |
//! |-------------|------|--------------------------|
//! | temperature | °C   | not limited              |
//! | pressure    | bar  | not limited              |
//! | TRL         | 1-9  | (always present)         |

pub mod hardware;
pub mod interval;
pub mod query;
pub mod technique;
pub mod types;
