//! # operando-match
//!
//! A library for matching experiment requirements against a catalog of
//! operando sample-environment hardware (electrochemical test cells used at
//! neutron, X-ray and muon facilities).
//!
//! Choosing a cell for an operando battery experiment means balancing hard
//! constraints (does it work with the beam, does it reach the temperature)
//! against softer ones (how mature is it, how often does it fail, how
//! reproducible is the assembly). `operando-match` makes that trade explicit.
//!
//! ## Features
//!
//! - **Boundary validation**: catalogs and queries are validated once, reporting every problem
//! - **Hard compatibility**: beam, temperature, pressure, TRL and capability filters
//! - **Signed margins**: how much headroom a record has, or how far it misses
//! - **Fitness ranking**: configurable weighted score with failure-mode penalties
//! - **Trade-off notes**: reliability, representativeness and reproducibility caveats
//! - **Deterministic ordering**: parallel evaluation, content-based sort
//!
//! ## Example
//!
//! ```rust
//! use operando_match::{evaluate, validate_catalog, HardwareRecord, RequirementQuery};
//! use operando_match::core::types::BeamType;
//!
//! let catalog = validate_catalog(vec![
//!     HardwareRecord::new("C1", "Coin cell", 6)
//!         .with_temperature_range(20.0, 80.0)
//!         .with_beams([BeamType::XRay]),
//! ])
//! .unwrap();
//!
//! let query = RequirementQuery::builder()
//!     .beam(BeamType::XRay)
//!     .temperature(50.0)
//!     .min_trl(5)
//!     .build()
//!     .unwrap();
//!
//! let results = evaluate(&catalog, &query);
//! assert!(results[0].compatible);
//! assert!(results[0].score > 0.5);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog validation, loading, filtering and the technique matrix
//! - [`core`]: Core data types for hardware records and requirement queries
//! - [`matching`]: Compatibility evaluator, fitness scorer and ranking engine
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::catalog::store::{validate_catalog, CatalogError, CatalogModel, CatalogValidationError};
pub use crate::core::hardware::{FailureMode, HardwareRecord};
pub use crate::core::interval::Interval;
pub use crate::core::query::{QueryError, RequirementQuery};
pub use crate::core::types::*;
pub use crate::matching::engine::{evaluate, MatchResult, MatchingConfig, MatchingEngine};
pub use crate::matching::scoring::{ScoringConfig, ScoringWeights};
