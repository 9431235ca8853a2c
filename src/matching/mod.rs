//! Compatibility evaluation, fitness scoring and ranking.
//!
//! - [`evaluate_record`](evaluator::evaluate_record): hard compatibility of one record,
//!   with signed per-dimension margins and every exclusion reason
//! - [`score_record`](scoring::score_record): weighted fitness of a compatible record
//!   plus advisory trade-off notes
//! - [`MatchingEngine`](engine::MatchingEngine): runs both over a catalog and ranks
//!
//! ## Scoring
//!
//! Finite margins map to `[0, 1]` through `0.5 + 0.5 * m / (|m| + scale)`, so a
//! requirement sitting exactly on a limit scores 0.5 and extra headroom
//! saturates. Unbounded dimensions score a neutral 0.75. The composite is a
//! weighted average of:
//!
//! - **Beam**: required beam supported (weighted highest)
//! - **TRL**: headroom above the requested floor
//! - **Temperature / pressure**: headroom inside the operating range
//! - **Reproducibility**: the record's documented assembly reproducibility
//! - **Reliability**: one minus the failure-mode penalty for the query's tolerance
//!
//! ## Example
//!
//! ```rust,no_run
//! use operando_match::{CatalogModel, MatchingEngine, RequirementQuery};
//! use operando_match::core::types::BeamType;
//!
//! let catalog = CatalogModel::load_embedded().unwrap();
//! let query = RequirementQuery::builder()
//!     .beam(BeamType::XRay)
//!     .temperature(50.0)
//!     .min_trl(5)
//!     .build()
//!     .unwrap();
//!
//! let engine = MatchingEngine::new(&catalog);
//! for m in engine.evaluate(&query) {
//!     println!("{}: {:.1}% compatible={}", m.record_id, m.score_percentage(), m.compatible);
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod evaluator;
pub mod scoring;
