use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::catalog::store::CatalogModel;
use crate::core::hardware::HardwareRecord;
use crate::core::query::RequirementQuery;
use crate::core::types::{Dimension, Margin, RecordId};
use crate::matching::cache::ResultCache;
use crate::matching::evaluator::{evaluate_record, Exclusion};
use crate::matching::scoring::{score_record, ScoringConfig};

/// Result of evaluating one record against a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub record_id: RecordId,

    /// Record TRL, kept for tie-breaking and presentation
    pub trl: u8,

    /// Hard-compatibility verdict
    pub compatible: bool,

    /// Fitness in [0, 1]; 0.0 for incompatible records
    pub score: f64,

    /// Signed headroom per dimension
    pub dimension_margins: BTreeMap<Dimension, Margin>,

    /// Every violated constraint (empty when compatible)
    pub exclusion_reasons: Vec<Exclusion>,

    /// Advisory trade-offs (empty when incompatible)
    pub trade_off_notes: Vec<String>,
}

impl MatchResult {
    /// Evaluate and, if compatible, score `record` against `query`
    pub fn new(record: &HardwareRecord, query: &RequirementQuery, config: &ScoringConfig) -> Self {
        let evaluation = evaluate_record(record, query);

        let (score, trade_off_notes) = if evaluation.is_compatible() {
            let fitness = score_record(record, query, &evaluation, config);
            (fitness.composite, fitness.notes)
        } else {
            (0.0, Vec::new())
        };

        tracing::debug!(
            record = %record.id,
            compatible = evaluation.is_compatible(),
            score,
            exclusions = evaluation.exclusions.len(),
            "evaluated record"
        );

        Self {
            record_id: record.id.clone(),
            trl: record.trl,
            compatible: evaluation.is_compatible(),
            score,
            dimension_margins: evaluation.margins,
            exclusion_reasons: evaluation.exclusions,
            trade_off_notes,
        }
    }

    /// Score as a percentage, for display
    pub fn score_percentage(&self) -> f64 {
        self.score * 100.0
    }
}

/// Result ordering: compatible first, score descending, TRL descending, id ascending
pub fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.compatible
        .cmp(&a.compatible)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.trl.cmp(&a.trl))
        .then_with(|| a.record_id.cmp(&b.record_id))
}

/// Configuration for the matching engine
#[derive(Debug, Clone, Default)]
pub struct MatchingConfig {
    /// Weights and thresholds used by the fitness scorer
    pub scoring: ScoringConfig,
}

/// The main matching engine
pub struct MatchingEngine<'a> {
    catalog: &'a CatalogModel,
    /// Configuration including scoring weights and thresholds
    config: MatchingConfig,
    /// Results keyed by (record id, query fingerprint), when enabled
    cache: Option<ResultCache>,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    pub fn new(catalog: &'a CatalogModel) -> Self {
        Self {
            catalog,
            config: MatchingConfig::default(),
            cache: None,
        }
    }

    /// Create a new matching engine with custom configuration
    pub fn with_config(catalog: &'a CatalogModel, config: MatchingConfig) -> Self {
        Self {
            catalog,
            config,
            cache: None,
        }
    }

    /// Enable the result cache for repeated queries against this catalog
    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache = Some(ResultCache::new());
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Number of cached results (0 when caching is disabled)
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, ResultCache::len)
    }

    /// Evaluate every record against `query` and rank the results.
    ///
    /// Returns exactly one result per catalog record: compatible records
    /// first by descending score, then incompatible ones with their
    /// exclusion reasons. Ties break on TRL (descending) then id (ascending).
    pub fn evaluate(&self, query: &RequirementQuery) -> Vec<MatchResult> {
        let fingerprint = self.cache.as_ref().map(|_| query.fingerprint());

        let mut results: Vec<MatchResult> = self
            .catalog
            .records()
            .par_iter()
            .map(|record| match (&self.cache, &fingerprint) {
                (Some(cache), Some(fp)) => cache.get_or_compute((record.id.clone(), fp.clone()), || {
                    MatchResult::new(record, query, &self.config.scoring)
                }),
                _ => MatchResult::new(record, query, &self.config.scoring),
            })
            .collect();

        // Sort on content, never on completion order
        results.sort_by(rank_order);

        tracing::debug!(
            records = results.len(),
            compatible = results.iter().filter(|r| r.compatible).count(),
            "evaluated catalog"
        );

        results
    }

    /// Top `limit` compatible results
    pub fn find_matches(&self, query: &RequirementQuery, limit: usize) -> Vec<MatchResult> {
        self.evaluate(query)
            .into_iter()
            .filter(|r| r.compatible)
            .take(limit)
            .collect()
    }

    /// Find the single best compatible record
    pub fn find_best_match(&self, query: &RequirementQuery) -> Option<MatchResult> {
        self.find_matches(query, 1).into_iter().next()
    }
}

/// Evaluate `query` against `catalog` with the default scoring configuration
pub fn evaluate(catalog: &CatalogModel, query: &RequirementQuery) -> Vec<MatchResult> {
    MatchingEngine::new(catalog).evaluate(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::validate_catalog;
    use crate::core::types::BeamType;

    fn make_test_catalog() -> CatalogModel {
        validate_catalog(vec![
            HardwareRecord::new("C1", "Coin", 6)
                .with_temperature_range(20.0, 80.0)
                .with_beams([BeamType::XRay]),
            HardwareRecord::new("N1", "Neutron can", 8)
                .with_temperature_range(-20.0, 150.0)
                .with_beams([BeamType::Neutron]),
            HardwareRecord::new("X2", "Capillary", 4)
                .with_temperature_range(0.0, 300.0)
                .with_beams([BeamType::XRay]),
        ])
        .unwrap()
    }

    #[test]
    fn test_compatible_first_then_excluded() {
        let catalog = make_test_catalog();
        let query = RequirementQuery::builder()
            .beam(BeamType::XRay)
            .temperature(50.0)
            .build()
            .unwrap();

        let results = MatchingEngine::new(&catalog).evaluate(&query);
        assert_eq!(results.len(), 3);
        assert!(results[0].compatible && results[1].compatible);
        assert!(!results[2].compatible);
        assert_eq!(results[2].record_id, RecordId::new("N1"));
        assert_eq!(results[2].score, 0.0);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_ties_break_on_trl_then_id() {
        let catalog = validate_catalog(vec![
            HardwareRecord::new("b", "B", 5),
            HardwareRecord::new("a", "A", 5),
            HardwareRecord::new("c", "C", 5),
        ])
        .unwrap();
        let query = RequirementQuery::default();

        let ids: Vec<String> = evaluate(&catalog, &query)
            .into_iter()
            .map(|r| r.record_id.0)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_order_uses_trl_before_id() {
        let base = MatchResult {
            record_id: RecordId::new("a"),
            trl: 4,
            compatible: true,
            score: 0.7,
            dimension_margins: BTreeMap::new(),
            exclusion_reasons: Vec::new(),
            trade_off_notes: Vec::new(),
        };
        let higher_trl = MatchResult {
            record_id: RecordId::new("z"),
            trl: 7,
            ..base.clone()
        };
        assert_eq!(rank_order(&higher_trl, &base), Ordering::Less);
    }

    #[test]
    fn test_cached_engine_matches_uncached() {
        let catalog = make_test_catalog();
        let query = RequirementQuery::builder()
            .beam(BeamType::XRay)
            .temperature(60.0)
            .build()
            .unwrap();

        let plain = MatchingEngine::new(&catalog).evaluate(&query);
        let engine = MatchingEngine::new(&catalog).cached();
        assert_eq!(engine.evaluate(&query), plain);
        assert_eq!(engine.cache_len(), 3);
        assert_eq!(engine.evaluate(&query), plain);
        assert_eq!(engine.cache_len(), 3);
    }

    #[test]
    fn test_find_best_match() {
        let catalog = make_test_catalog();
        let query = RequirementQuery::builder()
            .beam(BeamType::Neutron)
            .build()
            .unwrap();

        let best = MatchingEngine::new(&catalog).find_best_match(&query).unwrap();
        assert_eq!(best.record_id, RecordId::new("N1"));
    }

    #[test]
    fn test_no_matches_is_not_an_error() {
        let catalog = make_test_catalog();
        let query = RequirementQuery::builder()
            .beam(BeamType::Muon)
            .build()
            .unwrap();

        let engine = MatchingEngine::new(&catalog);
        assert!(engine.find_matches(&query, 5).is_empty());
        let all = engine.evaluate(&query);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|r| !r.exclusion_reasons.is_empty()));
    }
}
