//! End-to-end tests for catalog validation, evaluation and ranking
//!
//! These exercise the public library API the way a caller would: build a
//! catalog, build a query, evaluate, and check the ranked results.

use operando_match::core::types::{BeamType, Dimension, Margin, ReliabilityTolerance, Severity};
use operando_match::matching::evaluator::Exclusion;
use operando_match::{
    evaluate, validate_catalog, CatalogModel, FailureMode, HardwareRecord, MatchResult,
    MatchingEngine, RequirementQuery,
};

fn scenario_catalog() -> CatalogModel {
    validate_catalog(vec![HardwareRecord::new("C1", "Coin cell", 6)
        .with_temperature_range(20.0, 80.0)
        .with_beams([BeamType::XRay])])
    .unwrap()
}

fn mixed_catalog() -> CatalogModel {
    validate_catalog(vec![
        HardwareRecord::new("coin", "Coin", 6)
            .with_temperature_range(20.0, 80.0)
            .with_beams([BeamType::XRay])
            .with_reproducibility(0.9),
        HardwareRecord::new("pouch", "Pouch", 7)
            .with_temperature_range(-10.0, 60.0)
            .with_beams([BeamType::XRay, BeamType::Neutron])
            .with_failure_mode(FailureMode::new("swelling", Severity::High)),
        HardwareRecord::new("capillary", "Capillary", 4)
            .with_temperature_range(-20.0, 150.0)
            .with_beams([BeamType::XRay])
            .with_reproducibility(0.4),
        HardwareRecord::new("muon", "Muon cell", 5)
            .with_beams([BeamType::Muon]),
        HardwareRecord::new("furnace", "Furnace", 3)
            .with_temperature_range(25.0, 450.0)
            .with_pressure_range(1.0, 50.0)
            .with_beams([BeamType::Neutron, BeamType::XRay]),
    ])
    .unwrap()
}

fn queries() -> Vec<RequirementQuery> {
    vec![
        RequirementQuery::default(),
        RequirementQuery::builder()
            .beam(BeamType::XRay)
            .temperature(50.0)
            .min_trl(5)
            .build()
            .unwrap(),
        RequirementQuery::builder()
            .beam(BeamType::Neutron)
            .temperature_range(30.0, 55.0)
            .build()
            .unwrap(),
        RequirementQuery::builder()
            .beam(BeamType::XRay)
            .min_trl(6)
            .allow_lower_trl(true)
            .tolerance(ReliabilityTolerance::Lenient)
            .build()
            .unwrap(),
        RequirementQuery::builder()
            .temperature(200.0)
            .pressure(10.0)
            .build()
            .unwrap(),
    ]
}

fn score_of(results: &[MatchResult], id: &str) -> f64 {
    results
        .iter()
        .find(|r| r.record_id.as_str() == id)
        .map(|r| r.score)
        .unwrap()
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_evaluation_is_deterministic() {
    let catalog = mixed_catalog();
    for query in queries() {
        let first = evaluate(&catalog, &query);
        for _ in 0..5 {
            assert_eq!(evaluate(&catalog, &query), first);
        }
    }
}

#[test]
fn test_every_record_gets_a_result() {
    let catalog = mixed_catalog();
    for query in queries() {
        let results = evaluate(&catalog, &query);
        assert_eq!(results.len(), catalog.len());

        let mut ids: Vec<&str> = results.iter().map(|r| r.record_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }
}

#[test]
fn test_results_respect_ordering_contract() {
    let catalog = mixed_catalog();
    for query in queries() {
        let results = evaluate(&catalog, &query);
        for pair in results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.compatible >= b.compatible);
            if a.compatible == b.compatible {
                assert!(a.score >= b.score);
                if a.score == b.score {
                    assert!(a.trl >= b.trl);
                    if a.trl == b.trl {
                        assert!(a.record_id < b.record_id);
                    }
                }
            }
        }
        for r in &results {
            if r.compatible {
                assert!(r.exclusion_reasons.is_empty());
                assert!((0.0..=1.0).contains(&r.score));
            } else {
                assert!(!r.exclusion_reasons.is_empty());
                assert_eq!(r.score, 0.0);
                assert!(r.trade_off_notes.is_empty());
            }
        }
    }
}

#[test]
fn test_raising_min_trl_never_helps() {
    let catalog = mixed_catalog();

    for allow_lower in [false, true] {
        let base = RequirementQuery::builder()
            .beam(BeamType::XRay)
            .allow_lower_trl(allow_lower)
            .build()
            .unwrap();
        let mut previous: Option<Vec<MatchResult>> = None;
        for min_trl in 1..=9 {
            let query = base.with_min_trl(min_trl).unwrap();
            let results = evaluate(&catalog, &query);

            if let Some(prev) = &previous {
                for before in prev {
                    let after = results
                        .iter()
                        .find(|r| r.record_id == before.record_id)
                        .unwrap();
                    assert!(
                        !(after.compatible && !before.compatible),
                        "{} became compatible at min_trl {min_trl}",
                        after.record_id
                    );
                    assert!(
                        after.score <= before.score + 1e-12,
                        "{} score rose at min_trl {min_trl}",
                        after.record_id
                    );
                }
            }
            previous = Some(results);
        }
    }
}

#[test]
fn test_bounded_range_scores_at_least_unconstrained() {
    let catalog = validate_catalog(vec![
        HardwareRecord::new("open", "Unconstrained", 6).with_beams([BeamType::XRay]),
        HardwareRecord::new("wide", "Wide range", 6)
            .with_temperature_range(-100.0, 200.0)
            .with_beams([BeamType::XRay]),
    ])
    .unwrap();
    let query = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .temperature(50.0)
        .build()
        .unwrap();

    let results = evaluate(&catalog, &query);
    assert!(score_of(&results, "wide") >= score_of(&results, "open"));
    assert_eq!(results[0].record_id.as_str(), "wide");

    let open = results.iter().find(|r| r.record_id.as_str() == "open").unwrap();
    assert_eq!(
        open.dimension_margins[&Dimension::Temperature],
        Margin::Unbounded
    );
}

#[test]
fn test_revalidation_is_idempotent() {
    let catalog = mixed_catalog();
    let revalidated = validate_catalog(catalog.records().to_vec()).unwrap();
    assert_eq!(revalidated, catalog);

    let reparsed = CatalogModel::from_json(&catalog.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, catalog);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_compatible_coin_cell() {
    let catalog = scenario_catalog();
    let query = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .temperature(50.0)
        .min_trl(5)
        .build()
        .unwrap();

    let results = evaluate(&catalog, &query);
    assert_eq!(results.len(), 1);

    let c1 = &results[0];
    assert_eq!(c1.record_id.as_str(), "C1");
    assert!(c1.compatible);
    assert!(c1.score > 0.5);
    assert!(c1.exclusion_reasons.is_empty());
    assert_eq!(
        c1.dimension_margins[&Dimension::Temperature],
        Margin::Finite(30.0)
    );
    assert_eq!(c1.dimension_margins[&Dimension::Trl], Margin::Finite(1.0));
}

#[test]
fn test_scenario_temperature_out_of_range() {
    let catalog = scenario_catalog();
    let query = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .temperature(100.0)
        .min_trl(5)
        .build()
        .unwrap();

    let results = evaluate(&catalog, &query);
    let c1 = &results[0];
    assert!(!c1.compatible);
    assert_eq!(c1.score, 0.0);

    let temperature = c1
        .exclusion_reasons
        .iter()
        .find_map(|e| match e {
            Exclusion::OutOfRange {
                dimension: Dimension::Temperature,
                margin,
                ..
            } => Some(*margin),
            _ => None,
        })
        .unwrap();
    assert_eq!(temperature, -20.0);
    assert_eq!(
        c1.dimension_margins[&Dimension::Temperature],
        Margin::Finite(-20.0)
    );
}

#[test]
fn test_scenario_low_trl_strict_and_lenient() {
    let catalog = validate_catalog(vec![HardwareRecord::new("T3", "Prototype", 3)
        .with_temperature_range(0.0, 100.0)
        .with_beams([BeamType::Neutron])])
    .unwrap();

    let strict = RequirementQuery::builder().min_trl(5).build().unwrap();
    let excluded = &evaluate(&catalog, &strict)[0];
    assert!(!excluded.compatible);
    assert!(excluded
        .exclusion_reasons
        .contains(&Exclusion::TrlBelowMinimum { trl: 3, min_trl: 5 }));

    let lenient = RequirementQuery::builder()
        .min_trl(5)
        .allow_lower_trl(true)
        .build()
        .unwrap();
    let admitted = &evaluate(&catalog, &lenient)[0];
    assert!(admitted.compatible);
    assert!(admitted.exclusion_reasons.is_empty());
    assert!(admitted
        .trade_off_notes
        .iter()
        .any(|n| n.contains("TRL 3 is below the requested minimum 5")));

    // Same record at the floor scores higher than when admitted under it
    let at_floor = RequirementQuery::builder().min_trl(3).build().unwrap();
    assert!(evaluate(&catalog, &at_floor)[0].score > admitted.score);
}

#[test]
fn test_scenario_strict_high_severity_scores_zero() {
    let catalog = validate_catalog(vec![
        HardwareRecord::new("risky", "Risky cell", 8)
            .with_beams([BeamType::XRay])
            .with_failure_mode(
                FailureMode::new("window_rupture", Severity::High)
                    .with_affected_beams([BeamType::XRay]),
            ),
        HardwareRecord::new("safe", "Safe cell", 4).with_beams([BeamType::XRay]),
    ])
    .unwrap();

    let query = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .tolerance(ReliabilityTolerance::Strict)
        .build()
        .unwrap();
    let results = evaluate(&catalog, &query);

    // Still compatible, but ranked last among compatible records
    let risky = results.iter().find(|r| r.record_id.as_str() == "risky").unwrap();
    assert!(risky.compatible);
    assert_eq!(risky.score, 0.0);
    assert!(risky
        .trade_off_notes
        .iter()
        .any(|n| n.contains("window_rupture")));
    assert_eq!(results[0].record_id.as_str(), "safe");

    // Moderate tolerance keeps a positive score
    let moderate = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .build()
        .unwrap();
    assert!(score_of(&evaluate(&catalog, &moderate), "risky") > 0.0);
}

// ============================================================================
// Engine behaviour
// ============================================================================

#[test]
fn test_cached_engine_is_consistent_across_queries() {
    let catalog = mixed_catalog();
    let engine = MatchingEngine::new(&catalog).cached();

    let queries = queries();
    for query in &queries {
        assert_eq!(engine.evaluate(query), evaluate(&catalog, query));
    }
    assert_eq!(engine.cache_len(), queries.len() * catalog.len());

    for query in &queries {
        assert_eq!(engine.evaluate(query), evaluate(&catalog, query));
    }
    assert_eq!(engine.cache_len(), queries.len() * catalog.len());
}

#[test]
fn test_embedded_catalog_answers_xray_query() {
    let catalog = CatalogModel::load_embedded().unwrap();
    let query = RequirementQuery::builder()
        .beam(BeamType::XRay)
        .temperature(50.0)
        .min_trl(5)
        .build()
        .unwrap();

    let results = evaluate(&catalog, &query);
    assert_eq!(results.len(), catalog.len());
    assert!(results[0].compatible);
    assert!(results
        .iter()
        .filter(|r| !r.compatible)
        .all(|r| !r.exclusion_reasons.is_empty()));
}
