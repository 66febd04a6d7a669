use heurbench_structs::{
    config::{BenchmarkConfig, EvaluationMode},
    core::{EvaluationReport, ScoreRecord},
};
use serde_json::json;

#[test]
fn test_config_defaults() {
    let config = BenchmarkConfig::from_json("{}").unwrap();
    assert_eq!(config.mode, EvaluationMode::AllOrNothing);
    assert!(config.domains.is_empty());

    let domain = config.domain("travelling_salesman");
    assert_eq!(domain.timeout_secs, None);
    assert_eq!(domain.optimal_for("tsp20.txt", 0), None);
    assert!(!domain.is_dev_case("tsp20.txt", 0));
}

#[test]
fn test_config_domain_tables() {
    let config = BenchmarkConfig::from_json(
        &json!({
            "mode": "partial_credit",
            "domains": {
                "aircraft_landing": {
                    "timeout_secs": 10,
                    "runway_counts": [1, 2],
                    "optimal": { "airland1.txt": [700.0, null] },
                    "dev": { "airland1.txt": [1] }
                }
            }
        })
        .to_string(),
    )
    .unwrap();
    assert_eq!(config.mode, EvaluationMode::PartialCredit);

    let domain = config.domain("aircraft_landing");
    assert_eq!(domain.timeout_secs(), Some(&10));
    assert_eq!(domain.runway_counts, Some(vec![1, 2]));
    assert_eq!(domain.optimal_for("airland1.txt", 0), Some(700.0));
    assert_eq!(domain.optimal_for("airland1.txt", 1), None);
    assert_eq!(domain.optimal_for("airland1.txt", 5), None);
    assert!(domain.is_dev_case("airland1.txt", 1));
    assert!(!domain.is_dev_case("airland1.txt", 0));
}

#[test]
fn test_rejects_unknown_mode() {
    assert!(BenchmarkConfig::from_json(r#"{"mode": "best_effort"}"#).is_err());
}

#[test]
fn test_score_record_states() {
    let ok = ScoreRecord::verified(0, 4.0, -4.0, Some(4.0));
    assert!(ok.is_verified());
    assert_eq!(ok.score(), Some(&-4.0));
    assert_eq!(ok.objective(), Some(&4.0));

    let failed = ScoreRecord::failed(1, "tour visits 3 node(s), expected 4".to_string(), None);
    assert!(!failed.is_verified());
    assert_eq!(failed.objective(), None);
    assert_eq!(failed.score(), None);
    assert_eq!(failed.reference(), None);
    assert!(failed.error().unwrap().contains("expected 4"));
}

#[test]
fn test_failure_report_drops_diagnostics() {
    let report = EvaluationReport::failure(
        "set_covering",
        EvaluationMode::AllOrNothing,
        "row 2 is not covered by any selected column".to_string(),
    );
    assert_eq!(report.score, None);
    assert_eq!(report.num_cases(), 0);

    let round_trip: EvaluationReport =
        serde_json::from_value(serde_json::to_value(&report).unwrap()).unwrap();
    assert_eq!(round_trip, report);
}
