use heurbench_challenges::{
    lookup,
    multidimensional_knapsack::{parse_instances, Instance, Solution},
    DomainOptions, ParseError, ProblemInstance, ViolationKind,
};
use serde_json::json;

const SCENARIO: &str = "1\n2 1 0\n3 5\n2 3\n4\n";

#[test]
fn test_capacity_scenario() {
    let domain = lookup("multidimensional_knapsack", &DomainOptions::default()).unwrap();
    let cases = domain.parse(SCENARIO).unwrap();
    let instance = cases[0].as_ref();

    let err = domain
        .verify_and_score(instance, &json!({"x": [1, 1]}))
        .unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Capacity);

    assert_eq!(domain.verify_and_score(instance, &json!({"x": [1, 0]})), Ok(3.0));
    assert_eq!(instance.verify(&json!({"x": [true, false]})), Ok(3.0));
    assert_eq!(instance.verify(&json!({"x": [0, 0]})), Ok(0.0));
}

#[test]
fn test_parsed_layout() {
    let instances = parse_instances(SCENARIO).unwrap();
    assert_eq!(
        instances,
        vec![Instance {
            num_items: 2,
            num_constraints: 1,
            profits: vec![3.0, 5.0],
            weights: vec![vec![2.0, 3.0]],
            capacities: vec![4.0],
            optimum: None,
        }]
    );
    assert_eq!(instances[0].reference_objective(), None);
}

#[test]
fn test_multiple_problems_with_optimum() {
    let text = "2\n2 1 8\n3 5\n2 3\n5\n  1 1 0\n7\n1\n1\n";
    let instances = parse_instances(text).unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].reference_objective(), Some(8.0));
    let profit = instances[0]
        .evaluate_total_profit(&Solution {
            x: vec![true, true],
        })
        .unwrap();
    assert_eq!(profit, 8.0);
    assert_eq!(instances[1].profits, vec![7.0]);
    assert_eq!(instances[1].optimum, None);
}

#[test]
fn test_decision_vector_is_validated() {
    let instance = &parse_instances(SCENARIO).unwrap()[0];
    for x in [json!([1, 0, 0]), json!([2, 0]), json!("10")] {
        let err = instance.verify(&json!({ "x": x })).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Malformed);
    }
}

#[test]
fn test_truncated_text() {
    assert!(matches!(
        parse_instances("1\n2 1 0\n3 5\n2"),
        Err(ParseError::MissingTokens {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn test_capacity_tolerance() {
    let instance = &parse_instances("1\n2 1 0\n3 5\n2 2.0000005\n4\n").unwrap()[0];
    assert_eq!(instance.verify(&json!({"x": [1, 1]})), Ok(8.0));
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(parse_instances(SCENARIO).unwrap(), parse_instances(SCENARIO).unwrap());
}

#[test]
fn test_counts_larger_than_text() {
    assert!(matches!(
        parse_instances("1\n100000000000000 1 0\n1 2 3\n"),
        Err(ParseError::MissingTokens { .. })
    ));
    // no items, so only the capacity tokens bound the constraint count
    assert!(matches!(
        parse_instances("1\n0 100000000000000 0\n4\n"),
        Err(ParseError::MissingTokens {
            expected: 100000000000000,
            found: 1,
            ..
        })
    ));
}
