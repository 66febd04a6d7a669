use heurbench_challenges::{
    lookup,
    set_covering::{parse_by_column, parse_by_row, parse_instances, parse_unit_cost_by_row, Instance},
    ConstraintViolation, DomainOptions, ParseError, ProblemInstance, ViolationKind,
};
use serde_json::json;

const TWO_BY_TWO: &str = "2 2\n1 1\n1 1\n1 2\n";

#[test]
fn test_coverage_scenario() {
    let domain = lookup("set_covering", &DomainOptions::default()).unwrap();
    let cases = domain.parse(TWO_BY_TWO).unwrap();
    let instance = cases[0].as_ref();

    let err = domain
        .verify_and_score(instance, &json!({"selected_columns": [1]}))
        .unwrap_err();
    assert_eq!(err, ConstraintViolation::Uncovered { row: 2 });
    assert_eq!(err.kind(), ViolationKind::Coverage);

    assert_eq!(
        domain.verify_and_score(instance, &json!({"selected_columns": [1, 2]})),
        Ok(-2.0)
    );
}

#[test]
fn test_sparse_by_row() {
    let instance = parse_by_row(TWO_BY_TWO).unwrap();
    assert_eq!(
        instance,
        Instance {
            num_rows: 2,
            num_columns: 2,
            costs: vec![1.0, 1.0],
            row_cover: vec![vec![1], vec![2]],
        }
    );

    // costs and row records wrap freely
    let wrapped = parse_instances("2 3\n1 2\n3\n2 1 2\n1\n3\n").unwrap();
    assert_eq!(wrapped[0].costs, vec![1.0, 2.0, 3.0]);
    assert_eq!(wrapped[0].row_cover, vec![vec![1, 2], vec![3]]);
}

#[test]
fn test_sparse_by_column() {
    let text = "3 2\n1 2 1 2\n4 2 2 3\n";
    let instance = parse_by_column(text).unwrap();
    assert_eq!(instance.costs, vec![1.0, 4.0]);
    assert_eq!(instance.row_cover, vec![vec![1], vec![1, 2], vec![2]]);
    assert_eq!(parse_instances(text).unwrap(), vec![instance.clone()]);
    assert_eq!(instance.verify(&json!({"selected_columns": [2, 1]})), Ok(5.0));
}

#[test]
fn test_unit_cost_by_row() {
    let text = "2 3\n2 1 2\n1 3\n";
    assert!(parse_by_column(text).is_err());
    assert!(parse_by_row(text).is_err());
    let instance = parse_unit_cost_by_row(text).unwrap();
    assert_eq!(instance.costs, vec![1.0; 3]);
    assert_eq!(parse_instances(text).unwrap(), vec![instance]);
}

#[test]
fn test_unrecognised_layout() {
    assert!(matches!(
        parse_instances("2 2\n1 x\n"),
        Err(ParseError::UnknownFormat { .. })
    ));
    assert!(parse_instances("2 2\n1 5\n1 1\n").is_err());
}

#[test]
fn test_column_ids_are_validated() {
    let instance = parse_by_row(TWO_BY_TWO).unwrap();
    let err = instance.verify(&json!({"selected_columns": [1, 3]})).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Bounds);
    let err = instance.verify(&json!({"selected_columns": [0]})).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Bounds);
    let err = instance.verify(&json!({"selected_columns": [1, 1, 2]})).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Malformed);
    let err = instance.verify(&json!({"columns": [1, 2]})).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Malformed);
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(parse_instances(TWO_BY_TWO).unwrap(), parse_instances(TWO_BY_TWO).unwrap());
}

#[test]
fn test_declared_sizes_larger_than_text() {
    assert!(matches!(
        parse_by_column("100000000000000 1\n1 1 1\n"),
        Err(ParseError::Invalid { .. })
    ));
    assert!(matches!(
        parse_by_row("1 100000000000000\n1 1\n"),
        Err(ParseError::MissingTokens { .. })
    ));
    assert!(matches!(
        parse_unit_cost_by_row("1 100000000000000\n1 1\n"),
        Err(ParseError::Invalid { .. })
    ));
    assert!(matches!(
        parse_unit_cost_by_row("100000000000000 1\n1 1\n"),
        Err(ParseError::MissingTokens { .. })
    ));
    assert!(parse_instances("18446744073709551615 18446744073709551615\n1 1 1\n").is_err());
}
