use heurbench_challenges::{
    geometry::cyclic_length,
    lookup,
    travelling_salesman::{parse_instances, parse_tsplib, Instance, Solution},
    DomainOptions, ParseError, ProblemInstance, ViolationKind,
};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use serde_json::json;

const SQUARE: &str = "0 0 0 1 1 1 1 0\n";

#[test]
fn test_square_tour_scores_negative_length() {
    let domain = lookup("travelling_salesman", &DomainOptions::default()).unwrap();
    let cases = domain.parse(SQUARE).unwrap();
    assert_eq!(cases.len(), 1);
    let output = json!({"tour": [0, 1, 2, 3]});
    assert_eq!(domain.verify_and_score(cases[0].as_ref(), &output), Ok(-4.0));
    assert_eq!(cases[0].verify(&output), Ok(4.0));
}

#[test]
fn test_tour_must_be_a_permutation() {
    let instance = &parse_instances(SQUARE).unwrap()[0];
    for tour in [json!([0, 1, 1, 3]), json!([0, 1, 2]), json!([0, 1, 2, 4])] {
        let err = instance.verify(&json!({ "tour": tour })).unwrap_err();
        assert_eq!(err.kind(), ViolationKind::Tour, "{}", err);
    }
    let err = instance.verify(&json!({"tour": [0, 1, -2, 3]})).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Malformed);
    let err = instance.verify(&json!([0, 1, 2, 3])).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Malformed);
}

#[test]
fn test_reference_tour() {
    let instances = parse_instances("0 0 3 0 0 4 output 1 3 2 1\n0 0 3 0 0 4 output 1 2 3\n").unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].reference_tour, Some(vec![0, 2, 1]));
    assert_eq!(instances[1].reference_tour, Some(vec![0, 1, 2]));
    assert_eq!(instances[0].reference_objective(), Some(12.0));

    let reference = Solution {
        tour: instances[0].reference_tour.clone().unwrap(),
    };
    assert_eq!(instances[0].evaluate_tour_length(&reference), Ok(12.0));

    assert!(matches!(
        parse_instances("0 0 3 0 0 4 output 1 1 2"),
        Err(ParseError::UnknownFormat { .. })
    ));
}

#[test]
fn test_tsplib_layout() {
    let text = "NAME : square\nTYPE : TSP\nDIMENSION : 4\nEDGE_WEIGHT_TYPE : EUC_2D\n\
                NODE_COORD_SECTION\n1 0 0\n2 0 1\n3 1 1\n4 1 0\nEOF\n";
    let instances = parse_tsplib(text).unwrap();
    assert_eq!(
        instances,
        vec![Instance {
            nodes: vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            reference_tour: None,
        }]
    );
    assert_eq!(parse_instances(text).unwrap(), instances);

    let truncated = text.replace("4 1 0\n", "");
    assert!(matches!(
        parse_tsplib(&truncated),
        Err(ParseError::MissingTokens {
            expected: 4,
            found: 3,
            ..
        })
    ));
}

#[test]
fn test_parse_is_idempotent() {
    let text = "0 0 3 0 0 4 output 1 3 2 1\n\n  5 5   6 6 7 7\n";
    assert_eq!(parse_instances(text).unwrap(), parse_instances(text).unwrap());
    assert_eq!(parse_instances(text).unwrap().len(), 2);
}

#[test]
fn test_rejects_odd_coordinates() {
    assert!(parse_instances("0 0 1").is_err());
    assert!(parse_instances("").is_err());
    assert!(parse_instances("0 0 1 nan").is_err());
}

#[test]
fn test_random_permutations() {
    let mut rng = SmallRng::seed_from_u64(0);
    for _ in 0..10 {
        let n = rng.gen_range(3..40);
        let nodes: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        let instance = Instance {
            nodes: nodes.clone(),
            reference_tour: None,
        };
        let mut tour: Vec<usize> = (0..n).collect();
        tour.shuffle(&mut rng);
        let objective = instance.verify(&json!({ "tour": tour })).unwrap();
        assert_eq!(objective, cyclic_length(&nodes, &tour));
    }
}
