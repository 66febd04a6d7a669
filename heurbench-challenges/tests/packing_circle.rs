use heurbench_challenges::{
    lookup,
    packing_circle::{parse_instances, Instance, Item, PackingObjective, UNPACKED},
    DomainOptions, ParseError, ProblemInstance, ViolationKind,
};
use serde_json::{json, Value};

// radius 2, rotation allowed
const ITEMS: &str = "3 2 1\n1 1 1\n2 2 1\n3 1.5 0.5\n";

fn instance(objective: PackingObjective) -> Instance {
    parse_instances(ITEMS, objective).unwrap().remove(0)
}

fn output(placements: Value) -> Value {
    json!({ "placements": placements })
}

fn verify(placements: Value) -> Result<f64, ViolationKind> {
    instance(PackingObjective::Count)
        .verify(&output(placements))
        .map_err(|e| e.kind())
}

#[test]
fn test_parsed_items() {
    let instance = instance(PackingObjective::Area);
    assert_eq!(instance.radius, 2.0);
    assert!(instance.allow_rotation);
    let sizes: Vec<(f64, f64)> = instance.items.iter().map(|i| (i.length, i.width)).collect();
    assert_eq!(sizes, vec![(1.0, 1.0), (2.0, 1.0), (1.5, 0.5)]);

    let without_ids = parse_instances("2 5\n3 4\n2 2\n", PackingObjective::Count).unwrap();
    assert!(!without_ids[0].allow_rotation);
    assert_eq!(
        without_ids[0].items[0],
        Item {
            length: 3.0,
            width: 4.0
        }
    );
}

#[test]
fn test_count_and_area_objectives() {
    let solution = output(json!([
        [0.0, 0.6, 0.0],
        [0.0, -0.6, 0.0],
        [UNPACKED.0, UNPACKED.1, 0.0]
    ]));
    let count = lookup("packing_circle", &DomainOptions::default()).unwrap();
    let area = lookup("packing_circle_area", &DomainOptions::default()).unwrap();
    let count_case = count.parse(ITEMS).unwrap().remove(0);
    let area_case = area.parse(ITEMS).unwrap().remove(0);
    assert_eq!(count.verify_and_score(count_case.as_ref(), &solution), Ok(2.0));
    assert_eq!(area.verify_and_score(area_case.as_ref(), &solution), Ok(3.0));
}

#[test]
fn test_quarter_rotation() {
    let solution = output(json!([[0.0, 0.6, 0.0], [0.0, -0.6, 0.0], [1.3, 0.0, 90.0]]));
    assert_eq!(instance(PackingObjective::Count).verify(&solution), Ok(3.0));
    assert_eq!(instance(PackingObjective::Area).verify(&solution), Ok(3.75));

    assert_eq!(
        verify(json!([[0.0, 0.6, 0.0], [0.0, -0.6, 0.0], [1.3, 0.0, 45.0]])),
        Err(ViolationKind::Orientation)
    );
    let fixed = parse_instances("1 2 0\n1 1\n", PackingObjective::Count).unwrap();
    let err = fixed[0].verify(&output(json!([[0.0, 0.0, 90.0]]))).unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Orientation);
}

#[test]
fn test_unpacked_items_carry_no_rotation() {
    assert_eq!(
        verify(json!([[-1.0, -1.0, 90.0], [-1.0, -1.0, 0.0], [-1.0, -1.0, 0.0]])),
        Err(ViolationKind::Orientation)
    );
    assert_eq!(
        verify(json!([[-1.0, -1.0, 0.0], [-1.0, -1.0, 0.0], [-1.0, -1.0, 0.0]])),
        Ok(0.0)
    );
}

#[test]
fn test_items_stay_inside_the_circle() {
    assert_eq!(
        verify(json!([[1.8, 0.0, 0.0], [-1.0, -1.0, 0.0], [-1.0, -1.0, 0.0]])),
        Err(ViolationKind::Bounds)
    );
}

#[test]
fn test_bounding_boxes_may_not_overlap() {
    let err = instance(PackingObjective::Count)
        .verify(&output(json!([[0.0, -0.6, 0.0], [0.0, -0.6, 0.0], [-1.0, -1.0, 0.0]])))
        .unwrap_err();
    assert_eq!(err.kind(), ViolationKind::Overlap);
    assert!(err.to_string().starts_with("items 0 and 1"));

    // touching edges are fine
    assert_eq!(
        verify(json!([[0.0, 0.4, 0.0], [0.0, -0.6, 0.0], [-1.0, -1.0, 0.0]])),
        Ok(2.0)
    );
}

#[test]
fn test_one_placement_per_item() {
    assert_eq!(verify(json!([[0.0, 0.0, 0.0]])), Err(ViolationKind::Malformed));
    assert_eq!(verify(json!([[0.0, 0.0]])), Err(ViolationKind::Malformed));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        parse_instances("2 0\n1 1\n1 1\n", PackingObjective::Count),
        Err(ParseError::Invalid { .. })
    ));
    assert!(matches!(
        parse_instances("3 2\n1 1\n", PackingObjective::Count),
        Err(ParseError::MissingTokens { .. })
    ));
    assert!(parse_instances("1 2\n1 2 3 4\n", PackingObjective::Count).is_err());
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(
        parse_instances(ITEMS, PackingObjective::Area).unwrap(),
        parse_instances(ITEMS, PackingObjective::Area).unwrap()
    );
}

#[test]
fn test_item_count_larger_than_text() {
    for header in ["100000000000000 2", "18446744073709551615 2"] {
        assert!(matches!(
            parse_instances(&format!("{}\n1 1\n", header), PackingObjective::Count),
            Err(ParseError::MissingTokens { .. })
        ));
    }
}
