use heurbench_challenges::{domain_names, lookup, DomainOptions, Sense};

#[test]
fn test_registry() {
    let names = domain_names();
    assert_eq!(names.len(), 9);
    for name in names {
        let domain = lookup(name, &DomainOptions::default()).unwrap();
        assert_eq!(domain.name(), name);
        assert!(!domain.signature().is_empty());
        assert!(domain.timeout().as_secs() > 0);
    }
    assert!(lookup("graph_colouring", &DomainOptions::default()).is_err());
}

#[test]
fn test_senses() {
    let sense = |name: &str| lookup(name, &DomainOptions::default()).unwrap().sense();
    for name in ["aircraft_landing", "set_covering", "travelling_salesman", "period_routing"] {
        assert_eq!(sense(name), Sense::Minimize, "{}", name);
    }
    for name in [
        "container_loading",
        "euclidean_steiner",
        "multidimensional_knapsack",
        "packing_circle",
        "packing_circle_area",
    ] {
        assert_eq!(sense(name), Sense::Maximize, "{}", name);
    }
}

#[test]
fn test_score_is_higher_is_better() {
    assert_eq!(Sense::Minimize.score(4.0), -4.0);
    assert_eq!(Sense::Maximize.score(4.0), 4.0);
    assert!(Sense::Minimize.score(3.0) > Sense::Minimize.score(4.0));
}

#[test]
fn test_normalize() {
    for sense in [Sense::Minimize, Sense::Maximize] {
        for optimum in [0.0, 0.5, 7.0, 700.0] {
            assert_eq!(sense.normalize(optimum, optimum), 1.0, "{} {}", sense, optimum);
        }
    }
    assert_eq!(Sense::Minimize.normalize(8.0, 4.0), 0.5);
    assert_eq!(Sense::Maximize.normalize(2.0, 4.0), 0.5);
    // zero optimum falls back to the same shifted ratio for both senses
    assert_eq!(Sense::Minimize.normalize(3.0, 0.0), 0.25);
    assert_eq!(Sense::Maximize.normalize(3.0, 0.0), 0.25);
    assert_eq!(Sense::Maximize.normalize(0.0, 3.0), 0.0);
}

#[test]
fn test_sense_display() {
    assert_eq!(Sense::Minimize.to_string(), "minimize");
    assert_eq!(Sense::Maximize.to_string(), "maximize");
}
