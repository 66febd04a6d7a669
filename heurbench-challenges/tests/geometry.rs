use heurbench_challenges::geometry::{
    cyclic_length, distance, interval_overlap, mst_length, path_length, Rect,
};

#[test]
fn test_lengths() {
    let square = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
    assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    assert_eq!(path_length(&square, &[0, 1, 2, 3]), 3.0);
    assert_eq!(cyclic_length(&square, &[0, 1, 2, 3]), 4.0);
    assert_eq!(cyclic_length(&square, &[2]), 0.0);
    assert_eq!(mst_length(&square), 3.0);
    assert_eq!(mst_length(&square[..1]), 0.0);
}

#[test]
fn test_rect_overlap_and_containment() {
    let outer = Rect {
        min: (0.0, 0.0),
        max: (4.0, 4.0),
    };
    let inner = Rect {
        min: (1.0, 1.0),
        max: (3.0, 4.0000001),
    };
    assert_eq!(outer.area(), 16.0);
    assert!(outer.contains(&inner, 1e-6));
    assert!(!inner.contains(&outer, 1e-6));
    assert_eq!(outer.overlap_area(&inner), 2.0 * 3.0);
    assert_eq!(interval_overlap(0.0, 1.0, 1.0, 2.0), 0.0);
    assert_eq!(interval_overlap(0.0, 2.0, 1.0, 5.0), 1.0);
}
