pub type Point = (f64, f64);

pub fn distance(a: Point, b: Point) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Length of the closed tour visiting `order` and returning to its first node.
pub fn cyclic_length(points: &[Point], order: &[usize]) -> f64 {
    if order.len() < 2 {
        return 0.0;
    }
    path_length(points, order) + distance(points[order[order.len() - 1]], points[order[0]])
}

pub fn path_length(points: &[Point], order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|w| distance(points[w[0]], points[w[1]]))
        .sum()
}

/// Total edge length of a Euclidean minimum spanning tree (dense Prim).
pub fn mst_length(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    best[0] = 0.0;
    let mut total = 0.0;
    for _ in 0..n {
        let mut next = usize::MAX;
        for v in 0..n {
            if !in_tree[v] && (next == usize::MAX || best[v] < best[next]) {
                next = v;
            }
        }
        in_tree[next] = true;
        total += best[next];
        for v in 0..n {
            if !in_tree[v] {
                let d = distance(points[next], points[v]);
                if d < best[v] {
                    best[v] = d;
                }
            }
        }
    }
    total
}

/// Length of the intersection of `[a0, a1]` and `[b0, b1]`, zero when disjoint.
pub fn interval_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

/// Axis-aligned rectangle given by its lower and upper corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn area(&self) -> f64 {
        (self.max.0 - self.min.0) * (self.max.1 - self.min.1)
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        interval_overlap(self.min.0, self.max.0, other.min.0, other.max.0)
            * interval_overlap(self.min.1, self.max.1, other.min.1, other.max.1)
    }

    /// Whether `other` lies inside `self`, allowing `tolerance` slack on every side.
    pub fn contains(&self, other: &Rect, tolerance: f64) -> bool {
        other.min.0 >= self.min.0 - tolerance
            && other.min.1 >= self.min.1 - tolerance
            && other.max.0 <= self.max.0 + tolerance
            && other.max.1 <= self.max.1 + tolerance
    }
}
