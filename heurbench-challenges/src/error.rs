use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{context}: expected {expected} token(s), found {found}")]
    MissingTokens {
        context: String,
        expected: usize,
        found: usize,
    },
    #[error("{context}: cannot read '{token}'")]
    InvalidToken { context: String, token: String },
    #[error("{context}: {reason}")]
    Invalid { context: String, reason: String },
    #[error("unrecognised instance format: {reason}")]
    UnknownFormat { reason: String },
}

/// Coarse category of a [`ConstraintViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Malformed,
    Bounds,
    Orientation,
    Capacity,
    Support,
    Overlap,
    Separation,
    Coverage,
    Tour,
    Schedule,
    Infeasible,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolation {
    #[error("malformed solution: {reason}")]
    Malformed { reason: String },
    #[error("{entity} is out of bounds: {detail}")]
    OutOfBounds { entity: String, detail: String },
    #[error("{entity} uses a disallowed orientation: {detail}")]
    OrientationNotAllowed { entity: String, detail: String },
    #[error("{entity} exceeds its capacity: {used} > {capacity}")]
    CapacityExceeded {
        entity: String,
        used: f64,
        capacity: f64,
    },
    #[error("plane {plane} lands at {time}, outside [{earliest}, {latest}]")]
    TimeWindow {
        plane: usize,
        time: f64,
        earliest: f64,
        latest: f64,
    },
    #[error("planes {first} and {second} on runway {runway} are {gap} apart, {required} required")]
    Separation {
        runway: usize,
        first: usize,
        second: usize,
        gap: f64,
        required: f64,
    },
    #[error("box {item} is not resting on the floor or on any box")]
    MissingSupport { item: usize },
    #[error("box {item} rests on more than one box: {candidates:?}")]
    AmbiguousSupport { item: usize, candidates: Vec<usize> },
    #[error("box {item} presses {load} onto box {supporter}, which bears at most {limit}")]
    LoadBearingExceeded {
        item: usize,
        supporter: usize,
        load: f64,
        limit: f64,
    },
    #[error("items {first} and {second} overlap by {amount}")]
    Overlap {
        first: usize,
        second: usize,
        amount: f64,
    },
    #[error("row {row} is not covered by any selected column")]
    Uncovered { row: usize },
    #[error("tour visits {actual} node(s), expected {expected}")]
    TourLength { expected: usize, actual: usize },
    #[error("node {node} is visited more than once")]
    DuplicateNode { node: usize },
    #[error("node {node} does not exist (instance has {num_nodes})")]
    InvalidNode { node: usize, num_nodes: usize },
    #[error("tour {tour} on day {day}: {detail}")]
    DepotViolation {
        day: usize,
        tour: usize,
        detail: String,
    },
    #[error("customer {customer}: {detail}")]
    ScheduleMismatch { customer: usize, detail: String },
    #[error("customer {customer} is scheduled on day {day} but not visited")]
    MissedVisit { day: usize, customer: usize },
    #[error("customer {customer} is visited on day {day} without being scheduled")]
    UnscheduledVisit { day: usize, customer: usize },
    #[error("augmented tree length {augmented} exceeds terminal tree length {baseline}")]
    NotImproving { augmented: f64, baseline: f64 },
}

impl ConstraintViolation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ConstraintViolation::Malformed { .. } => ViolationKind::Malformed,
            ConstraintViolation::OutOfBounds { .. } => ViolationKind::Bounds,
            ConstraintViolation::OrientationNotAllowed { .. } => ViolationKind::Orientation,
            ConstraintViolation::CapacityExceeded { .. }
            | ConstraintViolation::LoadBearingExceeded { .. } => ViolationKind::Capacity,
            ConstraintViolation::TimeWindow { .. } | ConstraintViolation::Separation { .. } => {
                ViolationKind::Separation
            }
            ConstraintViolation::MissingSupport { .. }
            | ConstraintViolation::AmbiguousSupport { .. } => ViolationKind::Support,
            ConstraintViolation::Overlap { .. } => ViolationKind::Overlap,
            ConstraintViolation::Uncovered { .. } => ViolationKind::Coverage,
            ConstraintViolation::TourLength { .. }
            | ConstraintViolation::DuplicateNode { .. }
            | ConstraintViolation::InvalidNode { .. }
            | ConstraintViolation::DepotViolation { .. } => ViolationKind::Tour,
            ConstraintViolation::ScheduleMismatch { .. }
            | ConstraintViolation::MissedVisit { .. }
            | ConstraintViolation::UnscheduledVisit { .. } => ViolationKind::Schedule,
            ConstraintViolation::NotImproving { .. } => ViolationKind::Infeasible,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ConstraintViolation::Malformed {
            reason: reason.into(),
        }
    }
}
