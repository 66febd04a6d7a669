use crate::{
    geometry::{interval_overlap, Rect},
    tokens::Tokens,
    ConstraintViolation, ParseError, ProblemInstance, Sense, EPS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

impl_problem_domain! {
    ContainerLoading {
        name: "container_loading",
        sense: Sense::Maximize,
        signature: ["container", "box_types"],
        timeout_secs: 60,
    }
}

const AXES: [&str; 3] = ["length", "width", "height"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn dimensions(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoxType {
    pub id: usize,
    /// Length, width, height.
    pub dimensions: [f64; 3],
    /// Whether the matching dimension may point upwards.
    pub vertical_allowed: [bool; 3],
    pub count: usize,
    pub weight: f64,
    /// Load bearing ability per unit of top-face area, for each vertical dimension.
    pub load_bearing: [f64; 3],
}

impl BoxType {
    pub fn volume(&self) -> f64 {
        self.dimensions.iter().product()
    }

    /// Extents along x, y, z when dimension `orientation` points up.
    pub fn oriented(&self, orientation: usize, rotated: bool) -> [f64; 3] {
        let [l, w, h] = self.dimensions;
        let (a, b, up) = match orientation {
            0 => (w, h, l),
            1 => (l, h, w),
            _ => (l, w, h),
        };
        if rotated {
            [b, a, up]
        } else {
            [a, b, up]
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Placement {
    /// 1-based box type id.
    pub box_type: usize,
    /// Which dimension points up: 0 length, 1 width, 2 height.
    pub orientation: usize,
    #[serde(default)]
    pub rotated: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    pub placements: Vec<Placement>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub problem_id: usize,
    pub container: Container,
    pub box_types: Vec<BoxType>,
}

#[derive(Debug, Clone, Copy)]
struct PlacedBox {
    min: [f64; 3],
    max: [f64; 3],
    weight: f64,
    load_bearing: f64,
}

impl PlacedBox {
    fn footprint(&self) -> Rect {
        Rect {
            min: (self.min[0], self.min[1]),
            max: (self.max[0], self.max[1]),
        }
    }

    fn overlap_volume(&self, other: &PlacedBox) -> f64 {
        (0..3)
            .map(|axis| {
                interval_overlap(self.min[axis], self.max[axis], other.min[axis], other.max[axis])
            })
            .product()
    }
}

impl Instance {
    pub fn evaluate_volume_utilisation(
        &self,
        solution: &Solution,
    ) -> Result<f64, ConstraintViolation> {
        let placed = self.place_boxes(solution)?;

        let mut used = vec![0usize; self.box_types.len()];
        for placement in &solution.placements {
            used[placement.box_type - 1] += 1;
        }
        for (box_type, &count) in self.box_types.iter().zip(&used) {
            if count > box_type.count {
                return Err(ConstraintViolation::CapacityExceeded {
                    entity: format!("box type {}", box_type.id),
                    used: count as f64,
                    capacity: box_type.count as f64,
                });
            }
        }

        let supporters = find_supporters(&placed)?;
        check_overlaps(&placed, &supporters)?;
        check_load_bearing(&placed, &supporters)?;

        let packed_volume = solution
            .placements
            .iter()
            .map(|p| self.box_types[p.box_type - 1].volume())
            .sum::<f64>();
        Ok(packed_volume / self.container.volume())
    }

    fn place_boxes(&self, solution: &Solution) -> Result<Vec<PlacedBox>, ConstraintViolation> {
        let bounds = self.container.dimensions();
        let mut placed = Vec::with_capacity(solution.placements.len());
        for (idx, placement) in solution.placements.iter().enumerate() {
            if placement.box_type == 0 || placement.box_type > self.box_types.len() {
                return Err(ConstraintViolation::malformed(format!(
                    "box {} has unknown type {}",
                    idx, placement.box_type
                )));
            }
            if placement.orientation > 2 {
                return Err(ConstraintViolation::malformed(format!(
                    "box {} has orientation {}, expected 0, 1 or 2",
                    idx, placement.orientation
                )));
            }
            let box_type = &self.box_types[placement.box_type - 1];
            if !box_type.vertical_allowed[placement.orientation] {
                return Err(ConstraintViolation::OrientationNotAllowed {
                    entity: format!("box {}", idx),
                    detail: format!(
                        "type {} cannot stand on its {}",
                        box_type.id, AXES[placement.orientation]
                    ),
                });
            }
            let extents = box_type.oriented(placement.orientation, placement.rotated);
            let min = [placement.x, placement.y, placement.z];
            let max = [min[0] + extents[0], min[1] + extents[1], min[2] + extents[2]];
            for axis in 0..3 {
                if min[axis] < -EPS || max[axis] > bounds[axis] + EPS {
                    return Err(ConstraintViolation::OutOfBounds {
                        entity: format!("box {}", idx),
                        detail: format!(
                            "spans [{}, {}] along the container {} of {}",
                            min[axis], max[axis], AXES[axis], bounds[axis]
                        ),
                    });
                }
            }
            placed.push(PlacedBox {
                min,
                max,
                weight: box_type.weight,
                load_bearing: box_type.load_bearing[placement.orientation],
            });
        }
        Ok(placed)
    }
}

/// For every box above the floor, the single box whose top face carries it.
fn find_supporters(placed: &[PlacedBox]) -> Result<Vec<Option<usize>>, ConstraintViolation> {
    let mut supporters = Vec::with_capacity(placed.len());
    for (idx, item) in placed.iter().enumerate() {
        if item.min[2] <= EPS {
            supporters.push(None);
            continue;
        }
        let footprint = item.footprint();
        let candidates = placed
            .iter()
            .enumerate()
            .filter(|&(other, below)| {
                other != idx
                    && (below.max[2] - item.min[2]).abs() <= EPS
                    && below.footprint().contains(&footprint, EPS)
            })
            .map(|(other, _)| other)
            .collect::<Vec<usize>>();
        match candidates.len() {
            0 => return Err(ConstraintViolation::MissingSupport { item: idx }),
            1 => supporters.push(Some(candidates[0])),
            _ => {
                return Err(ConstraintViolation::AmbiguousSupport {
                    item: idx,
                    candidates,
                })
            }
        }
    }
    Ok(supporters)
}

fn check_overlaps(
    placed: &[PlacedBox],
    supporters: &[Option<usize>],
) -> Result<(), ConstraintViolation> {
    for i in 0..placed.len() {
        for j in (i + 1)..placed.len() {
            if supporters[i] == Some(j) || supporters[j] == Some(i) {
                continue;
            }
            let amount = placed[i].overlap_volume(&placed[j]);
            if amount > EPS {
                return Err(ConstraintViolation::Overlap {
                    first: i,
                    second: j,
                    amount,
                });
            }
        }
    }
    Ok(())
}

/// Pushes loads down the support chains, topmost boxes first.
fn check_load_bearing(
    placed: &[PlacedBox],
    supporters: &[Option<usize>],
) -> Result<(), ConstraintViolation> {
    let mut order = (0..placed.len()).collect::<Vec<usize>>();
    order.sort_by(|&a, &b| placed[b].min[2].total_cmp(&placed[a].min[2]));

    let mut carried = vec![0.0; placed.len()];
    for idx in order {
        let load = placed[idx].weight + carried[idx];
        if let Some(supporter) = supporters[idx] {
            let limit = placed[idx].footprint().area() * placed[supporter].load_bearing;
            if load > limit + EPS {
                return Err(ConstraintViolation::LoadBearingExceeded {
                    item: idx,
                    supporter,
                    load,
                    limit,
                });
            }
            carried[supporter] += load;
        }
    }
    Ok(())
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.container), json!(self.box_types)]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_volume_utilisation(&solution)
    }
}

/// `P`, then per problem `id seed`, `L W H`, `n` and `n` twelve-value box type records:
/// `id length flag width flag height flag count weight lb_length lb_width lb_height`.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let mut tokens = Tokens::new(text);
    let num_problems = tokens.next_usize("number of problems")?;
    (0..num_problems)
        .map(|k| parse_problem(&mut tokens, k + 1))
        .collect()
}

fn parse_problem(tokens: &mut Tokens, problem: usize) -> Result<Instance, ParseError> {
    let context = format!("problem {}", problem);
    let problem_id = tokens.next_usize(&format!("{} id", context))?;
    let _seed = tokens.next_token(&format!("{} seed", context))?;
    let dims = tokens.take_f64s(3, &format!("{} container", context))?;
    if dims.iter().any(|&d| d <= 0.0) {
        return Err(ParseError::Invalid {
            context: format!("{} container", context),
            reason: "container dimensions must be positive".to_string(),
        });
    }
    let num_types = tokens.next_usize(&format!("{} box type count", context))?;
    let mut box_types = Vec::new();
    for t in 0..num_types {
        let context = format!("{} box type {}", context, t + 1);
        let id = tokens.next_usize(&context)?;
        let mut dimensions = [0.0; 3];
        let mut vertical_allowed = [false; 3];
        for axis in 0..3 {
            dimensions[axis] = tokens.next_f64(&context)?;
            vertical_allowed[axis] = tokens.next_usize(&context)? != 0;
        }
        let count = tokens.next_usize(&context)?;
        let weight = tokens.next_f64(&context)?;
        let load_bearing = tokens.take_f64s(3, &context)?;
        if dimensions.iter().any(|&d| d <= 0.0) {
            return Err(ParseError::Invalid {
                context,
                reason: "box dimensions must be positive".to_string(),
            });
        }
        box_types.push(BoxType {
            id,
            dimensions,
            vertical_allowed,
            count,
            weight,
            load_bearing: [load_bearing[0], load_bearing[1], load_bearing[2]],
        });
    }
    Ok(Instance {
        problem_id,
        container: Container {
            length: dims[0],
            width: dims[1],
            height: dims[2],
        },
        box_types,
    })
}
