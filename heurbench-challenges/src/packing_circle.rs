use crate::{
    geometry::{distance, Point, Rect},
    tokens::{non_blank_lines, parse_f64, parse_usize, Tokens},
    Case, ConstraintViolation, ParseError, ProblemDomain, ProblemInstance, Sense, EPS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Position reserved for items left out of the container.
pub const UNPACKED: Point = (-1.0, -1.0);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PackingObjective {
    /// Number of packed items.
    Count,
    /// Total area of packed items.
    Area,
}

/// Rectangles and squares packed into a circle, scored by count or by area.
#[derive(Debug, Clone, Copy)]
pub struct PackingCircle {
    objective: PackingObjective,
}

impl PackingCircle {
    pub fn count() -> Self {
        Self {
            objective: PackingObjective::Count,
        }
    }

    pub fn area() -> Self {
        Self {
            objective: PackingObjective::Area,
        }
    }
}

impl ProblemDomain for PackingCircle {
    fn name(&self) -> &'static str {
        match self.objective {
            PackingObjective::Count => "packing_circle",
            PackingObjective::Area => "packing_circle_area",
        }
    }

    fn sense(&self) -> Sense {
        Sense::Maximize
    }

    fn signature(&self) -> &'static [&'static str] {
        &["n", "radius", "items", "allow_rotation"]
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn parse(&self, text: &str) -> Result<Vec<Case>, ParseError> {
        Ok(parse_instances(text, self.objective)?
            .into_iter()
            .map(|instance| Box::new(instance) as Case)
            .collect())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub length: f64,
    pub width: f64,
}

impl Item {
    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    /// One `(x, y, theta_degrees)` per item; centre coordinates.
    pub placements: Vec<(f64, f64, f64)>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub radius: f64,
    pub items: Vec<Item>,
    pub allow_rotation: bool,
    pub objective: PackingObjective,
}

impl Instance {
    pub fn evaluate_packing(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        if solution.placements.len() != self.items.len() {
            return Err(ConstraintViolation::malformed(format!(
                "expected {} placements, got {}",
                self.items.len(),
                solution.placements.len()
            )));
        }

        let mut packed: Vec<(usize, Rect)> = Vec::new();
        for (idx, (item, &(x, y, theta))) in self.items.iter().zip(&solution.placements).enumerate()
        {
            if distance((x, y), UNPACKED) <= EPS {
                if theta.abs() > EPS {
                    return Err(ConstraintViolation::OrientationNotAllowed {
                        entity: format!("item {}", idx),
                        detail: format!("unpacked item carries rotation {}", theta),
                    });
                }
                continue;
            }
            let is_zero = theta.abs() <= EPS;
            let is_quarter = (theta - 90.0).abs() <= EPS;
            if !(is_zero || (self.allow_rotation && is_quarter)) {
                return Err(ConstraintViolation::OrientationNotAllowed {
                    entity: format!("item {}", idx),
                    detail: format!(
                        "rotation {} (allowed: {})",
                        theta,
                        if self.allow_rotation { "0 or 90" } else { "0" }
                    ),
                });
            }
            let corners = rotated_corners(item, (x, y), theta);
            if let Some(corner) = corners
                .iter()
                .find(|&&corner| distance(corner, (0.0, 0.0)) > self.radius + EPS)
            {
                return Err(ConstraintViolation::OutOfBounds {
                    entity: format!("item {}", idx),
                    detail: format!(
                        "corner ({}, {}) lies outside the circle of radius {}",
                        corner.0, corner.1, self.radius
                    ),
                });
            }
            packed.push((idx, bounding_box(&corners)));
        }

        for (a, &(first, first_box)) in packed.iter().enumerate() {
            for &(second, second_box) in &packed[a + 1..] {
                let amount = first_box.overlap_area(&second_box);
                if amount > EPS {
                    return Err(ConstraintViolation::Overlap {
                        first,
                        second,
                        amount,
                    });
                }
            }
        }

        Ok(match self.objective {
            PackingObjective::Count => packed.len() as f64,
            PackingObjective::Area => packed.iter().map(|&(idx, _)| self.items[idx].area()).sum(),
        })
    }
}

fn rotated_corners(item: &Item, centre: Point, theta_degrees: f64) -> [Point; 4] {
    let (sin, cos) = theta_degrees.to_radians().sin_cos();
    let (hl, hw) = (item.length / 2.0, item.width / 2.0);
    [(-hl, -hw), (hl, -hw), (hl, hw), (-hl, hw)].map(|(dx, dy)| {
        (
            centre.0 + dx * cos - dy * sin,
            centre.1 + dx * sin + dy * cos,
        )
    })
}

fn bounding_box(corners: &[Point; 4]) -> Rect {
    let mut rect = Rect {
        min: corners[0],
        max: corners[0],
    };
    for &(x, y) in &corners[1..] {
        rect.min = (rect.min.0.min(x), rect.min.1.min(y));
        rect.max = (rect.max.0.max(x), rect.max.1.max(y));
    }
    rect
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.items.len()),
            json!(self.radius),
            json!(self.items),
            json!(self.allow_rotation),
        ]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_packing(&solution)
    }
}

/// Header `n R [allow_rotation]`, then `n` lines `[id] length width`.
pub fn parse_instances(
    text: &str,
    objective: PackingObjective,
) -> Result<Vec<Instance>, ParseError> {
    let lines = non_blank_lines(text);
    let header = lines.first().ok_or_else(|| ParseError::MissingTokens {
        context: "header".to_string(),
        expected: 2,
        found: 0,
    })?;
    let mut tokens = Tokens::new(header);
    let num_items = tokens.next_usize("number of items")?;
    let radius = tokens.next_f64("circle radius")?;
    let allow_rotation = match tokens.peek() {
        Some(flag) => parse_usize(flag, "rotation flag")? != 0,
        None => false,
    };
    if radius <= 0.0 {
        return Err(ParseError::Invalid {
            context: "circle radius".to_string(),
            reason: format!("radius must be positive, got {}", radius),
        });
    }
    if lines.len() - 1 < num_items {
        return Err(ParseError::MissingTokens {
            context: "item lines".to_string(),
            expected: num_items,
            found: lines.len() - 1,
        });
    }

    let items = lines[1..=num_items]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let context = format!("item {}", idx + 1);
            let values: Vec<&str> = line.split_whitespace().collect();
            let (length, width) = match values.as_slice() {
                [length, width] | [_, length, width] => {
                    (parse_f64(length, &context)?, parse_f64(width, &context)?)
                }
                _ => {
                    return Err(ParseError::Invalid {
                        context,
                        reason: format!("expected '[id] length width', got '{}'", line),
                    })
                }
            };
            Ok(Item { length, width })
        })
        .collect::<Result<Vec<Item>, ParseError>>()?;

    Ok(vec![Instance {
        radius,
        items,
        allow_rotation,
        objective,
    }])
}
