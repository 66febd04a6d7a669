use crate::{
    geometry::{mst_length, Point},
    tokens::Tokens,
    ConstraintViolation, ParseError, ProblemInstance, Sense, EPS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

impl_problem_domain! {
    EuclideanSteiner {
        name: "euclidean_steiner",
        sense: Sense::Maximize,
        signature: ["terminals"],
        timeout_secs: 60,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    #[serde(default)]
    pub steiner_points: Vec<Point>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub terminals: Vec<Point>,
}

impl Instance {
    pub fn terminal_tree_length(&self) -> f64 {
        mst_length(&self.terminals)
    }

    /// Relative tree-length reduction obtained by adding the candidate's Steiner points.
    pub fn evaluate_reduction(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        if let Some(idx) = solution
            .steiner_points
            .iter()
            .position(|p| !p.0.is_finite() || !p.1.is_finite())
        {
            return Err(ConstraintViolation::OutOfBounds {
                entity: format!("steiner point {}", idx),
                detail: "coordinates must be finite".to_string(),
            });
        }
        let baseline = self.terminal_tree_length();
        let augmented_points = self
            .terminals
            .iter()
            .chain(&solution.steiner_points)
            .cloned()
            .collect::<Vec<Point>>();
        let augmented = mst_length(&augmented_points);
        if augmented > baseline + EPS {
            return Err(ConstraintViolation::NotImproving {
                augmented,
                baseline,
            });
        }
        if baseline <= EPS {
            return Ok(0.0);
        }
        Ok(1.0 - augmented / baseline)
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.terminals)]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_reduction(&solution)
    }
}

/// `P` problems, each a point count followed by that many `x y` pairs.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let mut tokens = Tokens::new(text);
    let num_problems = tokens.next_usize("number of problems")?;
    (0..num_problems)
        .map(|k| {
            let context = format!("problem {}", k + 1);
            let n = tokens.next_usize(&context)?;
            let coordinates =
                tokens.take_f64s(n.saturating_mul(2), &format!("{} coordinates", context))?;
            Ok(Instance {
                terminals: coordinates.chunks(2).map(|xy| (xy[0], xy[1])).collect(),
            })
        })
        .collect()
}
