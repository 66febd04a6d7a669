use crate::{tokens::Tokens, ConstraintViolation, ParseError, ProblemInstance, Sense, EPS};
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{json, Value};

impl_problem_domain! {
    MultidimensionalKnapsack {
        name: "multidimensional_knapsack",
        sense: Sense::Maximize,
        signature: ["n", "m", "p", "r", "b"],
        timeout_secs: 60,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    #[serde(with = "bool_vec_as_u8")]
    pub x: Vec<bool>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub num_items: usize,
    pub num_constraints: usize,
    pub profits: Vec<f64>,
    /// `weights[i][j]`: consumption of resource `i` by item `j`.
    pub weights: Vec<Vec<f64>>,
    pub capacities: Vec<f64>,
    pub optimum: Option<f64>,
}

impl Instance {
    pub fn evaluate_total_profit(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        if solution.x.len() != self.num_items {
            return Err(ConstraintViolation::malformed(format!(
                "expected {} decision values, got {}",
                self.num_items,
                solution.x.len()
            )));
        }
        for (i, (row, &capacity)) in self.weights.iter().zip(&self.capacities).enumerate() {
            let used = row
                .iter()
                .zip(&solution.x)
                .filter(|&(_, &selected)| selected)
                .map(|(&w, _)| w)
                .sum::<f64>();
            if used > capacity + EPS {
                return Err(ConstraintViolation::CapacityExceeded {
                    entity: format!("resource constraint {}", i + 1),
                    used,
                    capacity,
                });
            }
        }
        Ok(self
            .profits
            .iter()
            .zip(&solution.x)
            .filter(|&(_, &selected)| selected)
            .map(|(&p, _)| p)
            .sum())
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.num_items),
            json!(self.num_constraints),
            json!(self.profits),
            json!(self.weights),
            json!(self.capacities),
        ]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_total_profit(&solution)
    }

    fn reference_objective(&self) -> Option<f64> {
        self.optimum
    }
}

/// `K` problems, each `n m opt`, `n` profits, `m x n` weights and `m` capacities.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let mut tokens = Tokens::new(text);
    let num_problems = tokens.next_usize("number of problems")?;
    (0..num_problems)
        .map(|k| parse_problem(&mut tokens, k + 1))
        .collect()
}

fn parse_problem(tokens: &mut Tokens, problem: usize) -> Result<Instance, ParseError> {
    let context = |what: &str| format!("problem {} {}", problem, what);
    let num_items = tokens.next_usize(&context("item count"))?;
    let num_constraints = tokens.next_usize(&context("constraint count"))?;
    let optimum = tokens.next_f64(&context("optimal value"))?;
    let profits = tokens.take_f64s(num_items, &context("profits"))?;
    // one capacity per constraint follows the weights, even with no items
    tokens.require(num_constraints, &context("constraints"))?;
    let weights = (0..num_constraints)
        .map(|i| tokens.take_f64s(num_items, &context(&format!("constraint {} weights", i + 1))))
        .collect::<Result<Vec<_>, _>>()?;
    let capacities = tokens.take_f64s(num_constraints, &context("capacities"))?;
    Ok(Instance {
        num_items,
        num_constraints,
        profits,
        weights,
        capacities,
        optimum: (optimum > 0.0).then_some(optimum),
    })
}

mod bool_vec_as_u8 {
    use super::*;
    use std::fmt;

    pub fn serialize<S>(data: &Vec<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for &value in data {
            seq.serialize_element(&(if value { 1 } else { 0 }))?;
        }
        seq.end()
    }

    struct BoolVecVisitor;

    impl<'de> Visitor<'de> for BoolVecVisitor {
        type Value = Vec<bool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of booleans or integers 0/1")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(value) = seq.next_element::<Value>()? {
                match value {
                    Value::Number(n) if n.as_f64() == Some(1.0) => vec.push(true),
                    Value::Number(n) if n.as_f64() == Some(0.0) => vec.push(false),
                    Value::Bool(b) => vec.push(b),
                    _ => return Err(de::Error::custom("expected 0, 1, true, or false")),
                }
            }
            Ok(vec)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BoolVecVisitor)
    }
}
