use crate::{
    geometry::{cyclic_length, Point},
    tokens::{non_blank_lines, parse_f64, parse_usize},
    ConstraintViolation, ParseError, ProblemInstance, Sense,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

impl_problem_domain! {
    TravellingSalesman {
        name: "travelling_salesman",
        sense: Sense::Minimize,
        signature: ["nodes"],
        timeout_secs: 60,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    pub tour: Vec<usize>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub nodes: Vec<Point>,
    /// 0-based reference tour shipped with the instance, without the closing node.
    pub reference_tour: Option<Vec<usize>>,
}

impl Instance {
    pub fn evaluate_tour_length(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        let num_nodes = self.nodes.len();
        if solution.tour.len() != num_nodes {
            return Err(ConstraintViolation::TourLength {
                expected: num_nodes,
                actual: solution.tour.len(),
            });
        }
        let mut visited = HashSet::with_capacity(num_nodes);
        for &node in &solution.tour {
            if node >= num_nodes {
                return Err(ConstraintViolation::InvalidNode { node, num_nodes });
            }
            if !visited.insert(node) {
                return Err(ConstraintViolation::DuplicateNode { node });
            }
        }
        Ok(cyclic_length(&self.nodes, &solution.tour))
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.nodes)]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_tour_length(&solution)
    }

    fn reference_objective(&self) -> Option<f64> {
        self.reference_tour
            .as_ref()
            .map(|tour| cyclic_length(&self.nodes, tour))
    }
}

type Matcher = fn(&str) -> Result<Vec<Instance>, ParseError>;

/// Tries each known layout in turn; the first that parses cleanly wins.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let matchers: [(&str, Matcher); 2] = [
        ("tsplib", parse_tsplib),
        ("coordinate lines", parse_coordinate_lines),
    ];
    let mut reasons = Vec::new();
    for (name, matcher) in matchers {
        match matcher(text) {
            Ok(instances) => return Ok(instances),
            Err(e) => reasons.push(format!("{}: {}", name, e)),
        }
    }
    Err(ParseError::UnknownFormat {
        reason: reasons.join("; "),
    })
}

/// TSPLIB `NODE_COORD_SECTION` layout holding a single instance.
pub fn parse_tsplib(text: &str) -> Result<Vec<Instance>, ParseError> {
    let lines = non_blank_lines(text);
    let section = lines
        .iter()
        .position(|line| line.starts_with("NODE_COORD_SECTION"))
        .ok_or_else(|| ParseError::Invalid {
            context: "tsplib".to_string(),
            reason: "no NODE_COORD_SECTION".to_string(),
        })?;

    let mut dimension = None;
    for line in &lines[..section] {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim() == "DIMENSION" {
                dimension = Some(parse_usize(value.trim(), "DIMENSION")?);
            }
        } else if let Some(value) = line.strip_prefix("DIMENSION") {
            dimension = Some(parse_usize(value.trim(), "DIMENSION")?);
        }
    }

    let mut nodes = Vec::new();
    for line in &lines[section + 1..] {
        if *line == "EOF" {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            // next keyword section
            if tokens[0].chars().all(|c| c.is_ascii_uppercase() || c == '_') {
                break;
            }
            return Err(ParseError::Invalid {
                context: "NODE_COORD_SECTION".to_string(),
                reason: format!("expected 'id x y', got '{}'", line),
            });
        }
        let context = format!("node {}", nodes.len() + 1);
        nodes.push((parse_f64(tokens[1], &context)?, parse_f64(tokens[2], &context)?));
    }

    if let Some(dimension) = dimension {
        if dimension != nodes.len() {
            return Err(ParseError::MissingTokens {
                context: "NODE_COORD_SECTION".to_string(),
                expected: dimension,
                found: nodes.len(),
            });
        }
    }
    if nodes.is_empty() {
        return Err(ParseError::Invalid {
            context: "NODE_COORD_SECTION".to_string(),
            reason: "no nodes".to_string(),
        });
    }
    Ok(vec![Instance {
        nodes,
        reference_tour: None,
    }])
}

/// One instance per line: `x1 y1 x2 y2 ... [output t1 t2 ... tn t1]`, tour 1-based.
pub fn parse_coordinate_lines(text: &str) -> Result<Vec<Instance>, ParseError> {
    let lines = non_blank_lines(text);
    if lines.is_empty() {
        return Err(ParseError::Invalid {
            context: "coordinate lines".to_string(),
            reason: "no instances".to_string(),
        });
    }
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| parse_coordinate_line(line, &format!("line {}", idx + 1)))
        .collect()
}

fn parse_coordinate_line(line: &str, context: &str) -> Result<Instance, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (coordinates, tour) = match tokens.iter().position(|&t| t == "output") {
        Some(idx) => (&tokens[..idx], Some(&tokens[idx + 1..])),
        None => (&tokens[..], None),
    };
    if coordinates.is_empty() || coordinates.len() % 2 != 0 {
        return Err(ParseError::Invalid {
            context: context.to_string(),
            reason: format!("odd or empty coordinate list ({} values)", coordinates.len()),
        });
    }
    let nodes = coordinates
        .chunks(2)
        .map(|xy| Ok((parse_f64(xy[0], context)?, parse_f64(xy[1], context)?)))
        .collect::<Result<Vec<Point>, ParseError>>()?;

    let reference_tour = match tour {
        Some(tour) => Some(parse_reference_tour(tour, nodes.len(), context)?),
        None => None,
    };
    Ok(Instance {
        nodes,
        reference_tour,
    })
}

fn parse_reference_tour(
    tokens: &[&str],
    num_nodes: usize,
    context: &str,
) -> Result<Vec<usize>, ParseError> {
    let mut tour = tokens
        .iter()
        .map(|t| parse_usize(t, context))
        .collect::<Result<Vec<usize>, ParseError>>()?;
    if tour.len() == num_nodes + 1 && tour.first() == tour.last() {
        tour.pop();
    }
    if tour.len() != num_nodes {
        return Err(ParseError::MissingTokens {
            context: format!("{} reference tour", context),
            expected: num_nodes,
            found: tour.len(),
        });
    }
    let mut seen = HashSet::with_capacity(num_nodes);
    for node in tour.iter_mut() {
        if *node == 0 || *node > num_nodes || !seen.insert(*node) {
            return Err(ParseError::Invalid {
                context: format!("{} reference tour", context),
                reason: format!("node {} is out of range or repeated", node),
            });
        }
        *node -= 1;
    }
    Ok(tour)
}
