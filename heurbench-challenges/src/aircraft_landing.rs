use crate::{
    tokens::Tokens, Case, ConstraintViolation, ParseError, ProblemDomain, ProblemInstance, Sense,
    EPS,
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{collections::BTreeMap, time::Duration};

/// Aircraft landing; each base instance in a file is replayed once per runway count.
#[derive(Debug, Clone)]
pub struct AircraftLanding {
    runway_counts: Vec<usize>,
}

impl AircraftLanding {
    pub fn new(runway_counts: Vec<usize>) -> Result<Self> {
        if runway_counts.is_empty() {
            return Err(anyhow!("At least one runway count is required"));
        }
        if runway_counts.contains(&0) {
            return Err(anyhow!("Runway counts must be positive"));
        }
        Ok(Self { runway_counts })
    }
}

impl ProblemDomain for AircraftLanding {
    fn name(&self) -> &'static str {
        "aircraft_landing"
    }

    fn sense(&self) -> Sense {
        Sense::Minimize
    }

    fn signature(&self) -> &'static [&'static str] {
        &[
            "num_planes",
            "num_runways",
            "freeze_time",
            "planes",
            "separation",
        ]
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn parse(&self, text: &str) -> Result<Vec<Case>, ParseError> {
        Ok(parse_instances(text, &self.runway_counts)?
            .into_iter()
            .map(|instance| Box::new(instance) as Case)
            .collect())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Plane {
    pub appearance: f64,
    pub earliest: f64,
    pub target: f64,
    pub latest: f64,
    pub penalty_early: f64,
    pub penalty_late: f64,
}

impl Plane {
    pub fn penalty(&self, landing_time: f64) -> f64 {
        if landing_time < self.target {
            (self.target - landing_time) * self.penalty_early
        } else {
            (landing_time - self.target) * self.penalty_late
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Landing {
    pub landing_time: f64,
    pub runway: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    /// Keyed by 1-based plane id.
    pub schedule: BTreeMap<usize, Landing>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub num_runways: usize,
    pub freeze_time: f64,
    pub planes: Vec<Plane>,
    /// `separation[i][j]`: minimum gap when plane `i` lands before plane `j`.
    pub separation: Vec<Vec<f64>>,
}

impl Instance {
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn evaluate_total_penalty(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        let num_planes = self.num_planes();
        if let Some(&id) = solution
            .schedule
            .keys()
            .find(|&&id| id == 0 || id > num_planes)
        {
            return Err(ConstraintViolation::malformed(format!(
                "schedule names unknown plane {}",
                id
            )));
        }
        let mut landings = Vec::with_capacity(num_planes);
        for id in 1..=num_planes {
            match solution.schedule.get(&id) {
                Some(landing) => landings.push(landing),
                None => {
                    return Err(ConstraintViolation::malformed(format!(
                        "plane {} has no landing",
                        id
                    )))
                }
            }
        }

        for (i, (plane, landing)) in self.planes.iter().zip(&landings).enumerate() {
            let time = landing.landing_time;
            if time < plane.earliest - EPS || time > plane.latest + EPS {
                return Err(ConstraintViolation::TimeWindow {
                    plane: i + 1,
                    time,
                    earliest: plane.earliest,
                    latest: plane.latest,
                });
            }
            if landing.runway == 0 || landing.runway > self.num_runways {
                return Err(ConstraintViolation::OutOfBounds {
                    entity: format!("plane {}", i + 1),
                    detail: format!(
                        "runway {} not in 1..={}",
                        landing.runway, self.num_runways
                    ),
                });
            }
        }

        for i in 0..num_planes {
            for j in (i + 1)..num_planes {
                if landings[i].runway != landings[j].runway {
                    continue;
                }
                let (first, second) = if landings[i].landing_time <= landings[j].landing_time {
                    (i, j)
                } else {
                    (j, i)
                };
                let gap = landings[second].landing_time - landings[first].landing_time;
                let required = self.separation[first][second];
                if gap < required - EPS {
                    return Err(ConstraintViolation::Separation {
                        runway: landings[i].runway,
                        first: first + 1,
                        second: second + 1,
                        gap,
                        required,
                    });
                }
            }
        }

        Ok(self
            .planes
            .iter()
            .zip(&landings)
            .map(|(plane, landing)| plane.penalty(landing.landing_time))
            .sum())
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.num_planes()),
            json!(self.num_runways),
            json!(self.freeze_time),
            json!(self.planes),
            json!(self.separation),
        ]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_total_penalty(&solution)
    }
}

/// Parses the base instance and expands it once per runway count, in the given order.
pub fn parse_instances(text: &str, runway_counts: &[usize]) -> Result<Vec<Instance>, ParseError> {
    let base = parse_base_instance(text)?;
    Ok(runway_counts
        .iter()
        .map(|&num_runways| Instance {
            num_runways,
            ..base.clone()
        })
        .collect())
}

/// `p freeze_time`, then per plane six timing/penalty values followed by its separation row.
pub fn parse_base_instance(text: &str) -> Result<Instance, ParseError> {
    let mut tokens = Tokens::new(text);
    let num_planes = tokens.next_usize("number of planes")?;
    let freeze_time = tokens.next_f64("freeze time")?;
    let mut planes = Vec::new();
    let mut separation = Vec::new();
    for i in 0..num_planes {
        let context = format!("plane {}", i + 1);
        let values = tokens.take_f64s(6, &context)?;
        planes.push(Plane {
            appearance: values[0],
            earliest: values[1],
            target: values[2],
            latest: values[3],
            penalty_early: values[4],
            penalty_late: values[5],
        });
        separation.push(tokens.take_f64s(num_planes, &format!("{} separation", context))?);
    }
    Ok(Instance {
        num_runways: 1,
        freeze_time,
        planes,
        separation,
    })
}
