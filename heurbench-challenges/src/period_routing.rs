use crate::{
    geometry::{path_length, Point},
    tokens::Tokens,
    ConstraintViolation, ParseError, ProblemInstance, Sense, EPS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

impl_problem_domain! {
    PeriodRouting {
        name: "period_routing",
        sense: Sense::Minimize,
        signature: [
            "depot",
            "customers",
            "vehicles_per_day",
            "vehicle_capacity",
            "period_length",
        ],
        timeout_secs: 60,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Depot {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub service_duration: f64,
    pub demand: f64,
    pub frequency: usize,
    /// Allowed visit patterns, one 0/1 flag per day of the period.
    pub schedules: Vec<Vec<u8>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    /// Customer id to chosen visit pattern.
    pub selected_schedules: BTreeMap<usize, Vec<u8>>,
    /// 1-based day to that day's tours, each `[0, c1, ..., ck, 0]`.
    #[serde(default)]
    pub tours: BTreeMap<usize, Vec<Vec<usize>>>,
}

impl_solution_from_value!(Solution);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub vehicles_per_day: usize,
    pub vehicle_capacity: f64,
    pub period_length: usize,
    pub depot: Depot,
    pub customers: Vec<Customer>,
}

impl Instance {
    /// Depot first, then customers by id.
    fn points(&self) -> Vec<Point> {
        std::iter::once((self.depot.x, self.depot.y))
            .chain(self.customers.iter().map(|c| (c.x, c.y)))
            .collect()
    }

    pub fn evaluate_total_distance(&self, solution: &Solution) -> Result<f64, ConstraintViolation> {
        let num_customers = self.customers.len();
        self.check_schedules(solution)?;
        if let Some(&day) = solution
            .tours
            .keys()
            .find(|&&day| day == 0 || day > self.period_length)
        {
            return Err(ConstraintViolation::malformed(format!(
                "tours given for day {}, period has {} days",
                day, self.period_length
            )));
        }

        let points = self.points();
        let mut total_distance = 0.0;
        for day in 1..=self.period_length {
            let tours = solution.tours.get(&day).map(Vec::as_slice).unwrap_or(&[]);
            if tours.len() > self.vehicles_per_day {
                return Err(ConstraintViolation::CapacityExceeded {
                    entity: format!("fleet on day {}", day),
                    used: tours.len() as f64,
                    capacity: self.vehicles_per_day as f64,
                });
            }

            let mut visited = BTreeSet::new();
            for (k, tour) in tours.iter().enumerate() {
                if tour.len() < 2 || tour[0] != 0 || tour[tour.len() - 1] != 0 {
                    return Err(ConstraintViolation::DepotViolation {
                        day,
                        tour: k,
                        detail: "must start and end at the depot".to_string(),
                    });
                }
                let mut load = 0.0;
                for &node in &tour[1..tour.len() - 1] {
                    if node == 0 {
                        return Err(ConstraintViolation::DepotViolation {
                            day,
                            tour: k,
                            detail: "returns to the depot mid-tour".to_string(),
                        });
                    }
                    if node > num_customers {
                        return Err(ConstraintViolation::InvalidNode {
                            node,
                            num_nodes: num_customers + 1,
                        });
                    }
                    if !visited.insert(node) {
                        return Err(ConstraintViolation::DuplicateNode { node });
                    }
                    load += self.customers[node - 1].demand;
                }
                if load > self.vehicle_capacity + EPS {
                    return Err(ConstraintViolation::CapacityExceeded {
                        entity: format!("tour {} on day {}", k, day),
                        used: load,
                        capacity: self.vehicle_capacity,
                    });
                }
                total_distance += path_length(&points, tour);
            }

            for customer in 1..=num_customers {
                let required = solution.selected_schedules[&customer][day - 1] == 1;
                match (required, visited.contains(&customer)) {
                    (true, false) => {
                        return Err(ConstraintViolation::MissedVisit { day, customer })
                    }
                    (false, true) => {
                        return Err(ConstraintViolation::UnscheduledVisit { day, customer })
                    }
                    _ => {}
                }
            }
        }
        Ok(total_distance)
    }

    fn check_schedules(&self, solution: &Solution) -> Result<(), ConstraintViolation> {
        let num_customers = self.customers.len();
        if let Some(&id) = solution
            .selected_schedules
            .keys()
            .find(|&&id| id == 0 || id > num_customers)
        {
            return Err(ConstraintViolation::malformed(format!(
                "schedule given for unknown customer {}",
                id
            )));
        }
        for customer in &self.customers {
            let schedule = solution
                .selected_schedules
                .get(&customer.id)
                .ok_or_else(|| ConstraintViolation::ScheduleMismatch {
                    customer: customer.id,
                    detail: "no schedule selected".to_string(),
                })?;
            if schedule.len() != self.period_length {
                return Err(ConstraintViolation::ScheduleMismatch {
                    customer: customer.id,
                    detail: format!(
                        "schedule spans {} days, period has {}",
                        schedule.len(),
                        self.period_length
                    ),
                });
            }
            if !customer.schedules.contains(schedule) {
                return Err(ConstraintViolation::ScheduleMismatch {
                    customer: customer.id,
                    detail: format!("{:?} is not one of {:?}", schedule, customer.schedules),
                });
            }
        }
        Ok(())
    }
}

impl ProblemInstance for Instance {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.depot),
            json!(self.customers),
            json!(self.vehicles_per_day),
            json!(self.vehicle_capacity),
            json!(self.period_length),
        ]
    }

    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation> {
        let solution = Solution::try_from(output)?;
        self.evaluate_total_distance(&solution)
    }
}

/// Day `d` (0-based) of a `t`-day combination code is bit `t - 1 - d`.
pub fn decode_schedule(code: usize, period_length: usize) -> Vec<u8> {
    (0..period_length)
        .map(|d| ((code >> (period_length - 1 - d)) & 1) as u8)
        .collect()
}

/// `type m n t`, `t` lines `D Q` (only day one's `Q` is used), then `n + 1` records `i x y d q f a c_1 .. c_a`, depot first.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>, ParseError> {
    let mut tokens = Tokens::new(text);
    let problem_type = tokens.next_usize("problem type")?;
    if problem_type != 1 {
        return Err(ParseError::Invalid {
            context: "problem type".to_string(),
            reason: format!("expected 1 (periodic routing), got {}", problem_type),
        });
    }
    let vehicles_per_day = tokens.next_usize("number of vehicles")?;
    let num_customers = tokens.next_usize("number of customers")?;
    let period_length = tokens.next_usize("number of days")?;
    if period_length == 0 || period_length >= usize::BITS as usize {
        return Err(ParseError::Invalid {
            context: "number of days".to_string(),
            reason: format!("unsupported period length {}", period_length),
        });
    }
    let limits = (0..period_length)
        .map(|d| tokens.take_f64s(2, &format!("day {} limits", d + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut depot = None;
    let mut customers = Vec::new();
    for i in 0..=num_customers {
        let context = format!("vertex record {}", i);
        let id = tokens.next_usize(&context)?;
        if id != i {
            return Err(ParseError::Invalid {
                context,
                reason: format!("expected vertex {}, found {}", i, id),
            });
        }
        let values = tokens.take_f64s(4, &context)?;
        let frequency = tokens.next_usize(&context)?;
        let num_schedules = tokens.next_usize(&context)?;
        let codes = tokens.take_usizes(num_schedules, &context)?;
        if i == 0 {
            depot = Some(Depot {
                x: values[0],
                y: values[1],
            });
            continue;
        }
        customers.push(Customer {
            id,
            x: values[0],
            y: values[1],
            service_duration: values[2],
            demand: values[3],
            frequency,
            schedules: codes
                .into_iter()
                .map(|code| decode_schedule(code, period_length))
                .collect(),
        });
    }

    Ok(vec![Instance {
        vehicles_per_day,
        vehicle_capacity: limits[0][1],
        period_length,
        depot: depot.ok_or_else(|| ParseError::Invalid {
            context: "depot".to_string(),
            reason: "missing depot record".to_string(),
        })?,
        customers,
    }])
}
