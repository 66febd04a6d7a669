use serde_json::Value;
use std::{fmt, time::Duration};

/// Absolute tolerance shared by every geometric and numeric boundary check.
pub const EPS: f64 = 1e-6;

macro_rules! impl_solution_from_value {
    ($name:ident) => {
        impl TryFrom<&serde_json::Value> for $name {
            type Error = crate::ConstraintViolation;

            fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
                <$name as serde::Deserialize>::deserialize(value).map_err(|e| {
                    crate::ConstraintViolation::Malformed {
                        reason: format!("cannot decode {}: {}", stringify!($name), e),
                    }
                })
            }
        }

        impl TryFrom<serde_json::Value> for $name {
            type Error = crate::ConstraintViolation;

            fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
                $name::try_from(&value)
            }
        }
    };
}

macro_rules! impl_problem_domain {
    (
        $domain:ident {
            name: $name:expr,
            sense: $sense:expr,
            signature: [$($param:expr),* $(,)?],
            timeout_secs: $timeout:expr $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $domain;

        impl crate::ProblemDomain for $domain {
            fn name(&self) -> &'static str {
                $name
            }

            fn sense(&self) -> crate::Sense {
                $sense
            }

            fn signature(&self) -> &'static [&'static str] {
                &[$($param),*]
            }

            fn timeout(&self) -> std::time::Duration {
                std::time::Duration::from_secs($timeout)
            }

            fn parse(&self, text: &str) -> Result<Vec<crate::Case>, crate::ParseError> {
                Ok(parse_instances(text)?
                    .into_iter()
                    .map(|instance| Box::new(instance) as crate::Case)
                    .collect())
            }
        }
    };
}

mod error;
pub use error::*;
pub mod geometry;
pub mod tokens;

#[cfg(feature = "aircraft_landing")]
pub mod aircraft_landing;
#[cfg(feature = "container_loading")]
pub mod container_loading;
#[cfg(feature = "euclidean_steiner")]
pub mod euclidean_steiner;
#[cfg(feature = "multidimensional_knapsack")]
pub mod multidimensional_knapsack;
#[cfg(feature = "packing_circle")]
pub mod packing_circle;
#[cfg(feature = "period_routing")]
pub mod period_routing;
#[cfg(feature = "set_covering")]
pub mod set_covering;
#[cfg(feature = "travelling_salesman")]
pub mod travelling_salesman;

/// Direction in which a domain's natural objective improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    /// Maps a natural objective onto the harness-wide "higher is better" scale.
    pub fn score(&self, objective: f64) -> f64 {
        match self {
            Sense::Minimize => -objective,
            Sense::Maximize => objective,
        }
    }

    /// Ratio of an objective against a known optimum; 1.0 means the optimum was matched.
    ///
    /// A zero optimum falls back to `(optimal + 1) / (objective + 1)` for either sense.
    pub fn normalize(&self, objective: f64, optimal: f64) -> f64 {
        if optimal == 0.0 {
            return (optimal + 1.0) / (objective + 1.0);
        }
        match self {
            Sense::Minimize => optimal / objective,
            Sense::Maximize => objective / optimal,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Minimize => write!(f, "minimize"),
            Sense::Maximize => write!(f, "maximize"),
        }
    }
}

/// One parsed, immutable problem instance.
pub trait ProblemInstance: fmt::Debug + Send + Sync {
    /// Positional arguments handed to the candidate, in the order of the domain signature.
    fn arguments(&self) -> Vec<Value>;

    /// Checks every hard constraint and returns the natural objective of a feasible output.
    fn verify(&self, output: &Value) -> Result<f64, ConstraintViolation>;

    /// Objective of a reference solution shipped with the instance text, if any.
    fn reference_objective(&self) -> Option<f64> {
        None
    }
}

pub type Case = Box<dyn ProblemInstance>;

pub trait ProblemDomain: Send + Sync {
    fn name(&self) -> &'static str;

    fn sense(&self) -> Sense;

    /// Parameter names of the candidate procedure, in positional order.
    fn signature(&self) -> &'static [&'static str];

    /// Declared wall-clock budget for one candidate call.
    fn timeout(&self) -> Duration;

    fn parse(&self, text: &str) -> Result<Vec<Case>, ParseError>;

    fn verify_and_score(
        &self,
        instance: &dyn ProblemInstance,
        output: &Value,
    ) -> Result<f64, ConstraintViolation> {
        instance.verify(output).map(|objective| self.sense().score(objective))
    }

    fn normalize(&self, objective: f64, optimal: f64) -> f64 {
        self.sense().normalize(objective, optimal)
    }
}

/// Knobs that change how a domain expands or reads its instances.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainOptions {
    pub runway_counts: Vec<usize>,
}

impl Default for DomainOptions {
    fn default() -> Self {
        Self {
            runway_counts: vec![1, 2, 3, 4, 5],
        }
    }
}

/// Names of every domain compiled into this build.
pub fn domain_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "aircraft_landing")]
    names.push("aircraft_landing");
    #[cfg(feature = "container_loading")]
    names.push("container_loading");
    #[cfg(feature = "euclidean_steiner")]
    names.push("euclidean_steiner");
    #[cfg(feature = "multidimensional_knapsack")]
    names.push("multidimensional_knapsack");
    #[cfg(feature = "packing_circle")]
    names.extend(["packing_circle", "packing_circle_area"]);
    #[cfg(feature = "period_routing")]
    names.push("period_routing");
    #[cfg(feature = "set_covering")]
    names.push("set_covering");
    #[cfg(feature = "travelling_salesman")]
    names.push("travelling_salesman");
    names
}

#[cfg_attr(not(feature = "aircraft_landing"), allow(unused_variables))]
pub fn lookup(name: &str, options: &DomainOptions) -> anyhow::Result<Box<dyn ProblemDomain>> {
    let domain: Box<dyn ProblemDomain> = match name {
        #[cfg(feature = "aircraft_landing")]
        "aircraft_landing" => Box::new(aircraft_landing::AircraftLanding::new(
            options.runway_counts.clone(),
        )?),
        #[cfg(feature = "container_loading")]
        "container_loading" => Box::new(container_loading::ContainerLoading),
        #[cfg(feature = "euclidean_steiner")]
        "euclidean_steiner" => Box::new(euclidean_steiner::EuclideanSteiner),
        #[cfg(feature = "multidimensional_knapsack")]
        "multidimensional_knapsack" => {
            Box::new(multidimensional_knapsack::MultidimensionalKnapsack)
        }
        #[cfg(feature = "packing_circle")]
        "packing_circle" => Box::new(packing_circle::PackingCircle::count()),
        #[cfg(feature = "packing_circle")]
        "packing_circle_area" => Box::new(packing_circle::PackingCircle::area()),
        #[cfg(feature = "period_routing")]
        "period_routing" => Box::new(period_routing::PeriodRouting),
        #[cfg(feature = "set_covering")]
        "set_covering" => Box::new(set_covering::SetCovering),
        #[cfg(feature = "travelling_salesman")]
        "travelling_salesman" => Box::new(travelling_salesman::TravellingSalesman),
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported domain '{}'. Available: {}",
                name,
                domain_names().join(", ")
            ))
        }
    };
    Ok(domain)
}
