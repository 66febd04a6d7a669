use crate::serializable_struct_with_getters;
use heurbench_utils::dejsonify;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a dataset run reacts to a failed case.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Any violation or candidate failure voids the whole dataset score.
    #[default]
    AllOrNothing,
    /// Deviation from the reference behaviour: failed cases are recorded and the
    /// score averages the verified ones.
    PartialCredit,
}

serializable_struct_with_getters! {
    BenchmarkConfig {
        #[serde(default)]
        mode: EvaluationMode,
        #[serde(default)]
        domains: BTreeMap<String, DomainConfig>,
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            mode: EvaluationMode::default(),
            domains: BTreeMap::new(),
        }
    }
}

impl BenchmarkConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        dejsonify::<BenchmarkConfig>(json)
    }

    /// Settings for `domain`, falling back to defaults when the domain is not listed.
    pub fn domain(&self, domain: &str) -> DomainConfig {
        self.domains.get(domain).cloned().unwrap_or_default()
    }
}

serializable_struct_with_getters! {
    DomainConfig {
        timeout_secs: Option<u64>,
        runway_counts: Option<Vec<usize>>,
        /// File name to known-optimal objective per case; `null` marks an unknown optimum.
        #[serde(default)]
        optimal: BTreeMap<String, Vec<Option<f64>>>,
        /// File name to case indices held out for tuning.
        #[serde(default)]
        dev: BTreeMap<String, Vec<usize>>,
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            runway_counts: None,
            optimal: BTreeMap::new(),
            dev: BTreeMap::new(),
        }
    }
}

impl DomainConfig {
    pub fn optimal_for(&self, file: &str, case: usize) -> Option<f64> {
        self.optimal
            .get(file)
            .and_then(|values| values.get(case).copied().flatten())
    }

    pub fn is_dev_case(&self, file: &str, case: usize) -> bool {
        self.dev
            .get(file)
            .map_or(false, |cases| cases.contains(&case))
    }
}
