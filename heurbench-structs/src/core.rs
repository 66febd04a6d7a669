use crate::{config::EvaluationMode, serializable_struct_with_getters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

serializable_struct_with_getters! {
    ScoreRecord {
        case: usize,
        /// Natural objective; only present when the case verified cleanly.
        objective: Option<f64>,
        /// Objective on the "higher is better" scale.
        score: Option<f64>,
        reference: Option<f64>,
        error: Option<String>,
    }
}

impl ScoreRecord {
    pub fn verified(case: usize, objective: f64, score: f64, reference: Option<f64>) -> Self {
        Self {
            case,
            objective: Some(objective),
            score: Some(score),
            reference,
            error: None,
        }
    }

    pub fn failed(case: usize, error: String, reference: Option<f64>) -> Self {
        Self {
            case,
            objective: None,
            score: None,
            reference,
            error: Some(error),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.error.is_none() && self.objective.is_some()
    }
}

serializable_struct_with_getters! {
    EvaluationReport {
        domain: String,
        mode: EvaluationMode,
        score: Option<f64>,
        error: Option<String>,
        success_fraction: Option<f64>,
        #[serde(default)]
        files: BTreeMap<String, Vec<ScoreRecord>>,
    }
}

impl EvaluationReport {
    /// The "no score" outcome: nothing but the triggering message survives.
    pub fn failure(domain: &str, mode: EvaluationMode, error: String) -> Self {
        Self {
            domain: domain.to_string(),
            mode,
            score: None,
            error: Some(error),
            success_fraction: None,
            files: BTreeMap::new(),
        }
    }

    pub fn num_cases(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}
