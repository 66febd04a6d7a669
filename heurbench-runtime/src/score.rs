use heurbench_challenges::ProblemDomain;
use heurbench_structs::{config::DomainConfig, core::ScoreRecord};
use std::collections::BTreeMap;

/// Arithmetic mean; `None` for an empty slice.
pub fn aggregate(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Per-file normalized scores, one slot per record. A slot is `None` when the case
/// failed or has no reference objective. The configured optimal table takes
/// precedence over the reference recorded during evaluation.
pub fn norm_score(
    domain: &dyn ProblemDomain,
    files: &BTreeMap<String, Vec<ScoreRecord>>,
    config: &DomainConfig,
) -> BTreeMap<String, Vec<Option<f64>>> {
    files
        .iter()
        .map(|(file, records)| {
            let normalized = records
                .iter()
                .map(|record| {
                    let optimal = config.optimal_for(file, record.case).or(record.reference)?;
                    record
                        .objective
                        .map(|objective| domain.normalize(objective, optimal))
                })
                .collect();
            (file.clone(), normalized)
        })
        .collect()
}

/// Mean over every defined normalized slot.
pub fn mean_normalized(normalized: &BTreeMap<String, Vec<Option<f64>>>) -> Option<f64> {
    let values: Vec<f64> = normalized.values().flatten().flatten().copied().collect();
    aggregate(&values)
}

/// Held-out sub-case indices per file, sorted and deduplicated.
pub fn get_dev(config: &DomainConfig) -> BTreeMap<String, Vec<usize>> {
    config
        .dev
        .iter()
        .map(|(file, cases)| {
            let mut cases = cases.clone();
            cases.sort_unstable();
            cases.dedup();
            (file.clone(), cases)
        })
        .collect()
}
