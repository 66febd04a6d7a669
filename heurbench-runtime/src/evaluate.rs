use crate::{aggregate, Candidate, CandidateInvoker};
use anyhow::{anyhow, Context, Result};
use heurbench_challenges::{lookup, Case, DomainOptions, ProblemDomain};
use heurbench_structs::{
    config::{BenchmarkConfig, DomainConfig, EvaluationMode},
    core::{EvaluationReport, ScoreRecord},
};
use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Raw instance text keyed by file name.
pub type Dataset = BTreeMap<String, String>;

/// Which sub-cases of each file take part in an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Split {
    #[default]
    All,
    /// Only the cases listed in the dev table.
    Dev,
    /// Everything except the dev cases.
    Holdout,
}

impl Split {
    pub fn includes(&self, config: &DomainConfig, file: &str, case: usize) -> bool {
        match self {
            Split::All => true,
            Split::Dev => config.is_dev_case(file, case),
            Split::Holdout => !config.is_dev_case(file, case),
        }
    }
}

impl FromStr for Split {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Split::All),
            "dev" => Ok(Split::Dev),
            "holdout" => Ok(Split::Holdout),
            _ => Err(anyhow!("Invalid split '{}'. Expected all, dev or holdout", s)),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::All => write!(f, "all"),
            Split::Dev => write!(f, "dev"),
            Split::Holdout => write!(f, "holdout"),
        }
    }
}

/// Builds a domain with the options its config entry asks for.
pub fn domain_from_config(name: &str, config: &BenchmarkConfig) -> Result<Box<dyn ProblemDomain>> {
    let mut options = DomainOptions::default();
    if let Some(runway_counts) = config.domain(name).runway_counts {
        options.runway_counts = runway_counts;
    }
    lookup(name, &options)
}

/// Reads every regular, non-hidden file directly inside `dir`.
pub fn load_dataset_dir(dir: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read dataset dir: {:?}", dir))?
    {
        let path = entry?.path();
        let file_name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if !name.starts_with('.') && path.is_file() => name.to_string(),
            _ => continue,
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read instance file: {:?}", path))?;
        dataset.insert(file_name, text);
    }
    if dataset.is_empty() {
        return Err(anyhow!("Dataset dir {:?} holds no instance files", dir));
    }
    Ok(dataset)
}

/// Parses every file of a dataset; the first parse error aborts loading.
pub fn parse_dataset(
    domain: &dyn ProblemDomain,
    dataset: &Dataset,
) -> Result<BTreeMap<String, Vec<Case>>> {
    dataset
        .iter()
        .map(|(file, text)| {
            let cases = domain
                .parse(text)
                .with_context(|| format!("Failed to parse {} instance file '{}'", domain.name(), file))?;
            debug!("parsed {} case(s) from {}", cases.len(), file);
            Ok((file.clone(), cases))
        })
        .collect()
}

/// Wall-clock budget per candidate call: the configured override, else the
/// domain's declared budget. A configured `0` disables the budget.
pub fn timeout_for(domain: &dyn ProblemDomain, config: &DomainConfig) -> Option<Duration> {
    match config.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(domain.timeout()),
    }
}

/// Runs `candidate` on every selected case of `dataset` and scores it.
///
/// In [`EvaluationMode::AllOrNothing`] the first candidate failure or constraint
/// violation ends the run and the report carries no score, only the message.
/// [`EvaluationMode::PartialCredit`] records failed cases and averages the rest.
pub fn evaluate(
    domain: &dyn ProblemDomain,
    dataset: &Dataset,
    candidate: Arc<dyn Candidate>,
    config: &BenchmarkConfig,
    split: Split,
) -> EvaluationReport {
    let mode = config.mode;
    let domain_config = config.domain(domain.name());
    let parsed = match parse_dataset(domain, dataset) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("{:#}", e);
            return EvaluationReport::failure(domain.name(), mode, format!("{:#}", e));
        }
    };
    let invoker = CandidateInvoker::new(candidate).with_timeout(timeout_for(domain, &domain_config));
    debug!("{} time budget per call: {:?}", domain.name(), invoker.timeout());

    let mut files = BTreeMap::new();
    for (file, cases) in parsed.iter() {
        let mut records = Vec::new();
        for (idx, case) in cases.iter().enumerate() {
            if !split.includes(&domain_config, file, idx) {
                continue;
            }
            let reference = domain_config
                .optimal_for(file, idx)
                .or_else(|| case.reference_objective());

            let outcome = invoker
                .invoke(case.arguments())
                .map_err(|e| e.to_string())
                .and_then(|output| case.verify(&output).map_err(|e| e.to_string()));
            match outcome {
                Ok(objective) => {
                    let score = domain.sense().score(objective);
                    debug!("{} case {}: objective {}", file, idx, objective);
                    records.push(ScoreRecord::verified(idx, objective, score, reference));
                }
                Err(e) => {
                    let message = format!("{} case {}: {}", file, idx, e);
                    warn!("{}", message);
                    if mode == EvaluationMode::AllOrNothing {
                        return EvaluationReport::failure(domain.name(), mode, message);
                    }
                    records.push(ScoreRecord::failed(idx, e, reference));
                }
            }
        }
        files.insert(file.clone(), records);
    }

    let records: Vec<&ScoreRecord> = files.values().flatten().collect();
    let scores: Vec<f64> = records.iter().filter_map(|record| record.score).collect();
    let success_fraction =
        (!records.is_empty()).then(|| scores.len() as f64 / records.len() as f64);
    let score = aggregate(&scores);
    let error = match (records.is_empty(), score) {
        (true, _) => Some(format!("no cases selected for split '{}'", split)),
        (false, None) => Some("no case verified".to_string()),
        (false, Some(_)) => None,
    };
    info!(
        "{} ({:?}, split {}): score {:?} over {} case(s)",
        domain.name(),
        mode,
        split,
        score,
        records.len()
    );

    EvaluationReport {
        domain: domain.name().to_string(),
        mode,
        score,
        error,
        success_fraction,
        files,
    }
}
