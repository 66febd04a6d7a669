use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, ArgMatches, Command};
use heurbench_challenges::domain_names;
use heurbench_runtime::{
    domain_from_config, evaluate, get_dev, load_dataset_dir, mean_normalized, norm_score,
    ReplayCandidate, Split,
};
use heurbench_structs::{config::BenchmarkConfig, core::EvaluationReport};
use heurbench_utils::{jsonify_pretty, load_json_arg};
use serde::Serialize;
use serde_json::{json, Value};
use std::{collections::BTreeMap, fs, path::PathBuf, sync::Arc};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn config_arg() -> clap::Arg {
    arg!(--config [CONFIG] "Benchmark config json string or path to json file")
        .value_parser(clap::value_parser!(String))
}

fn domain_arg() -> clap::Arg {
    arg!(<DOMAIN> "Problem domain name, see list_domains").value_parser(clap::value_parser!(String))
}

fn cli() -> Command {
    Command::new("heurbench-verifier")
        .about("Verifies and scores candidate solutions for heuristic benchmarks")
        .arg_required_else_help(true)
        .arg(
            arg!(--"log-json" "Emit log lines on stderr as json")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("list_domains").about("Lists the compiled-in domains"))
        .subcommand(
            Command::new("verify_solution")
                .about("Verifies one solution against one case of an instance file")
                .arg(domain_arg())
                .arg(
                    arg!(<INSTANCE_FILE> "Path to an instance text file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(<CASE> "0-based case index within the file").value_parser(clap::value_parser!(usize)))
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Scores stored candidate outputs over a dataset directory")
                .arg(domain_arg())
                .arg(
                    arg!(<DATASET_DIR> "Directory of instance files")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<OUTPUTS> "Json list of outputs in case order, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(config_arg())
                .arg(
                    arg!(--split [SPLIT] "Which cases to score: all, dev or holdout")
                        .default_value("all")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the report will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("norm_score")
                .about("Normalizes an evaluation report against known optima")
                .arg(
                    arg!(<REPORT> "Evaluation report json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("get_dev")
                .about("Prints the held-out dev case indices per file")
                .arg(domain_arg())
                .arg(config_arg()),
        )
}

fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .ok();
    }
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    if let Err(e) = match matches.subcommand() {
        Some(("list_domains", _)) => list_domains(),
        Some(("verify_solution", sub_m)) => verify_solution(
            sub_m.get_one::<String>("DOMAIN").unwrap().clone(),
            sub_m.get_one::<PathBuf>("INSTANCE_FILE").unwrap().clone(),
            *sub_m.get_one::<usize>("CASE").unwrap(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
            load_config(sub_m),
        ),
        Some(("evaluate", sub_m)) => evaluate_outputs(
            sub_m.get_one::<String>("DOMAIN").unwrap().clone(),
            sub_m.get_one::<PathBuf>("DATASET_DIR").unwrap().clone(),
            sub_m.get_one::<String>("OUTPUTS").unwrap().clone(),
            sub_m.get_one::<String>("split").unwrap().clone(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            load_config(sub_m),
        ),
        Some(("norm_score", sub_m)) => normalize_report(
            sub_m.get_one::<String>("REPORT").unwrap().clone(),
            load_config(sub_m),
        ),
        Some(("get_dev", sub_m)) => print_dev(
            sub_m.get_one::<String>("DOMAIN").unwrap().clone(),
            load_config(sub_m),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(sub_m: &ArgMatches) -> Result<BenchmarkConfig> {
    match sub_m.get_one::<String>("config") {
        Some(config) => load_json_arg::<BenchmarkConfig>(config),
        None => Ok(BenchmarkConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", jsonify_pretty(value)?);
    Ok(())
}

pub fn list_domains() -> Result<()> {
    let config = BenchmarkConfig::default();
    let domains = domain_names()
        .into_iter()
        .map(|name| -> Result<Value> {
            let domain = domain_from_config(name, &config)?;
            Ok(json!({
                "name": domain.name(),
                "sense": domain.sense().to_string(),
                "signature": domain.signature(),
                "timeout_secs": domain.timeout().as_secs(),
            }))
        })
        .collect::<Result<Vec<Value>>>()?;
    print_json(&domains)
}

pub fn verify_solution(
    domain: String,
    instance_file: PathBuf,
    case: usize,
    solution: String,
    config: Result<BenchmarkConfig>,
) -> Result<()> {
    let config = config?;
    let domain = domain_from_config(&domain, &config)?;
    let text = fs::read_to_string(&instance_file)
        .map_err(|e| anyhow!("Failed to read instance file {:?}: {}", instance_file, e))?;
    let cases = domain.parse(&text)?;
    let instance = cases.get(case).ok_or_else(|| {
        anyhow!(
            "Case {} out of range, {:?} holds {} case(s)",
            case,
            instance_file,
            cases.len()
        )
    })?;
    let output = load_json_arg::<Value>(&solution)?;
    debug!("verifying {} case {} of {:?}", domain.name(), case, instance_file);

    match instance.verify(&output) {
        Ok(objective) => print_json(&json!({
            "objective": objective,
            "score": domain.sense().score(objective),
            "reference": instance.reference_objective(),
        })),
        Err(e) => {
            eprintln!("Invalid solution ({:?}): {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

pub fn evaluate_outputs(
    domain: String,
    dataset_dir: PathBuf,
    outputs: String,
    split: String,
    output_file: Option<PathBuf>,
    config: Result<BenchmarkConfig>,
) -> Result<()> {
    let config = config?;
    let split = split.parse::<Split>()?;
    let domain = domain_from_config(&domain, &config)?;
    let dataset = load_dataset_dir(&dataset_dir)?;
    let outputs = load_json_arg::<Vec<Value>>(&outputs)?;
    info!(
        "replaying {} output(s) over {} file(s) of {}",
        outputs.len(),
        dataset.len(),
        domain.name()
    );

    let replay = Arc::new(ReplayCandidate::new(outputs));
    let report = evaluate(domain.as_ref(), &dataset, replay.clone(), &config, split);
    if replay.remaining() > 0 {
        info!("{} stored output(s) were not replayed", replay.remaining());
    }

    if let Some(path) = output_file {
        fs::write(&path, jsonify_pretty(&report)?)?;
        println!("report written to: {:?}", path);
    } else {
        print_json(&report)?;
    }
    if report.score.is_none() {
        eprintln!(
            "No score: {}",
            report.error.as_deref().unwrap_or("unknown failure")
        );
        std::process::exit(1);
    }
    Ok(())
}

pub fn normalize_report(report: String, config: Result<BenchmarkConfig>) -> Result<()> {
    let config = config?;
    let report = load_json_arg::<EvaluationReport>(&report)?;
    let domain = domain_from_config(&report.domain, &config)?;
    let normalized: BTreeMap<String, Vec<Option<f64>>> =
        norm_score(domain.as_ref(), &report.files, &config.domain(&report.domain));
    print_json(&json!({
        "domain": report.domain,
        "mean": mean_normalized(&normalized),
        "files": normalized,
    }))
}

pub fn print_dev(domain: String, config: Result<BenchmarkConfig>) -> Result<()> {
    let config = config?;
    let domain = domain_from_config(&domain, &config)?;
    print_json(&get_dev(&config.domain(domain.name())))
}
