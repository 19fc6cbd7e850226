//! blockwatch-sim - run a synthetic ledger experiment
//!
//! Usage:
//!   blockwatch-sim run --blocks 40 --anomaly-probability 0.25 --seed 42
//!   blockwatch-sim run --config experiment.json --format json
//!   blockwatch-sim list

use blockwatch_sim::{
    BlockRecord, DetectorMetrics, Experiment, ExperimentConfig, ExperimentReport, scenarios,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "blockwatch-sim")]
#[command(about = "Synthetic ledger experiment for z-score and rule-based anomaly detection")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a chain and evaluate both detectors against ground truth
    Run(RunArgs),

    /// List available block scenarios
    List,
}

#[derive(Args)]
struct RunArgs {
    /// JSON experiment config, applied over the defaults below; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of blocks to generate [default: 40]
    #[arg(short = 'n', long)]
    blocks: Option<usize>,

    /// Chance that a block is suspicious [default: 0.25]
    #[arg(short = 'p', long)]
    anomaly_probability: Option<f64>,

    /// Blocks collected before the baseline freezes [default: 10]
    #[arg(short, long)]
    baseline_size: Option<usize>,

    /// Z-score threshold [default: 1.5]
    #[arg(short, long)]
    z_threshold: Option<f64>,

    /// RNG seed [default: 42]
    #[arg(short, long)]
    seed: Option<u64>,

    /// Genesis timestamp in seconds (defaults to now)
    #[arg(long)]
    start_timestamp: Option<f64>,

    #[arg(long)]
    max_single_tx: Option<f64>,

    #[arg(long)]
    max_block_total: Option<f64>,

    #[arg(long)]
    min_time_delta: Option<f64>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run_experiment(args),
        Commands::List => {
            run_list();
            Ok(())
        }
    }
}

fn cli_defaults() -> ExperimentConfig {
    ExperimentConfig {
        num_blocks: 40,
        anomaly_probability: 0.25,
        baseline_size: 10,
        seed: Some(42),
        ..ExperimentConfig::default()
    }
}

fn resolve_config(args: &RunArgs) -> blockwatch::Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            ExperimentConfig::from_json_over(&cli_defaults(), &content)?
        }
        None => cli_defaults(),
    };

    if let Some(v) = args.blocks {
        config.num_blocks = v;
    }
    if let Some(v) = args.anomaly_probability {
        config.anomaly_probability = v;
    }
    if let Some(v) = args.baseline_size {
        config.baseline_size = v;
    }
    if let Some(v) = args.z_threshold {
        config.z_threshold = v;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.start_timestamp.is_some() {
        config.start_timestamp = args.start_timestamp;
    }
    if let Some(v) = args.max_single_tx {
        config.rules.max_single_tx_amount = v;
    }
    if let Some(v) = args.max_block_total {
        config.rules.max_block_total_amount = v;
    }
    if let Some(v) = args.min_time_delta {
        config.rules.min_time_delta = v;
    }
    Ok(config)
}

fn run_experiment(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;
    let experiment = Experiment::new(config)?;
    if args.format == OutputFormat::Pretty {
        print_banner(experiment.config());
    }
    let report = experiment.run();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_report(&report),
    }
    Ok(())
}

fn run_list() {
    println!("Available scenarios:\n");
    for (name, description) in scenarios::list_scenarios() {
        println!("  {:<12} {}", name, description);
    }
}

// --- Pretty output ---

fn print_banner(config: &ExperimentConfig) {
    let seed = config
        .seed
        .map_or_else(|| "random".to_string(), |s| s.to_string());
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║           BLOCKWATCH Experiment                              ║");
    eprintln!("╠══════════════════════════════════════════════════════════════╣");
    eprintln!("║ Blocks: {:52} ║", config.num_blocks);
    eprintln!("║ Anomaly probability: {:39} ║", config.anomaly_probability);
    eprintln!("║ Baseline size: {:45} ║", config.baseline_size);
    eprintln!("║ Z-score threshold: {:41} ║", config.z_threshold);
    eprintln!("║ Seed: {:54} ║", seed);
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
}

const RULE: &str = "============================================================";

fn print_report(report: &ExperimentReport) {
    for record in &report.records {
        print_record(record);
    }
    println!("{}", RULE);
    println!("Final chain validity: {}", report.chain_valid);

    let summary = &report.summary;
    println!();
    println!(
        "Blocks: {} (labeled anomalous: {}, scored with baseline: {})",
        summary.total_blocks, summary.labeled_anomalies, summary.scored_blocks
    );
    println!(
        "{:<12} {:>4} {:>4} {:>4} {:>4} {:>10} {:>8} {:>8}",
        "detector", "TP", "FP", "TN", "FN", "precision", "recall", "F1"
    );
    for metrics in [&summary.statistical, &summary.rules, &summary.combined] {
        print_metrics(metrics);
    }
}

fn print_record(record: &BlockRecord) {
    let features = &record.report.features;
    let decision = &record.report.decision;
    let rules = &record.report.rule_decision;

    println!("{}", RULE);
    println!("Block {}", record.index);
    println!("  Synthetic label (is_anomalous_block)? {}", record.label);
    println!(
        "  num_txs={}, total_amount={:.2}, max_amount={:.2}, time_delta={:.3}",
        features.num_txs, features.total_amount, features.max_amount, features.time_delta
    );

    println!("  [Statistical] baseline_ready={}", record.baseline_ready);
    println!("  [Statistical] is_anomaly={}", decision.is_anomaly);
    println!("  [Statistical] Reason: {}", decision.reason);
    if !decision.feature_z_scores.is_empty() {
        let scores: Vec<String> = decision
            .feature_z_scores
            .iter()
            .map(|(feature, z)| format!("{}={:.2}", feature, z))
            .collect();
        println!("  [Statistical] z-scores: {}", scores.join(", "));
    }

    println!("  [Rules] rule_alert={}", rules.rule_alert);
    if rules.rule_alert {
        println!("  [Rules] Violations:");
        for description in rules.descriptions() {
            println!("    - {}", description);
        }
    }
}

fn print_metrics(m: &DetectorMetrics) {
    println!(
        "{:<12} {:>4} {:>4} {:>4} {:>4} {:>10.3} {:>8.3} {:>8.3}",
        m.name,
        m.true_positives,
        m.false_positives,
        m.true_negatives,
        m.false_negatives,
        m.precision,
        m.recall,
        m.f1_score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::parse_from(argv.iter().copied());
        match cli.command {
            Commands::Run(args) => args,
            Commands::List => panic!("expected run"),
        }
    }

    fn write_temp(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("blockwatch-sim-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    fn path_arg(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_without_config() {
        let config = resolve_config(&run_args(&["blockwatch-sim", "run"])).unwrap();
        assert_eq!(config, cli_defaults());
        assert_eq!(config.num_blocks, 40);
        assert_eq!(config.anomaly_probability, 0.25);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.z_threshold, 1.5);
    }

    #[test]
    fn test_partial_config_keeps_cli_defaults() {
        let path = write_temp("partial", r#"{"z_threshold": 2.0}"#);
        let args = run_args(&["blockwatch-sim", "run", "--config", path_arg(&path).as_str()]);
        let config = resolve_config(&args);
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.z_threshold, 2.0);
        assert_eq!(config.num_blocks, 40);
        assert_eq!(config.anomaly_probability, 0.25);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = write_temp(
            "override",
            r#"{"num_blocks": 12, "seed": 7, "rules": {"min_time_delta": 0.5}}"#,
        );
        let args = run_args(&[
            "blockwatch-sim",
            "run",
            "--config",
            path_arg(&path).as_str(),
            "--blocks",
            "30",
            "--max-block-total",
            "9000",
        ]);
        let config = resolve_config(&args);
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.num_blocks, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rules.min_time_delta, 0.5);
        assert_eq!(config.rules.max_block_total_amount, 9000.0);
        assert_eq!(config.rules.max_single_tx_amount, 2000.0);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let args = run_args(&["blockwatch-sim", "run", "-c", "/nonexistent/blockwatch-sim.json"]);
        assert!(matches!(resolve_config(&args), Err(blockwatch::Error::Io(_))));
    }

    #[test]
    fn test_invalid_flag_value_rejected_by_experiment() {
        let args = run_args(&["blockwatch-sim", "run", "-p", "1.5"]);
        let config = resolve_config(&args).unwrap();
        assert!(Experiment::new(config).is_err());
    }
}
