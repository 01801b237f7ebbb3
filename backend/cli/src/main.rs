mod config_cmd;
mod dataset_cmd;
mod extract_cmd;
mod run_cmd;
mod terminal_output;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use metricscan_config::{
    apply_all_defaults, config_dir, config_file_path, MetricScanConfig, PipelineConfig,
};
use metricscan_logging::{init_logger, LogOptions};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use dataset_cmd::{CombineArgs, FilterArgs, SplitArgs};
use extract_cmd::ExtractArgs;
use run_cmd::RunArgs;

#[derive(Parser)]
#[command(name = "metricscan")]
#[command(about = "metricscan: extract physical measurements from product images")]
#[command(version)]
struct Cli {
    /// Config file; defaults to metricscan.yaml in the config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit console logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict a measurement for every row of an input CSV
    Run(RunArgs),
    /// Run extraction on a piece of text
    Extract(ExtractArgs),
    /// Split a CSV into N parts
    Split(SplitArgs),
    /// Merge prediction files, dedupe and sort by index
    Combine(CombineArgs),
    /// Keep only input rows that have no prediction yet
    Filter(FilterArgs),
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = try_main().await {
        error!(error = %format!("{e:#}"), "metricscan failed");
        terminal_output::note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(|| config_file_path(&config_dir()));
    let env = std::env::vars().collect();
    let loaded = load_config(&path, &env).await;
    let Settled { raw, mut config, ignored } = settle_config(loaded, &cli.command)?;
    if let Commands::Run(args) = &cli.command {
        apply_run_overrides(&mut config, args);
    }

    init_logger(&LogOptions {
        level: config.log_level().to_string(),
        dir: config.log_dir().cloned(),
        json: cli.json || config.log_json(),
    });
    match &ignored {
        Some(e) => warn!(path = %path.display(), error = %format!("{e:#}"), "Ignoring unusable config"),
        None if path.exists() => info!(path = %path.display(), "Loaded config"),
        None => debug!(path = %path.display(), "Config file does not exist; using defaults"),
    }
    validate_for(&cli.command, &config)?;

    match cli.command {
        Commands::Run(args) => run_cmd::run(args, &config).await,
        Commands::Extract(args) => extract_cmd::run(args),
        Commands::Split(args) => dataset_cmd::split(args),
        Commands::Combine(args) => dataset_cmd::combine(args),
        Commands::Filter(args) => dataset_cmd::filter(args),
        Commands::Config => config_cmd::run(&path, &raw, &config),
    }
}

impl Commands {
    /// Whether the command reads settings from the config file.
    fn needs_config(&self) -> bool {
        matches!(self, Commands::Run(_) | Commands::Config)
    }
}

/// Config as read from disk plus the typed config derived from it.
struct Settled {
    raw: Value,
    config: MetricScanConfig,
    /// Why the file was set aside in favour of defaults.
    ignored: Option<anyhow::Error>,
}

async fn load_config(path: &Path, env: &HashMap<String, String>) -> Result<(Value, MetricScanConfig)> {
    let raw = metricscan_config::load_config(path).await?;
    let config = metricscan_config::prepare(raw.clone(), env)?;
    Ok((raw, config))
}

/// Commands that never read the config still run when it is broken; they
/// only lose its logging settings.
fn settle_config(loaded: Result<(Value, MetricScanConfig)>, command: &Commands) -> Result<Settled> {
    match loaded {
        Ok((raw, config)) => Ok(Settled { raw, config, ignored: None }),
        Err(e) if !command.needs_config() => Ok(Settled {
            raw: Value::Object(Default::default()),
            config: apply_all_defaults(MetricScanConfig::default()),
            ignored: Some(e),
        }),
        Err(e) => Err(e),
    }
}

/// Only `run` acts on the settings, so only `run` refuses an invalid config.
fn validate_for(command: &Commands, config: &MetricScanConfig) -> Result<()> {
    match command {
        Commands::Run(_) => metricscan_config::ensure_valid(config),
        _ => Ok(()),
    }
}

/// Command-line flags win over the file and the environment.
fn apply_run_overrides(config: &mut MetricScanConfig, args: &RunArgs) {
    let pipeline = config.pipeline.get_or_insert_with(PipelineConfig::default);
    if let Some(n) = args.batch_size {
        pipeline.batch_size = Some(n as usize);
    }
    if let Some(n) = args.concurrency {
        pipeline.concurrency = Some(n as usize);
    }
}
