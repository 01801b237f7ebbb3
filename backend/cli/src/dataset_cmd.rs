//! `metricscan split | combine | filter`: file tooling around runs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::terminal_output::note_success;

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// CSV to split
    #[arg(short, long)]
    pub input: PathBuf,
    /// Number of parts
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub parts: u64,
    /// Directory for the parts
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// File name prefix; defaults to the input's file stem
    #[arg(long)]
    pub stem: Option<String>,
}

#[derive(Debug, Args)]
pub struct CombineArgs {
    /// Prediction files or directories of them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(short, long, default_value = "predictions.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Full input set
    #[arg(short, long)]
    pub reference: PathBuf,
    /// Prediction files or directories already produced
    #[arg(short, long = "predictions", required = true, num_args = 1..)]
    pub predictions: Vec<PathBuf>,
    #[arg(short, long, default_value = "remaining.csv")]
    pub output: PathBuf,
}

pub fn split(args: SplitArgs) -> Result<()> {
    let stem = match args.stem {
        Some(stem) => stem,
        None => args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .with_context(|| format!("cannot derive a name from {}", args.input.display()))?,
    };
    let parts = metricscan_dataset::split(&args.input, args.parts as usize, &args.out_dir, &stem)?;
    note_success(&format!("Wrote {} parts to {}", parts.len(), args.out_dir.display()));
    Ok(())
}

pub fn combine(args: CombineArgs) -> Result<()> {
    let summary = metricscan_dataset::combine(&args.inputs, &args.output)?;
    note_success(&format!(
        "Combined {} files: {} rows read, {} unique rows written to {}",
        summary.files,
        summary.rows_read,
        summary.rows_written,
        args.output.display()
    ));
    Ok(())
}

pub fn filter(args: FilterArgs) -> Result<()> {
    let summary =
        metricscan_dataset::filter_unpredicted(&args.reference, &args.predictions, &args.output)?;
    note_success(&format!(
        "{} rows still need predictions ({} already done), written to {}",
        summary.kept,
        summary.removed,
        args.output.display()
    ));
    Ok(())
}
