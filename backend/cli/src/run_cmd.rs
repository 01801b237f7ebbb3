//! `metricscan run`: the batched measurement run over an input CSV.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use metricscan_config::{MetricScanConfig, OcrBackendKind};
use metricscan_pipeline::{
    BatchPipeline, CsvRecordSource, OutputSinks, PipelineOptions, RowProcessor, RunSummary,
};
use metricscan_understanding::{
    ImageTextAcquirer, MeasurementExtractor, OcrBackend, UnitVocabulary, VisionProvider,
};
use tracing::info;

use crate::terminal_output::{note_success, note_warn, render_table, Column};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input CSV with index, image_link, group_id and entity_name columns
    #[arg(short, long)]
    pub input: PathBuf,
    /// Predictions CSV (index, prediction)
    #[arg(short, long, default_value = "predictions.csv")]
    pub output: PathBuf,
    /// Audit CSV listing every row that fell back to a default
    #[arg(long, default_value = "not_found.csv")]
    pub not_found: PathBuf,
    /// Records per batch
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,
    /// Records of one batch processed at the same time
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,
}

/// Build the recognition backend the config asks for.
pub fn ocr_backend(config: &MetricScanConfig) -> Result<OcrBackend> {
    let kind = config.ocr_backend();
    let vision = |provider: VisionProvider| match config.model() {
        Some(model) => provider.with_model(model),
        None => provider,
    };
    let api_key = || {
        config
            .api_key()
            .ok_or_else(|| anyhow!("the {kind} backend requires ocr.apiKey"))
    };

    Ok(match kind {
        OcrBackendKind::Tesseract => OcrBackend::Tesseract {
            binary: config.tesseract_bin().to_string(),
            languages: config.languages().to_string(),
        },
        OcrBackendKind::OpenAi => OcrBackend::Vision(vision(VisionProvider::openai(api_key()?))),
        OcrBackendKind::Gemini => OcrBackend::Vision(vision(VisionProvider::gemini(api_key()?))),
    })
}

pub async fn run(args: RunArgs, config: &MetricScanConfig) -> Result<()> {
    let backend = ocr_backend(config)?;
    info!(backend = backend.name(), input = %args.input.display(), "Preparing measurement run");

    let acquirer = ImageTextAcquirer::new(backend, Duration::from_secs(config.fetch_timeout_secs()))
        .map_err(|e| anyhow!("failed to set up text acquisition: {e}"))?;
    let extractor = MeasurementExtractor::new(Arc::new(UnitVocabulary::standard()));
    let processor = RowProcessor::new(Arc::new(acquirer), extractor)
        .with_row_timeout(config.row_timeout_secs().map(Duration::from_secs));

    let options = PipelineOptions {
        batch_size: config.batch_size(),
        concurrency: config.concurrency(),
        ..Default::default()
    };
    let pipeline = BatchPipeline::new(processor, options)?;

    let mut source = CsvRecordSource::open(&args.input, config.malformed_rows())?;
    let mut sinks = OutputSinks::create(&args.output, &args.not_found)?;
    let summary = pipeline
        .run(&mut source, &mut sinks)
        .await
        .with_context(|| format!("run over {} aborted", args.input.display()))?;
    sinks.flush()?;

    print!("{}", summary_table(&summary));
    if summary.skipped > 0 {
        note_warn(&format!("{} malformed rows were skipped", summary.skipped));
    }
    note_success(&format!(
        "Predictions written to {} ({} fallbacks listed in {})",
        args.output.display(),
        summary.unresolved,
        args.not_found.display()
    ));
    Ok(())
}

fn summary_table(summary: &RunSummary) -> String {
    let rows = [
        ("batches", summary.batches.to_string()),
        ("rows", summary.rows.to_string()),
        ("resolved", summary.resolved.to_string()),
        ("fallback", summary.unresolved.to_string()),
        ("skipped", summary.skipped.to_string()),
        ("elapsed", format!("{:.2}s", summary.elapsed.as_secs_f64())),
    ]
    .into_iter()
    .map(|(k, v)| vec![k.to_string(), v])
    .collect::<Vec<_>>();
    render_table(&[Column::left("Run"), Column::right("Total")], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricscan_config::OcrConfig;

    #[test]
    fn builds_tesseract_by_default() {
        let backend = ocr_backend(&MetricScanConfig::default()).unwrap();
        assert_eq!(backend.name(), "tesseract");
    }

    #[test]
    fn builds_vision_backend_with_model() {
        let config = MetricScanConfig {
            ocr: Some(OcrConfig {
                backend: Some(OcrBackendKind::Gemini),
                api_key: Some("g-key".to_string()),
                model: Some("gemini-1.5-pro".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        match ocr_backend(&config).unwrap() {
            OcrBackend::Vision(VisionProvider::Gemini { model, .. }) => {
                assert_eq!(model, "gemini-1.5-pro")
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn vision_backend_without_key_fails() {
        let config = MetricScanConfig {
            ocr: Some(OcrConfig { backend: Some(OcrBackendKind::OpenAi), ..Default::default() }),
            ..Default::default()
        };
        assert!(ocr_backend(&config).is_err());
    }

    #[test]
    fn summary_lists_totals() {
        let summary = RunSummary {
            batches: 2,
            rows: 150,
            resolved: 140,
            unresolved: 10,
            ..Default::default()
        };
        let table = summary_table(&summary);
        assert!(table.contains("rows        150"));
        assert!(table.contains("fallback     10"));
    }
}
