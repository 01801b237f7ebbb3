//! Config defaults: fills every unset field so the effective config can be
//! printed in full.

use crate::schema::{LoggingConfig, MetricScanConfig, OcrBackendKind, OcrConfig, PipelineConfig};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_TESSERACT_BIN: &str = "tesseract";
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: MetricScanConfig) -> MetricScanConfig {
    let config = apply_pipeline_defaults(config);
    let config = apply_ocr_defaults(config);
    apply_logging_defaults(config)
}

fn apply_pipeline_defaults(mut config: MetricScanConfig) -> MetricScanConfig {
    let pipeline = config.pipeline.get_or_insert_with(PipelineConfig::default);
    pipeline.batch_size.get_or_insert(DEFAULT_BATCH_SIZE);
    pipeline.concurrency.get_or_insert(DEFAULT_CONCURRENCY);
    pipeline.malformed_rows.get_or_insert_with(Default::default);
    config
}

/// Backend-specific model defaults; tesseract has no model.
fn apply_ocr_defaults(mut config: MetricScanConfig) -> MetricScanConfig {
    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    let backend = *ocr.backend.get_or_insert_with(Default::default);
    ocr.fetch_timeout_secs.get_or_insert(DEFAULT_FETCH_TIMEOUT_SECS);
    match backend {
        OcrBackendKind::Tesseract => {
            ocr.tesseract_bin.get_or_insert_with(|| DEFAULT_TESSERACT_BIN.to_string());
            ocr.languages.get_or_insert_with(|| DEFAULT_LANGUAGES.to_string());
        }
        OcrBackendKind::OpenAi => {
            ocr.model.get_or_insert_with(|| DEFAULT_OPENAI_MODEL.to_string());
        }
        OcrBackendKind::Gemini => {
            ocr.model.get_or_insert_with(|| DEFAULT_GEMINI_MODEL.to_string());
        }
    }
    config
}

fn apply_logging_defaults(mut config: MetricScanConfig) -> MetricScanConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
