//! Config validation with user-friendly error messages.

use thiserror::Error;

use crate::schema::MetricScanConfig;

/// Concurrency above this is allowed but probably a mistake.
pub const HIGH_CONCURRENCY: usize = 64;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors abort start-up; warnings are only logged.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &MetricScanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_pipeline(config, &mut report);
    validate_ocr(config, &mut report);
    report
}

fn validate_pipeline(config: &MetricScanConfig, report: &mut ValidationReport) {
    if config.batch_size() == 0 {
        report.error("pipeline.batchSize", "batchSize must be >= 1");
    }
    match config.concurrency() {
        0 => report.error("pipeline.concurrency", "concurrency must be >= 1"),
        n if n > HIGH_CONCURRENCY => report.warn(
            "pipeline.concurrency",
            format!("concurrency {n} is very high; image hosts and OCR backends may throttle"),
        ),
        _ => {}
    }
    if config.row_timeout_secs() == Some(0) {
        report.error("pipeline.rowTimeoutSecs", "rowTimeoutSecs must be >= 1 when set");
    }
}

fn validate_ocr(config: &MetricScanConfig, report: &mut ValidationReport) {
    let backend = config.ocr_backend();
    if backend.needs_api_key() && config.api_key().is_none() {
        report.error("ocr.apiKey", format!("the {backend} backend requires an API key"));
    }
    if config.fetch_timeout_secs() == 0 {
        report.error("ocr.fetchTimeoutSecs", "fetchTimeoutSecs must be >= 1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OcrBackendKind, OcrConfig, PipelineConfig};

    #[test]
    fn default_config_is_valid() {
        let report = validate(&MetricScanConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_sizes_are_errors() {
        let cfg = MetricScanConfig {
            pipeline: Some(PipelineConfig {
                batch_size: Some(0),
                concurrency: Some(0),
                row_timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let paths: Vec<_> = validate(&cfg).errors.into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec!["pipeline.batchSize", "pipeline.concurrency", "pipeline.rowTimeoutSecs"]
        );
    }

    #[test]
    fn vision_backend_needs_key() {
        let cfg = MetricScanConfig {
            ocr: Some(OcrConfig { backend: Some(OcrBackendKind::OpenAi), ..Default::default() }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "ocr.apiKey");
    }

    #[test]
    fn high_concurrency_only_warns() {
        let cfg = MetricScanConfig {
            pipeline: Some(PipelineConfig { concurrency: Some(500), ..Default::default() }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
