use thiserror::Error;

/// Top-level error type for metricscan.
///
/// Per-row problems never surface here; these are the conditions that stop a run.
#[derive(Debug, Error)]
pub enum MetricScanError {
    #[error("input error: {0}")]
    Input(String),

    #[error("malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("output error: {0}")]
    Output(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
