//! metricscan configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and the
//! accessor methods on [`MetricScanConfig`] always return an effective value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use metricscan_core::MalformedRowPolicy;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LANGUAGES,
    DEFAULT_LOG_LEVEL, DEFAULT_TESSERACT_BIN,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScanConfig {
    /// Batch pipeline settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineConfig>,

    /// Image text recognition settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl MetricScanConfig {
    pub fn batch_size(&self) -> usize {
        self.pipeline.as_ref().and_then(|p| p.batch_size).unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn concurrency(&self) -> usize {
        self.pipeline.as_ref().and_then(|p| p.concurrency).unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn row_timeout_secs(&self) -> Option<u64> {
        self.pipeline.as_ref().and_then(|p| p.row_timeout_secs)
    }

    pub fn malformed_rows(&self) -> MalformedRowPolicy {
        self.pipeline.as_ref().and_then(|p| p.malformed_rows).unwrap_or_default()
    }

    pub fn ocr_backend(&self) -> OcrBackendKind {
        self.ocr.as_ref().and_then(|o| o.backend).unwrap_or_default()
    }

    pub fn tesseract_bin(&self) -> &str {
        self.ocr
            .as_ref()
            .and_then(|o| o.tesseract_bin.as_deref())
            .unwrap_or(DEFAULT_TESSERACT_BIN)
    }

    pub fn languages(&self) -> &str {
        self.ocr.as_ref().and_then(|o| o.languages.as_deref()).unwrap_or(DEFAULT_LANGUAGES)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.ocr.as_ref().and_then(|o| o.api_key.as_deref()).filter(|k| !k.is_empty())
    }

    pub fn model(&self) -> Option<&str> {
        self.ocr.as_ref().and_then(|o| o.model.as_deref())
    }

    pub fn fetch_timeout_secs(&self) -> u64 {
        self.ocr
            .as_ref()
            .and_then(|o| o.fetch_timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
    }

    pub fn log_level(&self) -> &str {
        self.logging.as_ref().and_then(|l| l.level.as_deref()).unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.logging.as_ref().and_then(|l| l.dir.as_ref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Rows of one batch in flight at once; 1 is strictly sequential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Upper bound on one row's text acquisition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malformed_rows: Option<MalformedRowPolicy>,
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendKind {
    #[default]
    Tesseract,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl OcrBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendKind::Tesseract => "tesseract",
            OcrBackendKind::OpenAi => "openai",
            OcrBackendKind::Gemini => "gemini",
        }
    }

    /// Vision backends call a hosted model and need an API key.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, OcrBackendKind::Tesseract)
    }
}

impl fmt::Display for OcrBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(OcrBackendKind::Tesseract),
            "openai" => Ok(OcrBackendKind::OpenAi),
            "gemini" => Ok(OcrBackendKind::Gemini),
            other => Err(format!(
                "unknown OCR backend '{other}'. Use 'tesseract', 'openai', or 'gemini'"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<OcrBackendKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_bin: Option<String>,
    /// Tesseract language list, e.g. `eng+deu`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily-rolling JSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}
