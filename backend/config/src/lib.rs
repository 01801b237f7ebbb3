//! `metricscan-config`: runtime configuration for measurement runs.
//!
//! Provides:
//! - Typed config schema (pipeline, OCR backend, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - `METRICSCAN_*` environment overrides
//! - Default value application and validation
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides_with, collect_referenced_vars, resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::{LoggingConfig, MetricScanConfig, OcrBackendKind, OcrConfig, PipelineConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Turn a raw config tree into a typed config using an explicit environment.
/// Validation is left to the caller so later overrides can be checked too.
pub fn prepare(raw: Value, env: &HashMap<String, String>) -> Result<MetricScanConfig> {
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    let config: MetricScanConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_env_overrides_with(config, env)?;
    Ok(apply_all_defaults(config))
}

/// Log warnings and fail on errors.
pub fn ensure_valid(config: &MetricScanConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        let messages: Vec<_> = report.errors.iter().map(|e| e.to_string()).collect();
        bail!("invalid configuration:\n  {}", messages.join("\n  "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepare_runs_every_stage() {
        let raw = json!({
            "pipeline": {"batchSize": 50},
            "ocr": {"backend": "openai", "apiKey": "${OPENAI_API_KEY}"}
        });
        let env: HashMap<_, _> = [
            ("OPENAI_API_KEY".to_string(), "sk-live".to_string()),
            ("METRICSCAN_CONCURRENCY".to_string(), "3".to_string()),
        ]
        .into();
        let cfg = prepare(raw, &env).unwrap();
        assert_eq!(cfg.batch_size(), 50);
        assert_eq!(cfg.concurrency(), 3);
        assert_eq!(cfg.api_key(), Some("sk-live"));
        assert_eq!(cfg.model(), Some(defaults::DEFAULT_OPENAI_MODEL));
    }

    #[test]
    fn env_override_wins_over_file() {
        let raw = json!({"pipeline": {"batchSize": 50}});
        let env: HashMap<_, _> = [("METRICSCAN_BATCH_SIZE".to_string(), "8".to_string())].into();
        assert_eq!(prepare(raw, &env).unwrap().batch_size(), 8);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let raw = json!({"ocr": {"backend": "gemini"}});
        let cfg = prepare(raw, &HashMap::new()).unwrap();
        let err = ensure_valid(&cfg).unwrap_err().to_string();
        assert!(err.contains("ocr.apiKey"));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let raw = json!({"pipeline": {"malformedRows": "explode"}});
        assert!(prepare(raw, &HashMap::new()).is_err());
    }
}
