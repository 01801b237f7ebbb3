//! `metricscan config`: show the effective configuration.

use std::path::Path;

use anyhow::{Context, Result};
use metricscan_config::{collect_referenced_vars, redact, MetricScanConfig};
use serde_json::Value;

use crate::terminal_output::dim;

/// Effective config as YAML with secrets masked.
pub fn render(config: &MetricScanConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

pub fn run(path: &Path, raw: &Value, config: &MetricScanConfig) -> Result<()> {
    let source = if path.exists() { path.display().to_string() } else { "defaults".to_string() };
    println!("{}", dim(&format!("# source: {source}")));
    let vars = collect_referenced_vars(raw);
    if !vars.is_empty() {
        println!("{}", dim(&format!("# env vars referenced: {}", vars.join(", "))));
    }
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricscan_config::{apply_all_defaults, OcrBackendKind, OcrConfig};

    #[test]
    fn render_masks_api_key() {
        let config = apply_all_defaults(MetricScanConfig {
            ocr: Some(OcrConfig {
                backend: Some(OcrBackendKind::OpenAi),
                api_key: Some("sk-supersecret".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let yaml = render(&config).unwrap();
        assert!(yaml.contains("sk-s***"));
        assert!(!yaml.contains("supersecret"));
        assert!(yaml.contains("batchSize: 100"));
    }
}
