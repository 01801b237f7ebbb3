//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional JSON formatting, daily
//! rolling NDJSON files, and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logger settings, usually taken from the `logging` config section.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Directory for `metricscan.log.YYYY-MM-DD` files. No file output when `None`.
    pub dir: Option<PathBuf>,
    /// Emit console logs as JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: "info".to_string(), dir: None, json: false }
    }
}

/// Initialize the global structured logger.
/// Console logs go to stderr so stdout stays free for command output.
pub fn init_logger(options: &LogOptions) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    // Rolling file appender: writes NDJSON to `<dir>/metricscan.log.YYYY-MM-DD`
    let file_layer = options.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "metricscan.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let dir = std::env::temp_dir().join("metricscan-logger-test");
        let options = LogOptions { level: "debug".to_string(), dir: Some(dir), json: true };
        init_logger(&options);
        // A second global init is swallowed by try_init.
        init_logger(&LogOptions::default());
        tracing::info!("logger initialized");
    }
}
