//! Telemetry and structured logging components for metricscan.
//!
//! Handles log redaction, console/NDJSON output, file rotation, and the
//! structured events emitted by the batch pipeline.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, PipelineEvent};
pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;
