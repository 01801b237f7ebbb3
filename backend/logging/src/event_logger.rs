//! Pipeline Event Logger
//!
//! Structured events (batch checkpoints, unresolved rows, run totals) written
//! through `tracing` under the `pipeline_events` target, so they land in the
//! rolling NDJSON file alongside ordinary logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    BatchCompleted {
        batch: u64,
        rows: usize,
        resolved: usize,
        unresolved: usize,
        elapsed_ms: u64,
    },
    RowUnresolved {
        index: String,
        image_link: String,
        entity_name: String,
        reason: String,
    },
    RunFinished {
        batches: u64,
        rows: u64,
        resolved: u64,
        unresolved: u64,
        skipped: u64,
        elapsed_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one pipeline event.
    pub fn log_event(run_id: &str, mut event: PipelineEvent) {
        if let PipelineEvent::RowUnresolved { image_link, reason, .. } = &mut event {
            *image_link = redact_sensitive_data(image_link);
            *reason = redact_sensitive_data(reason);
        }

        let entry = EventLogEntry {
            run_id: run_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        match &entry.event {
            PipelineEvent::RowUnresolved { .. } => {
                warn!(target: "pipeline_events", event = %payload, "Row unresolved")
            }
            _ => info!(target: "pipeline_events", event = %payload, "Pipeline event"),
        }
    }
}
