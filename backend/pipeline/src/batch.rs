use std::io::Write;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use metricscan_core::{InputRecord, MetricScanError, ProcessingOutcome};
use metricscan_logging::{EventLogger, PipelineEvent};
use tracing::info;
use uuid::Uuid;

use crate::row::RowProcessor;
use crate::sink::OutputSinks;
use crate::source::BatchSource;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Batch pipeline knobs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Records per batch; output is flushed after every batch.
    pub batch_size: usize,
    /// Records of one batch processed at the same time. 1 is strictly sequential.
    pub concurrency: usize,
    /// Tag attached to every pipeline event of this run.
    pub run_id: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 1,
            run_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub rows: u64,
    pub resolved: u64,
    pub unresolved: u64,
    pub skipped: u64,
    pub elapsed: Duration,
}

/// Reads records batch by batch, processes each through a [`RowProcessor`],
/// and writes one prediction per record plus one audit row per fallback.
pub struct BatchPipeline {
    processor: RowProcessor,
    options: PipelineOptions,
}

impl BatchPipeline {
    pub fn new(processor: RowProcessor, options: PipelineOptions) -> Result<Self, MetricScanError> {
        if options.batch_size == 0 {
            return Err(MetricScanError::ConfigError("batch size must be greater than 0".into()));
        }
        if options.concurrency == 0 {
            return Err(MetricScanError::ConfigError("concurrency must be greater than 0".into()));
        }
        Ok(Self { processor, options })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process one batch. Outcomes come back in the order of `records`
    /// regardless of how many ran at once.
    pub async fn process_batch(&self, records: &[InputRecord]) -> Vec<ProcessingOutcome> {
        stream::iter(records.iter().map(|record| self.processor.process(record)))
            .buffered(self.options.concurrency)
            .collect()
            .await
    }

    /// Drain `source` into `sinks`.
    pub async fn run<S, P, A>(
        &self,
        source: &mut S,
        sinks: &mut OutputSinks<P, A>,
    ) -> Result<RunSummary, MetricScanError>
    where
        S: BatchSource,
        P: Write,
        A: Write,
    {
        let run_start = Instant::now();
        let mut summary = RunSummary::default();

        info!(
            run_id = %self.options.run_id,
            batch_size = self.options.batch_size,
            concurrency = self.options.concurrency,
            "Starting measurement run"
        );

        loop {
            let batch_start = Instant::now();
            let records = source.next_batch(self.options.batch_size)?;
            if records.is_empty() {
                break;
            }
            summary.batches += 1;

            let outcomes = self.process_batch(&records).await;
            let mut resolved = 0usize;
            for (record, outcome) in records.iter().zip(&outcomes) {
                sinks.write_prediction(&record.index, &outcome.prediction())?;
                match outcome {
                    ProcessingOutcome::Resolved(_) => resolved += 1,
                    ProcessingOutcome::Unresolved { reason, .. } => {
                        sinks.write_audit(record)?;
                        EventLogger::log_event(
                            &self.options.run_id,
                            PipelineEvent::RowUnresolved {
                                index: record.index.clone(),
                                image_link: record.image_link.clone(),
                                entity_name: record.entity_name.to_string(),
                                reason: reason.to_string(),
                            },
                        );
                    }
                }
            }
            sinks.flush()?;

            let unresolved = records.len() - resolved;
            summary.rows += records.len() as u64;
            summary.resolved += resolved as u64;
            summary.unresolved += unresolved as u64;

            let elapsed = batch_start.elapsed();
            info!(
                "Batch {} processed in {:.2} seconds",
                summary.batches,
                elapsed.as_secs_f64()
            );
            EventLogger::log_event(
                &self.options.run_id,
                PipelineEvent::BatchCompleted {
                    batch: summary.batches,
                    rows: records.len(),
                    resolved,
                    unresolved,
                    elapsed_ms: elapsed.as_millis() as u64,
                },
            );
        }

        summary.skipped = source.skipped();
        summary.elapsed = run_start.elapsed();
        EventLogger::log_event(
            &self.options.run_id,
            PipelineEvent::RunFinished {
                batches: summary.batches,
                rows: summary.rows,
                resolved: summary.resolved,
                unresolved: summary.unresolved,
                skipped: summary.skipped,
                elapsed_ms: summary.elapsed.as_millis() as u64,
            },
        );
        Ok(summary)
    }
}
