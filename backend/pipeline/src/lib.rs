//! `metricscan-pipeline`: per-row processing and the batched CSV run loop.

pub mod batch;
pub mod row;
pub mod sink;
pub mod source;

pub use batch::{BatchPipeline, PipelineOptions, RunSummary, DEFAULT_BATCH_SIZE};
pub use row::RowProcessor;
pub use sink::{OutputSinks, AUDIT_COLUMNS, PREDICTION_COLUMNS};
pub use source::{BatchSource, CsvRecordSource, IterSource, INPUT_COLUMNS};
